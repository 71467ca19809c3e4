use crate::application_port::GraphError;
use crate::domain_model::UserId;
use crate::domain_port::repo_tx::StorageTx;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

/// A row of the user table. Hobbies and friendships live in their own
/// tables and are fetched separately.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user_id: UserId,
    pub username: String,
    pub age: u32,
    pub created_at: DateTime<Utc>,
}

#[async_trait::async_trait]
pub trait UserRepo: Send + Sync {
    /// Insert a fresh user row. Surfaces `UsernameTaken` when the unique
    /// username key rejects the row.
    async fn insert_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        record: &UserRecord,
    ) -> Result<(), GraphError>;

    /// Overwrite username and age of an existing row.
    async fn update_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        record: &UserRecord,
    ) -> Result<(), GraphError>;

    /// Remove the user row together with its hobby rows.
    async fn delete_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        user_id: UserId,
    ) -> Result<(), GraphError>;

    /// Replace the user's hobby set.
    async fn set_hobbies_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        user_id: UserId,
        hobbies: &HashSet<String>,
    ) -> Result<(), GraphError>;

    async fn get(&self, user_id: UserId) -> Result<Option<UserRecord>, GraphError>;

    async fn get_hobbies(&self, user_id: UserId) -> Result<HashSet<String>, GraphError>;

    async fn username_exists(&self, username: &str) -> Result<bool, GraphError>;

    async fn list_all(&self) -> Result<Vec<UserRecord>, GraphError>;

    async fn list_all_hobbies(&self) -> Result<HashMap<UserId, HashSet<String>>, GraphError>;
}
