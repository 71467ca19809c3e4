use super::util::{downcast, is_dup_key};
use crate::application_port::GraphError;
use crate::domain_model::{UserId, UserPair};
use crate::domain_port::{FriendshipRepo, StorageTx};
use sqlx::{MySqlPool, Row};
use std::collections::HashSet;

/// Friendship edges stored as one row per normalized pair, primary key
/// (user_min, user_max). The key doubles as the serialization point for
/// racing link calls on the same pair.
pub struct MySqlFriendshipRepo {
    pool: MySqlPool,
}

impl MySqlFriendshipRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlFriendshipRepo { pool }
    }
}

#[async_trait::async_trait]
impl FriendshipRepo for MySqlFriendshipRepo {
    async fn insert_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        pair: &UserPair,
    ) -> Result<(), GraphError> {
        let tx = downcast(tx);

        sqlx::query("INSERT INTO friendship (user_min, user_max) VALUES (?, ?)")
            .bind(pair.min())
            .bind(pair.max())
            .execute(tx.conn())
            .await
            .map_err(|e| {
                if is_dup_key(&e) {
                    GraphError::AlreadyFriends
                } else {
                    GraphError::Store(format!("insert friendship: {e}"))
                }
            })?;

        Ok(())
    }

    async fn delete_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        pair: &UserPair,
    ) -> Result<(), GraphError> {
        let tx = downcast(tx);

        let result = sqlx::query("DELETE FROM friendship WHERE user_min = ? AND user_max = ?")
            .bind(pair.min())
            .bind(pair.max())
            .execute(tx.conn())
            .await
            .map_err(|e| GraphError::Store(format!("delete friendship: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(GraphError::NotFriends);
        }

        Ok(())
    }

    async fn friends_of(&self, user_id: UserId) -> Result<HashSet<UserId>, GraphError> {
        let rows = sqlx::query(
            "SELECT user_min, user_max FROM friendship WHERE user_min = ? OR user_max = ?",
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| GraphError::Store(format!("query friends: {e}")))?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let a = row.get::<UserId, _>("user_min");
                let b = row.get::<UserId, _>("user_max");
                if a == user_id { b } else { a }
            })
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<(UserId, UserId)>, GraphError> {
        let rows = sqlx::query("SELECT user_min, user_max FROM friendship")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| GraphError::Store(format!("list friendships: {e}")))?;

        Ok(rows
            .into_iter()
            .map(|row| {
                (
                    row.get::<UserId, _>("user_min"),
                    row.get::<UserId, _>("user_max"),
                )
            })
            .collect())
    }
}
