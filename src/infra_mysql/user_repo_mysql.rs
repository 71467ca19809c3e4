use super::util::{downcast, is_dup_key};
use crate::application_port::GraphError;
use crate::domain_model::UserId;
use crate::domain_port::{StorageTx, UserRecord, UserRepo};
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use std::collections::{HashMap, HashSet};

pub struct MySqlUserRepo {
    pool: MySqlPool,
}

impl MySqlUserRepo {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlUserRepo { pool }
    }
}

#[async_trait::async_trait]
impl UserRepo for MySqlUserRepo {
    async fn insert_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        record: &UserRecord,
    ) -> Result<(), GraphError> {
        let tx = downcast(tx);

        sqlx::query(
            r#"
INSERT INTO user (user_id, username, age, created_at)
VALUES (?, ?, ?, ?)
"#,
        )
        .bind(record.user_id)
        .bind(&record.username)
        .bind(record.age)
        .bind(record.created_at)
        .execute(tx.conn())
        .await
        .map_err(|e| {
            if is_dup_key(&e) {
                GraphError::UsernameTaken
            } else {
                GraphError::Store(format!("insert user: {e}"))
            }
        })?;

        Ok(())
    }

    async fn update_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        record: &UserRecord,
    ) -> Result<(), GraphError> {
        let tx = downcast(tx);

        // No dup-key special case here: update carries no uniqueness
        // pre-check either, so a username collision surfaces as a plain
        // store error.
        sqlx::query("UPDATE user SET username = ?, age = ? WHERE user_id = ?")
            .bind(&record.username)
            .bind(record.age)
            .bind(record.user_id)
            .execute(tx.conn())
            .await
            .map_err(|e| GraphError::Store(format!("update user: {e}")))?;

        Ok(())
    }

    async fn delete_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        user_id: UserId,
    ) -> Result<(), GraphError> {
        let tx = downcast(tx);

        sqlx::query("DELETE FROM user_hobby WHERE user_id = ?")
            .bind(user_id)
            .execute(tx.conn())
            .await
            .map_err(|e| GraphError::Store(format!("delete hobbies: {e}")))?;

        sqlx::query("DELETE FROM user WHERE user_id = ?")
            .bind(user_id)
            .execute(tx.conn())
            .await
            .map_err(|e| GraphError::Store(format!("delete user: {e}")))?;

        Ok(())
    }

    async fn set_hobbies_in_tx<'t>(
        &self,
        tx: &mut dyn StorageTx<'t>,
        user_id: UserId,
        hobbies: &HashSet<String>,
    ) -> Result<(), GraphError> {
        let tx = downcast(tx);

        sqlx::query("DELETE FROM user_hobby WHERE user_id = ?")
            .bind(user_id)
            .execute(tx.conn())
            .await
            .map_err(|e| GraphError::Store(format!("clear hobbies: {e}")))?;

        for hobby in hobbies {
            sqlx::query("INSERT INTO user_hobby (user_id, hobby) VALUES (?, ?)")
                .bind(user_id)
                .bind(hobby)
                .execute(tx.conn())
                .await
                .map_err(|e| GraphError::Store(format!("insert hobby: {e}")))?;
        }

        Ok(())
    }

    async fn get(&self, user_id: UserId) -> Result<Option<UserRecord>, GraphError> {
        let row = sqlx::query(
            "SELECT user_id, username, age, created_at FROM user WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| GraphError::Store(format!("query user: {e}")))?;

        Ok(row.map(|row| UserRecord {
            user_id: row.get::<UserId, _>("user_id"),
            username: row.get::<String, _>("username"),
            age: row.get::<u32, _>("age"),
            created_at: row.get::<DateTime<Utc>, _>("created_at"),
        }))
    }

    async fn get_hobbies(&self, user_id: UserId) -> Result<HashSet<String>, GraphError> {
        let rows = sqlx::query("SELECT hobby FROM user_hobby WHERE user_id = ?")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| GraphError::Store(format!("query hobbies: {e}")))?;

        Ok(rows
            .into_iter()
            .map(|row| row.get::<String, _>("hobby"))
            .collect())
    }

    async fn username_exists(&self, username: &str) -> Result<bool, GraphError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user WHERE username = ?")
            .bind(username)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| GraphError::Store(e.to_string()))?;

        Ok(count > 0)
    }

    async fn list_all(&self) -> Result<Vec<UserRecord>, GraphError> {
        let rows = sqlx::query("SELECT user_id, username, age, created_at FROM user")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| GraphError::Store(format!("list users: {e}")))?;

        Ok(rows
            .into_iter()
            .map(|row| UserRecord {
                user_id: row.get::<UserId, _>("user_id"),
                username: row.get::<String, _>("username"),
                age: row.get::<u32, _>("age"),
                created_at: row.get::<DateTime<Utc>, _>("created_at"),
            })
            .collect())
    }

    async fn list_all_hobbies(&self) -> Result<HashMap<UserId, HashSet<String>>, GraphError> {
        let rows = sqlx::query("SELECT user_id, hobby FROM user_hobby")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| GraphError::Store(format!("list hobbies: {e}")))?;

        let mut hobbies: HashMap<UserId, HashSet<String>> = HashMap::new();
        for row in rows {
            hobbies
                .entry(row.get::<UserId, _>("user_id"))
                .or_default()
                .insert(row.get::<String, _>("hobby"));
        }

        Ok(hobbies)
    }
}
