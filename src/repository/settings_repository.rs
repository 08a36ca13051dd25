use anyhow::Result;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

/// Small key/value store for scalar preferences and bookkeeping flags.
#[derive(Clone)]
pub struct SettingsRepository {
    pool: Arc<SqlitePool>,
}

impl SettingsRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(&*self.pool)
            .await?;

        Ok(row.map(|r| r.get("value")))
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value) VALUES (?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&*self.pool)
        .await?;

        Ok(())
    }

    pub async fn delete(&self, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM settings WHERE key = ?")
            .bind(key)
            .execute(&*self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::database::init_test_database;

    async fn setup() -> SettingsRepository {
        let pool = init_test_database().await.unwrap();
        SettingsRepository::new(Arc::new(pool))
    }

    #[tokio::test]
    async fn test_set_get_overwrite() {
        let repo = setup().await;

        assert!(repo.get("username").await.unwrap().is_none());

        repo.set("username", "alice").await.unwrap();
        assert_eq!(repo.get("username").await.unwrap().as_deref(), Some("alice"));

        repo.set("username", "bob").await.unwrap();
        assert_eq!(repo.get("username").await.unwrap().as_deref(), Some("bob"));
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = setup().await;

        repo.set("baseline", "42").await.unwrap();
        repo.delete("baseline").await.unwrap();
        assert!(repo.get("baseline").await.unwrap().is_none());

        // Deleting an absent key is fine
        repo.delete("baseline").await.unwrap();
    }
}
