use anyhow::Result;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::quick_link::QuickLink;

#[derive(Clone)]
pub struct QuickLinkRepository {
    pool: Arc<SqlitePool>,
}

impl QuickLinkRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    pub async fn add(&self, link: &QuickLink) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO quick_links (id, title, url, position)
            VALUES (?, ?, ?, (SELECT COALESCE(MAX(position) + 1, 0) FROM quick_links))
            "#,
        )
        .bind(link.id.to_string())
        .bind(&link.title)
        .bind(&link.url)
        .execute(&*self.pool)
        .await?;

        Ok(())
    }

    pub async fn remove(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM quick_links WHERE id = ?")
            .bind(id.to_string())
            .execute(&*self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn list(&self) -> Result<Vec<QuickLink>> {
        let rows = sqlx::query("SELECT * FROM quick_links ORDER BY position ASC")
            .fetch_all(&*self.pool)
            .await?;

        rows.into_iter()
            .map(|row| {
                Ok(QuickLink {
                    id: Uuid::parse_str(row.get("id"))?,
                    title: row.get("title"),
                    url: row.get("url"),
                })
            })
            .collect()
    }
}
