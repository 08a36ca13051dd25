use anyhow::Result;
use sqlx::{Row, SqlitePool};
use std::sync::Arc;

use crate::domain::practice::{CachedProfile, PracticeDay};
use crate::repository::task_repository::{from_millis, to_millis};

#[derive(Clone)]
pub struct PracticeRepository {
    pool: Arc<SqlitePool>,
}

impl PracticeRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    pub async fn load_days(&self) -> Result<Vec<PracticeDay>> {
        let rows = sqlx::query("SELECT * FROM practice_days ORDER BY date ASC")
            .fetch_all(&*self.pool)
            .await?;

        rows.into_iter()
            .map(|row| {
                Ok(PracticeDay {
                    date: row.get::<String, _>("date").parse()?,
                    total_solved: row.get("total_solved"),
                    is_streak_day: row.get::<i32, _>("is_streak_day") != 0,
                })
            })
            .collect()
    }

    /// Rewrites the whole window. The history never exceeds 30 rows, so a
    /// full replace keeps trimming and upserting in one code path.
    pub async fn replace_days(&self, days: &[PracticeDay]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM practice_days")
            .execute(&mut *tx)
            .await?;

        for day in days {
            sqlx::query(
                "INSERT INTO practice_days (date, total_solved, is_streak_day) VALUES (?, ?, ?)",
            )
            .bind(day.date.to_string())
            .bind(day.total_solved)
            .bind(day.is_streak_day as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn clear_days(&self) -> Result<()> {
        sqlx::query("DELETE FROM practice_days")
            .execute(&*self.pool)
            .await?;
        Ok(())
    }

    pub async fn get_cache(&self, username: &str) -> Result<Option<CachedProfile>> {
        let row = sqlx::query("SELECT profile, fetched_at FROM practice_cache WHERE username = ?")
            .bind(username)
            .fetch_optional(&*self.pool)
            .await?;

        row.map(|r| {
            Ok(CachedProfile {
                profile: serde_json::from_str(r.get("profile"))?,
                fetched_at: from_millis(r.get("fetched_at"))?,
            })
        })
        .transpose()
    }

    pub async fn put_cache(&self, username: &str, cached: &CachedProfile) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO practice_cache (username, profile, fetched_at) VALUES (?, ?, ?)
            ON CONFLICT(username) DO UPDATE SET
                profile = excluded.profile,
                fetched_at = excluded.fetched_at
            "#,
        )
        .bind(username)
        .bind(serde_json::to_string(&cached.profile)?)
        .bind(to_millis(cached.fetched_at))
        .execute(&*self.pool)
        .await?;

        Ok(())
    }
}
