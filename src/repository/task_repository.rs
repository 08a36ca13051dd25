use anyhow::{anyhow, Result};
use chrono::{DateTime, Local};
use sqlx::{Row, SqlitePool};
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::task::{Priority, Task};

/// Converts an instant to the integer-millisecond form the store uses.
pub(crate) fn to_millis(instant: DateTime<Local>) -> i64 {
    instant.timestamp_millis()
}

pub(crate) fn from_millis(millis: i64) -> Result<DateTime<Local>> {
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.with_timezone(&Local))
        .ok_or_else(|| anyhow!("timestamp out of range: {}", millis))
}

#[derive(Clone)]
pub struct TaskRepository {
    pool: Arc<SqlitePool>,
}

impl TaskRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    /// Replaces the whole live collection, preserving the given order.
    /// The collection is small and last-write-wins, so a full rewrite per
    /// mutation keeps ordering trivially correct.
    pub async fn replace_all(&self, tasks: &[Task]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM tasks").execute(&mut *tx).await?;

        for (position, task) in tasks.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO tasks (
                    id, text, priority, completed, created_at,
                    last_modified_at, is_repeating, last_completed, position
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(task.id.to_string())
            .bind(&task.text)
            .bind(task.priority.as_str())
            .bind(task.completed as i32)
            .bind(to_millis(task.created_at))
            .bind(to_millis(task.last_modified_at))
            .bind(task.is_repeating as i32)
            .bind(task.last_completed.map(to_millis))
            .bind(position as i64)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn load_all(&self) -> Result<Vec<Task>> {
        let rows = sqlx::query("SELECT * FROM tasks ORDER BY position ASC")
            .fetch_all(&*self.pool)
            .await?;

        let mut tasks = Vec::with_capacity(rows.len());
        for row in rows {
            let priority_str: String = row.get("priority");
            let priority = Priority::parse(&priority_str)
                .ok_or_else(|| anyhow!("unknown priority: {}", priority_str))?;
            let last_completed: Option<i64> = row.get("last_completed");

            tasks.push(Task {
                id: Uuid::parse_str(row.get("id"))?,
                text: row.get("text"),
                priority,
                completed: row.get::<i32, _>("completed") != 0,
                created_at: from_millis(row.get("created_at"))?,
                last_modified_at: from_millis(row.get("last_modified_at"))?,
                is_repeating: row.get::<i32, _>("is_repeating") != 0,
                last_completed: last_completed.map(from_millis).transpose()?,
            });
        }

        Ok(tasks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::database::init_test_database;
    use chrono::TimeZone;

    async fn setup() -> TaskRepository {
        let pool = init_test_database().await.unwrap();
        TaskRepository::new(Arc::new(pool))
    }

    fn sample_task(text: &str) -> Task {
        let now = Local.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        Task::new(text.to_string(), Priority::Medium, false, now)
    }

    #[tokio::test]
    async fn test_replace_and_load_preserves_order() {
        let repo = setup().await;

        let tasks = vec![sample_task("c"), sample_task("a"), sample_task("b")];
        repo.replace_all(&tasks).await.unwrap();

        let loaded = repo.load_all().await.unwrap();
        assert_eq!(loaded, tasks);
    }

    #[tokio::test]
    async fn test_replace_overwrites_previous_collection() {
        let repo = setup().await;

        repo.replace_all(&[sample_task("old")]).await.unwrap();
        let fresh = vec![sample_task("new")];
        repo.replace_all(&fresh).await.unwrap();

        let loaded = repo.load_all().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].text, "new");
    }

    #[tokio::test]
    async fn test_round_trips_completion_state() {
        let repo = setup().await;

        let mut task = sample_task("done");
        task.toggle(Local.with_ymd_and_hms(2024, 1, 15, 14, 0, 0).unwrap());
        repo.replace_all(std::slice::from_ref(&task)).await.unwrap();

        let loaded = repo.load_all().await.unwrap();
        assert!(loaded[0].completed);
        assert_eq!(loaded[0].last_completed, task.last_completed);
    }
}
