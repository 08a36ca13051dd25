use anyhow::Result;
use chrono::NaiveDate;
use sqlx::{Row, SqlitePool};
use std::collections::HashSet;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::daily_record::DailyRecord;

#[derive(Clone)]
pub struct DailyRecordRepository {
    pool: Arc<SqlitePool>,
}

impl DailyRecordRepository {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self { pool }
    }

    pub async fn upsert(&self, record: &DailyRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO daily_records (
                date, completed_count, total_count,
                completed_task_ids, repeating_task_ids, non_repeating_task_ids
            ) VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(date) DO UPDATE SET
                completed_count = excluded.completed_count,
                total_count = excluded.total_count,
                completed_task_ids = excluded.completed_task_ids,
                repeating_task_ids = excluded.repeating_task_ids,
                non_repeating_task_ids = excluded.non_repeating_task_ids
            "#,
        )
        .bind(record.date.to_string())
        .bind(record.completed_count)
        .bind(record.total_count)
        .bind(ids_to_json(&record.completed_task_ids)?)
        .bind(ids_to_json(&record.repeating_task_ids)?)
        .bind(ids_to_json(&record.non_repeating_task_ids)?)
        .execute(&*self.pool)
        .await?;

        Ok(())
    }

    pub async fn get(&self, date: NaiveDate) -> Result<Option<DailyRecord>> {
        let row = sqlx::query("SELECT * FROM daily_records WHERE date = ?")
            .bind(date.to_string())
            .fetch_optional(&*self.pool)
            .await?;

        row.map(row_to_record).transpose()
    }

    pub async fn list_all(&self) -> Result<Vec<DailyRecord>> {
        let rows = sqlx::query("SELECT * FROM daily_records ORDER BY date ASC")
            .fetch_all(&*self.pool)
            .await?;

        rows.into_iter().map(row_to_record).collect()
    }
}

fn ids_to_json(ids: &HashSet<Uuid>) -> Result<String> {
    Ok(serde_json::to_string(ids)?)
}

fn row_to_record(row: sqlx::sqlite::SqliteRow) -> Result<DailyRecord> {
    Ok(DailyRecord {
        date: row.get::<String, _>("date").parse()?,
        completed_count: row.get("completed_count"),
        total_count: row.get("total_count"),
        completed_task_ids: serde_json::from_str(row.get("completed_task_ids"))?,
        repeating_task_ids: serde_json::from_str(row.get("repeating_task_ids"))?,
        non_repeating_task_ids: serde_json::from_str(row.get("non_repeating_task_ids"))?,
    })
}
