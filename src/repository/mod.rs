pub mod daily_record_repository;
pub mod database;
pub mod practice_repository;
pub mod quick_link_repository;
pub mod settings_repository;
pub mod task_repository;

use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct Repository {
    pub pool: Arc<SqlitePool>,
    pub tasks: task_repository::TaskRepository,
    pub daily_records: daily_record_repository::DailyRecordRepository,
    pub practice: practice_repository::PracticeRepository,
    pub quick_links: quick_link_repository::QuickLinkRepository,
    pub settings: settings_repository::SettingsRepository,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        let pool = Arc::new(pool);
        Self {
            tasks: task_repository::TaskRepository::new(pool.clone()),
            daily_records: daily_record_repository::DailyRecordRepository::new(pool.clone()),
            practice: practice_repository::PracticeRepository::new(pool.clone()),
            quick_links: quick_link_repository::QuickLinkRepository::new(pool.clone()),
            settings: settings_repository::SettingsRepository::new(pool.clone()),
            pool,
        }
    }
}
