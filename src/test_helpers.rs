// Test helpers for integration testing

use chrono::{DateTime, Local, TimeZone};
use std::sync::Arc;

use crate::repository::database::init_test_database;
use crate::repository::Repository;
use crate::services::clock::{Clock, ManualClock};
use crate::services::tracker::TrackerService;

/// A weekday noon, comfortably past the 5 AM cutoff.
pub fn midday() -> DateTime<Local> {
    Local.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap()
}

pub struct TestContext {
    pub repository: Arc<Repository>,
    pub clock: ManualClock,
    pub tracker: Arc<TrackerService>,
}

impl TestContext {
    pub async fn new_for_test() -> Self {
        Self::at(midday()).await
    }

    pub async fn at(now: DateTime<Local>) -> Self {
        let pool = init_test_database()
            .await
            .unwrap_or_else(|e| panic!("Failed to create test database: {e:#}"));
        let repository = Arc::new(Repository::new(pool));
        let clock = ManualClock::new(now);
        let clock_dyn: Arc<dyn Clock> = Arc::new(clock.clone());
        let tracker = Arc::new(TrackerService::load(repository.clone(), clock_dyn).await);
        Self {
            repository,
            clock,
            tracker,
        }
    }

    /// A fresh tracker over the same store, as after a process restart.
    pub async fn reload_tracker(&self) -> Arc<TrackerService> {
        let clock: Arc<dyn Clock> = Arc::new(self.clock.clone());
        Arc::new(TrackerService::load(self.repository.clone(), clock).await)
    }
}
