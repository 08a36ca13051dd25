use anyhow::Result;
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{error, info};

use crate::repository::Repository;
use crate::services::clock::Clock;
use crate::services::tracker::TrackerService;

/// Settings key holding the effective day the last rollover ran for.
pub const LAST_ROLLOVER_DAY_KEY: &str = "last_rollover_day";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloverOutcome {
    Unchanged,
    RolledOver(NaiveDate),
}

/// Drives the day-boundary reset. Instead of firing only inside the exact
/// 05:00 minute (which a suspended process would sleep through), every tick
/// compares a persisted last-rollover day against the current effective day,
/// so a missed boundary is caught on the next tick or at startup.
pub struct RolloverService {
    tracker: Arc<TrackerService>,
    repository: Arc<Repository>,
    clock: Arc<dyn Clock>,
    check_interval: Duration,
}

impl RolloverService {
    pub fn new(
        tracker: Arc<TrackerService>,
        repository: Arc<Repository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tracker,
            repository,
            clock,
            check_interval: Duration::from_secs(60), // Check every minute
        }
    }

    /// Runs one check at startup, then forever on the timer.
    pub async fn run(self) {
        let mut interval = interval(self.check_interval);

        loop {
            interval.tick().await;

            if let Err(e) = self.tick().await {
                error!("Rollover check failed: {:#}", e);
            }
        }
    }

    /// Single rollover check. The first tick ever just records the current
    /// effective day as the baseline without resetting anything.
    pub async fn tick(&self) -> Result<RolloverOutcome> {
        let today = self.clock.effective_today();

        let last_run: Option<NaiveDate> = self
            .repository
            .settings
            .get(LAST_ROLLOVER_DAY_KEY)
            .await?
            .map(|value| value.parse())
            .transpose()?;

        match last_run {
            None => {
                self.repository
                    .settings
                    .set(LAST_ROLLOVER_DAY_KEY, &today.to_string())
                    .await?;
                info!(%today, "rollover baseline recorded");
                Ok(RolloverOutcome::Unchanged)
            }
            Some(last) if last < today => {
                self.tracker.rollover().await;
                self.repository
                    .settings
                    .set(LAST_ROLLOVER_DAY_KEY, &today.to_string())
                    .await?;
                Ok(RolloverOutcome::RolledOver(today))
            }
            Some(_) => Ok(RolloverOutcome::Unchanged),
        }
    }
}

/// Start the rollover checker in the background.
pub fn start_rollover_background(
    tracker: Arc<TrackerService>,
    repository: Arc<Repository>,
    clock: Arc<dyn Clock>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let service = RolloverService::new(tracker, repository, clock);
        service.run().await;
    })
}
