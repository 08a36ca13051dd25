use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use daydash::repository::{database, Repository};
use daydash::services::clock::{Clock, SystemClock};
use daydash::services::practice_stats::{
    start_stats_poll_background, HttpPracticeApi, PracticeStatsService,
};
use daydash::services::rollover::start_rollover_background;
use daydash::services::tracker::TrackerService;

const STATS_POLL_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let pool = database::init_database("daydash.db").await?;
    let repository = Arc::new(Repository::new(pool));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let tracker = Arc::new(TrackerService::load(repository.clone(), clock.clone()).await);
    info!(tasks = tracker.tasks().await.len(), "tracker loaded");

    let rollover = start_rollover_background(tracker.clone(), repository.clone(), clock.clone());

    let stats = Arc::new(PracticeStatsService::new(
        Arc::new(HttpPracticeApi::new()),
        repository.clone(),
        clock.clone(),
    ));
    let stats_poll = start_stats_poll_background(stats, STATS_POLL_INTERVAL);

    info!("daydash engine running, press Ctrl-C to stop");
    tokio::signal::ctrl_c().await?;

    rollover.abort();
    stats_poll.abort();
    info!("shutting down");

    Ok(())
}
