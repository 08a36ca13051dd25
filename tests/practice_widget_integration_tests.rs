use async_trait::async_trait;
use chrono::{Local, TimeZone};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use daydash::domain::practice::{DailyChallenge, PracticeProfile};
use daydash::services::error::StatsError;
use daydash::services::practice_stats::{PracticeApi, PracticeStatsService};
use daydash::test_helpers::TestContext;

/// Replays a fixed script of responses, one per fetch.
struct ScriptedApi {
    responses: Mutex<VecDeque<Result<PracticeProfile, StatsError>>>,
}

impl ScriptedApi {
    fn new(responses: Vec<Result<PracticeProfile, StatsError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
        }
    }
}

#[async_trait]
impl PracticeApi for ScriptedApi {
    async fn fetch_profile(&self, _username: &str) -> Result<PracticeProfile, StatsError> {
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(StatsError::Network("script exhausted".to_string())))
    }

    async fn fetch_daily_challenge(&self) -> Result<DailyChallenge, StatsError> {
        Ok(DailyChallenge {
            question_link: "https://example.com/problems/two-sum".to_string(),
        })
    }
}

fn profile(total: u32) -> PracticeProfile {
    PracticeProfile {
        total_solved: total,
        easy_solved: total / 2,
        medium_solved: total / 3,
        hard_solved: total / 6,
        total_easy: 800,
        total_medium: 1700,
        total_hard: 700,
        ranking: 54321,
        submission_calendar: HashMap::new(),
    }
}

fn stats_service(ctx: &TestContext, script: Vec<Result<PracticeProfile, StatsError>>) -> PracticeStatsService {
    PracticeStatsService::new(
        Arc::new(ScriptedApi::new(script)),
        ctx.repository.clone(),
        Arc::new(ctx.clock.clone()),
    )
    .with_retry_policy(3, Duration::from_millis(1), Duration::from_millis(4))
}

#[tokio::test]
async fn test_streak_builds_over_polled_days() {
    let ctx = TestContext::new_for_test().await;
    let stats = stats_service(
        &ctx,
        vec![
            Ok(profile(100)), // day 1: baseline observation
            Ok(profile(101)), // day 1: one solved, qualifies
            Ok(profile(103)), // day 2: more than yesterday
            Ok(profile(103)), // day 3: nothing new
        ],
    );
    stats.set_username("alice").await.unwrap();

    stats.refresh("alice").await.unwrap();
    assert_eq!(stats.current_streak().await, 0);

    stats.refresh("alice").await.unwrap();
    assert_eq!(stats.current_streak().await, 1);

    ctx.clock
        .set(Local.with_ymd_and_hms(2024, 1, 16, 10, 0, 0).unwrap());
    stats.refresh("alice").await.unwrap();
    assert_eq!(stats.current_streak().await, 2);

    ctx.clock
        .set(Local.with_ymd_and_hms(2024, 1, 17, 10, 0, 0).unwrap());
    stats.refresh("alice").await.unwrap();
    assert_eq!(stats.current_streak().await, 0);

    let history = stats.history().await.unwrap();
    assert_eq!(history.len(), 3);
    assert!(history[0].is_streak_day);
    assert!(history[1].is_streak_day);
    assert!(!history[2].is_streak_day);
}

#[tokio::test]
async fn test_outage_serves_recent_cache() {
    let ctx = TestContext::new_for_test().await;
    let stats = stats_service(
        &ctx,
        vec![
            Ok(profile(42)),
            Err(StatsError::Network("down".to_string())),
            Err(StatsError::Network("down".to_string())),
            Err(StatsError::Network("down".to_string())),
        ],
    );

    stats.refresh("alice").await.unwrap();

    // Twenty minutes later the endpoint is down; the cached profile serves
    ctx.clock.advance(chrono::Duration::minutes(20));
    let served = stats.refresh("alice").await.unwrap();
    assert_eq!(served.total_solved, 42);
}

#[tokio::test]
async fn test_outage_with_stale_cache_surfaces_error() {
    let ctx = TestContext::new_for_test().await;
    let stats = stats_service(
        &ctx,
        vec![
            Ok(profile(42)),
            Err(StatsError::Network("down".to_string())),
            Err(StatsError::Network("down".to_string())),
            Err(StatsError::Network("down".to_string())),
        ],
    );

    stats.refresh("alice").await.unwrap();

    ctx.clock.advance(chrono::Duration::hours(3));
    assert!(matches!(
        stats.refresh("alice").await,
        Err(StatsError::Network(_))
    ));
}

#[tokio::test]
async fn test_switching_user_starts_a_fresh_streak() {
    let ctx = TestContext::new_for_test().await;
    let stats = stats_service(
        &ctx,
        vec![
            Ok(profile(100)),
            Ok(profile(102)),
            Ok(profile(7)), // bob's first observation, baseline only
        ],
    );

    stats.set_username("alice").await.unwrap();
    stats.refresh("alice").await.unwrap();
    stats.refresh("alice").await.unwrap();
    assert_eq!(stats.current_streak().await, 1);

    stats.set_username("bob").await.unwrap();
    assert_eq!(stats.current_streak().await, 0);
    assert!(stats.history().await.unwrap().is_empty());

    stats.refresh("bob").await.unwrap();
    let history = stats.history().await.unwrap();
    assert_eq!(history.len(), 1);
    assert!(!history[0].is_streak_day);
}

#[tokio::test]
async fn test_daily_challenge_passthrough() {
    let ctx = TestContext::new_for_test().await;
    let stats = stats_service(&ctx, vec![]);

    let challenge = stats.daily_challenge().await.unwrap();
    assert_eq!(
        challenge.question_link,
        "https://example.com/problems/two-sum"
    );
}
