use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate};
use rand::Rng;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::domain::day::effective_day;
use crate::domain::practice::{
    CachedProfile, DailyChallenge, PracticeDay, PracticeProfile, WidgetSettings,
};
use crate::domain::quick_link::normalize_url;
use crate::repository::Repository;
use crate::services::clock::Clock;
use crate::services::error::StatsError;
use crate::services::validation::InputValidator;

pub const USERNAME_KEY: &str = "practice_username";
pub const BASELINE_SOLVED_KEY: &str = "practice_baseline_solved";
pub const SHOW_CONTEST_KEY: &str = "practice_show_contest";
pub const SHOW_STUDY_PLAN_KEY: &str = "practice_show_study_plan";
pub const SHOW_DAILY_KEY: &str = "practice_show_daily";
pub const SHOW_SHEET_KEY: &str = "practice_show_sheet";
pub const SHEET_URL_KEY: &str = "practice_sheet_url";

/// Days of observation history kept for the widget.
const HISTORY_WINDOW_DAYS: i64 = 30;

/// The two remote read-only endpoints the widget consumes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PracticeApi: Send + Sync {
    async fn fetch_profile(&self, username: &str) -> Result<PracticeProfile, StatsError>;
    async fn fetch_daily_challenge(&self) -> Result<DailyChallenge, StatsError>;
}

#[derive(Deserialize)]
struct RawProfile {
    #[serde(rename = "totalSolved")]
    total_solved: Option<u32>,
    #[serde(rename = "easySolved", default)]
    easy_solved: u32,
    #[serde(rename = "mediumSolved", default)]
    medium_solved: u32,
    #[serde(rename = "hardSolved", default)]
    hard_solved: u32,
    #[serde(rename = "totalEasy", default)]
    total_easy: u32,
    #[serde(rename = "totalMedium", default)]
    total_medium: u32,
    #[serde(rename = "totalHard", default)]
    total_hard: u32,
    #[serde(default)]
    ranking: u32,
    #[serde(rename = "submissionCalendar", default)]
    submission_calendar: HashMap<String, u32>,
}

#[derive(Deserialize)]
struct RawDailyChallenge {
    #[serde(rename = "questionLink")]
    question_link: Option<String>,
}

/// reqwest-backed implementation against the public stats mirror.
pub struct HttpPracticeApi {
    client: reqwest::Client,
    profile_base_url: String,
    challenge_url: String,
}

impl HttpPracticeApi {
    pub fn new() -> Self {
        Self::with_endpoints(
            "https://leetcode-api-faisalshohag.vercel.app".to_string(),
            "https://alfa-leetcode-api.onrender.com/daily".to_string(),
        )
    }

    pub fn with_endpoints(profile_base_url: String, challenge_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            profile_base_url,
            challenge_url,
        }
    }
}

impl Default for HttpPracticeApi {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PracticeApi for HttpPracticeApi {
    async fn fetch_profile(&self, username: &str) -> Result<PracticeProfile, StatsError> {
        let url = format!("{}/{}", self.profile_base_url, username);
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| StatsError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StatsError::UserNotFound {
                username: username.to_string(),
            });
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(StatsError::RateLimited { retry_after });
        }
        if !status.is_success() {
            return Err(StatsError::Network(format!("unexpected status {status}")));
        }

        let raw: RawProfile = response
            .json()
            .await
            .map_err(|e| StatsError::MalformedPayload(e.to_string()))?;

        let total_solved = raw
            .total_solved
            .ok_or_else(|| StatsError::MalformedPayload("missing totalSolved".to_string()))?;

        Ok(PracticeProfile {
            total_solved,
            easy_solved: raw.easy_solved,
            medium_solved: raw.medium_solved,
            hard_solved: raw.hard_solved,
            total_easy: raw.total_easy,
            total_medium: raw.total_medium,
            total_hard: raw.total_hard,
            ranking: raw.ranking,
            submission_calendar: raw.submission_calendar,
        })
    }

    async fn fetch_daily_challenge(&self) -> Result<DailyChallenge, StatsError> {
        let response = self
            .client
            .get(&self.challenge_url)
            .send()
            .await
            .map_err(|e| StatsError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StatsError::Network(format!(
                "unexpected status {}",
                response.status()
            )));
        }

        let raw: RawDailyChallenge = response
            .json()
            .await
            .map_err(|e| StatsError::MalformedPayload(e.to_string()))?;

        raw.question_link
            .map(|question_link| DailyChallenge { question_link })
            .ok_or_else(|| StatsError::MalformedPayload("missing questionLink".to_string()))
    }
}

/// Polls the remote counter and maintains the widget's own daily streak
/// history: a day qualifies when the solved total strictly increased against
/// the previous observation.
pub struct PracticeStatsService {
    api: Arc<dyn PracticeApi>,
    repository: Arc<Repository>,
    clock: Arc<dyn Clock>,
    max_retries: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl PracticeStatsService {
    pub fn new(api: Arc<dyn PracticeApi>, repository: Arc<Repository>, clock: Arc<dyn Clock>) -> Self {
        Self {
            api,
            repository,
            clock,
            max_retries: 3,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(8),
        }
    }

    /// Shrinks the backoff for tests.
    pub fn with_retry_policy(
        mut self,
        max_retries: u32,
        base_delay: Duration,
        max_delay: Duration,
    ) -> Self {
        self.max_retries = max_retries;
        self.base_delay = base_delay;
        self.max_delay = max_delay;
        self
    }

    /// Fetches fresh stats with bounded retries and exponential backoff.
    /// Exhausted retries fall back to the cached response when it is younger
    /// than an hour; otherwise the last error surfaces to the caller.
    pub async fn refresh(&self, username: &str) -> Result<PracticeProfile, StatsError> {
        let mut delay = self.base_delay;
        let mut attempt = 0u32;

        let err = loop {
            attempt += 1;
            match self.api.fetch_profile(username).await {
                Ok(profile) => {
                    self.record_observation(username, &profile).await;
                    return Ok(profile);
                }
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let wait = match &e {
                        StatsError::RateLimited {
                            retry_after: Some(after),
                        } => *after,
                        _ => delay,
                    };
                    let jitter = Duration::from_millis(rand::thread_rng().gen_range(0..500));
                    warn!(
                        attempt,
                        "stats fetch failed ({}), retrying in {:?}", e, wait
                    );
                    tokio::time::sleep((wait + jitter).min(self.max_delay)).await;
                    delay = (delay * 2).min(self.max_delay);
                }
                Err(e) => break e,
            }
        };

        if let Ok(Some(cached)) = self.repository.practice.get_cache(username).await {
            // Cached responses older than an hour are unusable as a fallback
            if self.clock.now() - cached.fetched_at < ChronoDuration::hours(1) {
                info!("stats endpoint unavailable, serving cached response");
                return Ok(cached.profile);
            }
        }

        Err(err)
    }

    /// Reads the stored username and refreshes for it; used by the poll loop.
    pub async fn refresh_current(&self) -> Result<Option<PracticeProfile>, StatsError> {
        let username = match self.username().await {
            Ok(Some(username)) => username,
            Ok(None) => return Ok(None),
            Err(e) => {
                warn!("Failed to read stored username: {:#}", e);
                return Ok(None);
            }
        };
        self.refresh(&username).await.map(Some)
    }

    /// Consecutive qualifying effective days walking backward from today.
    pub async fn current_streak(&self) -> u32 {
        let days = match self.repository.practice.load_days().await {
            Ok(days) => days,
            Err(e) => {
                warn!("Failed to load practice history: {:#}", e);
                return 0;
            }
        };
        let by_date: HashMap<NaiveDate, &PracticeDay> =
            days.iter().map(|d| (d.date, d)).collect();

        let mut streak = 0;
        let mut date = self.clock.effective_today();
        while matches!(by_date.get(&date), Some(day) if day.is_streak_day) {
            streak += 1;
            date -= ChronoDuration::days(1);
        }
        streak
    }

    pub async fn history(&self) -> Result<Vec<PracticeDay>> {
        self.repository.practice.load_days().await
    }

    pub async fn username(&self) -> Result<Option<String>> {
        self.repository.settings.get(USERNAME_KEY).await
    }

    /// Stores a new username. Switching users clears the baseline and the
    /// daily history so the new user's streak starts clean.
    pub async fn set_username(&self, username: &str) -> Result<String> {
        let username = InputValidator::validate_username(username)?;

        let previous = self.repository.settings.get(USERNAME_KEY).await?;
        if previous.as_deref() != Some(username.as_str()) {
            self.repository.settings.delete(BASELINE_SOLVED_KEY).await?;
            self.repository.practice.clear_days().await?;
        }
        self.repository.settings.set(USERNAME_KEY, &username).await?;

        Ok(username)
    }

    pub async fn daily_challenge(&self) -> Result<DailyChallenge, StatsError> {
        self.api.fetch_daily_challenge().await
    }

    pub async fn widget_settings(&self) -> Result<WidgetSettings> {
        let defaults = WidgetSettings::default();
        Ok(WidgetSettings {
            show_contest: self.flag(SHOW_CONTEST_KEY, defaults.show_contest).await?,
            show_study_plan: self
                .flag(SHOW_STUDY_PLAN_KEY, defaults.show_study_plan)
                .await?,
            show_daily: self.flag(SHOW_DAILY_KEY, defaults.show_daily).await?,
            show_sheet: self.flag(SHOW_SHEET_KEY, defaults.show_sheet).await?,
            sheet_url: self.repository.settings.get(SHEET_URL_KEY).await?,
        })
    }

    pub async fn set_widget_settings(&self, settings: &WidgetSettings) -> Result<()> {
        let flags = [
            (SHOW_CONTEST_KEY, settings.show_contest),
            (SHOW_STUDY_PLAN_KEY, settings.show_study_plan),
            (SHOW_DAILY_KEY, settings.show_daily),
            (SHOW_SHEET_KEY, settings.show_sheet),
        ];
        for (key, value) in flags {
            self.repository.settings.set(key, &value.to_string()).await?;
        }

        match &settings.sheet_url {
            Some(url) => {
                let url = InputValidator::validate_link_url(url)?;
                self.repository
                    .settings
                    .set(SHEET_URL_KEY, &normalize_url(&url))
                    .await?;
            }
            None => self.repository.settings.delete(SHEET_URL_KEY).await?,
        }

        Ok(())
    }

    async fn flag(&self, key: &str, default: bool) -> Result<bool> {
        Ok(self
            .repository
            .settings
            .get(key)
            .await?
            .map(|v| v == "true")
            .unwrap_or(default))
    }

    /// Caches the response and updates today's history entry. The very
    /// first observation only records the baseline; a day qualifies when
    /// the total strictly increased against today's earlier observation,
    /// else yesterday's entry, else the baseline.
    async fn record_observation(&self, username: &str, profile: &PracticeProfile) {
        let now = self.clock.now();
        let today = effective_day(now);

        let cached = CachedProfile {
            profile: profile.clone(),
            fetched_at: now,
        };
        if let Err(e) = self.repository.practice.put_cache(username, &cached).await {
            warn!("Failed to cache stats response: {:#}", e);
        }

        let mut days = match self.repository.practice.load_days().await {
            Ok(days) => days,
            Err(e) => {
                warn!("Failed to load practice history: {:#}", e);
                Vec::new()
            }
        };

        let today_entry = days.iter().find(|d| d.date == today);
        let yesterday_entry = days
            .iter()
            .find(|d| d.date == today - ChronoDuration::days(1));

        let is_streak_day = if let Some(entry) = today_entry {
            profile.total_solved > entry.total_solved || entry.is_streak_day
        } else if let Some(entry) = yesterday_entry {
            profile.total_solved > entry.total_solved
        } else {
            match self.baseline().await {
                Some(baseline) => profile.total_solved > baseline,
                None => {
                    if let Err(e) = self
                        .repository
                        .settings
                        .set(BASELINE_SOLVED_KEY, &profile.total_solved.to_string())
                        .await
                    {
                        warn!("Failed to store baseline: {:#}", e);
                    }
                    false
                }
            }
        };

        let window_start = today - ChronoDuration::days(HISTORY_WINDOW_DAYS);
        days.retain(|d| d.date != today && d.date >= window_start);
        days.push(PracticeDay {
            date: today,
            total_solved: profile.total_solved,
            is_streak_day,
        });
        days.sort_by_key(|d| d.date);

        if let Err(e) = self.repository.practice.replace_days(&days).await {
            warn!("Failed to persist practice history: {:#}", e);
        }
    }

    async fn baseline(&self) -> Option<u32> {
        match self.repository.settings.get(BASELINE_SOLVED_KEY).await {
            Ok(value) => value.and_then(|v| v.parse().ok()),
            Err(e) => {
                warn!("Failed to read baseline: {:#}", e);
                None
            }
        }
    }
}

/// Start the periodic poll in the background. The poll never blocks
/// task-tracking interactions; a result arriving after a username change is
/// simply superseded by the next one.
pub fn start_stats_poll_background(
    service: Arc<PracticeStatsService>,
    poll_interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(poll_interval);
        loop {
            interval.tick().await;
            match service.refresh_current().await {
                Ok(Some(profile)) => {
                    info!(total_solved = profile.total_solved, "stats refreshed")
                }
                Ok(None) => {} // no username configured yet
                Err(e) => error!("Stats poll failed: {}", e),
            }
        }
    })
}
