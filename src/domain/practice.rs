use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Solved-problem stats for one user, as mapped from the remote profile
/// endpoint. The remote counter contract: `total_solved` is monotonically
/// non-decreasing per user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PracticeProfile {
    pub total_solved: u32,
    pub easy_solved: u32,
    pub medium_solved: u32,
    pub hard_solved: u32,
    pub total_easy: u32,
    pub total_medium: u32,
    pub total_hard: u32,
    pub ranking: u32,
    /// Submission counts keyed by epoch-day string, as the API returns them.
    pub submission_calendar: HashMap<String, u32>,
}

impl PracticeProfile {
    /// Total question count across all difficulties.
    pub fn total_questions(&self) -> u32 {
        self.total_easy + self.total_medium + self.total_hard
    }
}

/// One observation per effective day, kept for a trailing 30-day window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PracticeDay {
    pub date: NaiveDate,
    pub total_solved: u32,
    pub is_streak_day: bool,
}

/// Last good remote response, used as a time-boxed fallback when the
/// endpoint is unreachable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CachedProfile {
    pub profile: PracticeProfile,
    pub fetched_at: DateTime<Local>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyChallenge {
    pub question_link: String,
}

/// Visibility flags for the widget's auxiliary buttons plus the optional
/// practice-sheet link.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WidgetSettings {
    pub show_contest: bool,
    pub show_study_plan: bool,
    pub show_daily: bool,
    pub show_sheet: bool,
    pub sheet_url: Option<String>,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        // Contest and study-plan buttons start hidden, daily and sheet shown.
        Self {
            show_contest: false,
            show_study_plan: false,
            show_daily: true,
            show_sheet: true,
            sheet_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_questions() {
        let profile = PracticeProfile {
            total_solved: 120,
            easy_solved: 70,
            medium_solved: 40,
            hard_solved: 10,
            total_easy: 800,
            total_medium: 1700,
            total_hard: 700,
            ranking: 51234,
            submission_calendar: HashMap::new(),
        };
        assert_eq!(profile.total_questions(), 3200);
    }

    #[test]
    fn test_default_widget_settings() {
        let settings = WidgetSettings::default();
        assert!(!settings.show_contest);
        assert!(!settings.show_study_plan);
        assert!(settings.show_daily);
        assert!(settings.show_sheet);
        assert!(settings.sheet_url.is_none());
    }
}
