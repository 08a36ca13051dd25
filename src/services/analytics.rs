use chrono::{Datelike, Duration, NaiveDate};
use std::collections::BTreeMap;

use crate::domain::daily_record::DailyRecord;

/// Streak and completion statistics derived from the daily-record history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Analytics {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_active_days: u32,
    /// Percentage, rounded to the nearest integer. Zero when nothing has
    /// ever been recorded.
    pub completion_rate: u32,
}

/// Pure derivation over the full history. A day qualifies for a streak iff
/// it has at least one completion; a gap of more than one calendar day
/// breaks a run.
pub fn compute(history: &BTreeMap<NaiveDate, DailyRecord>, today: NaiveDate) -> Analytics {
    let mut longest_streak = 0u32;
    let mut run = 0u32;
    let mut previous: Option<NaiveDate> = None;
    let mut total_active_days = 0u32;
    let mut completed_sum = 0u64;
    let mut total_sum = 0u64;

    // BTreeMap iteration is already ascending by date.
    for record in history.values() {
        completed_sum += u64::from(record.completed_count);
        total_sum += u64::from(record.total_count);

        if !record.qualifies_for_streak() {
            continue;
        }
        total_active_days += 1;

        run = match previous {
            Some(prev) if record.date - prev == Duration::days(1) => run + 1,
            _ => 1,
        };
        previous = Some(record.date);
        longest_streak = longest_streak.max(run);
    }

    // The current streak is the run that ends on today's effective day.
    let current_streak = if previous == Some(today) { run } else { 0 };

    let completion_rate = if total_sum == 0 {
        0
    } else {
        (100.0 * completed_sum as f64 / total_sum as f64).round() as u32
    };

    Analytics {
        current_streak,
        longest_streak,
        total_active_days,
        completion_rate,
    }
}

/// Completed counts for every day of one calendar month; days without a
/// record read as zero. Feeds the heatmap calendar.
pub fn month_heatmap(
    history: &BTreeMap<NaiveDate, DailyRecord>,
    year: i32,
    month: u32,
) -> BTreeMap<NaiveDate, u32> {
    let mut cells = BTreeMap::new();
    let Some(mut day) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return cells;
    };

    while day.month() == month {
        let count = history.get(&day).map(|r| r.completed_count).unwrap_or(0);
        cells.insert(day, count);
        day += Duration::days(1);
    }

    cells
}
