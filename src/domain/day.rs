use chrono::{DateTime, Duration, Local, NaiveDate, Timelike};

/// A "day" starts at 5 AM local time, not midnight. Anything before the
/// cutoff still belongs to the previous calendar date.
pub const DAY_START_HOUR: u32 = 5;

/// Maps an instant onto the effective calendar day it belongs to.
pub fn effective_day(instant: DateTime<Local>) -> NaiveDate {
    if instant.hour() < DAY_START_HOUR {
        instant.date_naive() - Duration::days(1)
    } else {
        instant.date_naive()
    }
}
