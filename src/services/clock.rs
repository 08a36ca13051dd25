use chrono::{DateTime, Local, NaiveDate};
use parking_lot::Mutex;
use std::sync::Arc;

use crate::domain::day::effective_day;

/// Time source seam. Everything that buckets events by day reads the clock
/// through this trait so tests can drive it without wall-clock waits.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;

    fn effective_today(&self) -> NaiveDate {
        effective_day(self.now())
    }
}

#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Settable clock for tests and the scheduler's own tests.
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Local>>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Local>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    pub fn set(&self, now: DateTime<Local>) {
        *self.now.lock() = now;
    }

    pub fn advance(&self, duration: chrono::Duration) {
        let mut now = self.now.lock();
        *now += duration;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_manual_clock_set_and_advance() {
        let start = Local.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        assert_eq!(clock.now(), start);

        clock.advance(chrono::Duration::hours(3));
        assert_eq!(clock.now(), start + chrono::Duration::hours(3));

        let next = Local.with_ymd_and_hms(2024, 1, 2, 6, 0, 0).unwrap();
        clock.set(next);
        assert_eq!(clock.now(), next);
    }

    #[test]
    fn test_effective_today_applies_cutoff() {
        let clock = ManualClock::new(Local.with_ymd_and_hms(2024, 1, 2, 3, 0, 0).unwrap());
        assert_eq!(
            clock.effective_today(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
    }
}
