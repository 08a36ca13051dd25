use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Aggregate counters and contributing task ids for one effective day.
/// At most one record exists per date; records are updated in place and
/// never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub completed_count: u32,
    pub total_count: u32,
    pub completed_task_ids: HashSet<Uuid>,
    pub repeating_task_ids: HashSet<Uuid>,
    pub non_repeating_task_ids: HashSet<Uuid>,
}

impl DailyRecord {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            completed_count: 0,
            total_count: 0,
            completed_task_ids: HashSet::new(),
            repeating_task_ids: HashSet::new(),
            non_repeating_task_ids: HashSet::new(),
        }
    }

    /// A day counts toward a streak iff something was completed on it.
    pub fn qualifies_for_streak(&self) -> bool {
        self.completed_count > 0
    }
}
