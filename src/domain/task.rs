use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: Uuid,
    pub text: String,
    pub priority: Priority,
    pub completed: bool,
    pub created_at: DateTime<Local>,
    pub last_modified_at: DateTime<Local>,
    pub is_repeating: bool,
    /// Most recent transition into the completed state. Historical marker:
    /// un-completing a task or the daily rollover never clears it.
    pub last_completed: Option<DateTime<Local>>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    All,
    Active,
    Completed,
}

impl Task {
    pub fn new(text: String, priority: Priority, is_repeating: bool, now: DateTime<Local>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text,
            priority,
            completed: false,
            created_at: now,
            last_modified_at: now,
            is_repeating,
            last_completed: None,
        }
    }

    /// Flips the completion state. Completing stamps `last_completed`;
    /// un-completing leaves the historical marker alone.
    pub fn toggle(&mut self, now: DateTime<Local>) {
        self.completed = !self.completed;
        if self.completed {
            self.last_completed = Some(now);
        }
        self.last_modified_at = now;
    }

    pub fn set_text(&mut self, text: String, now: DateTime<Local>) {
        self.text = text;
        self.last_modified_at = now;
    }

    /// Fresh instance of a repeating task for a new effective day: new id,
    /// not completed, `last_completed` carried over from the outgoing one.
    pub fn respawn(&self, now: DateTime<Local>) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: self.text.clone(),
            priority: self.priority,
            completed: false,
            created_at: now,
            last_modified_at: now,
            is_repeating: self.is_repeating,
            last_completed: self.last_completed,
        }
    }

    pub fn matches(&self, filter: Filter) -> bool {
        match filter {
            Filter::All => true,
            Filter::Active => !self.completed,
            Filter::Completed => self.completed,
        }
    }
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }
}
