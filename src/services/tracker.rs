use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::daily_record::DailyRecord;
use crate::domain::day::effective_day;
use crate::domain::task::{Filter, Priority, Task};
use crate::repository::Repository;
use crate::services::analytics::{self, Analytics};
use crate::services::clock::Clock;
use crate::services::error::TrackerError;
use crate::services::validation::InputValidator;

/// The Daily Tracking Engine: owns the live task collection and the
/// daily-record history, recomputes today's aggregate on every change, and
/// writes through to the store. Store failures are logged and swallowed;
/// the in-memory state stays authoritative.
pub struct TrackerService {
    repository: Arc<Repository>,
    clock: Arc<dyn Clock>,
    tasks: RwLock<Vec<Task>>,
    history: RwLock<BTreeMap<NaiveDate, DailyRecord>>,
}

impl TrackerService {
    /// Builds the engine from persisted state. Unreadable state degrades to
    /// empty collections rather than failing startup.
    pub async fn load(repository: Arc<Repository>, clock: Arc<dyn Clock>) -> Self {
        let tasks = match repository.tasks.load_all().await {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!("Failed to load tasks, starting empty: {:#}", e);
                Vec::new()
            }
        };

        let history = match repository.daily_records.list_all().await {
            Ok(records) => records.into_iter().map(|r| (r.date, r)).collect(),
            Err(e) => {
                warn!("Failed to load daily records, starting empty: {:#}", e);
                BTreeMap::new()
            }
        };

        Self {
            repository,
            clock,
            tasks: RwLock::new(tasks),
            history: RwLock::new(history),
        }
    }

    /// Creates a task and prepends it (most-recent-first ordering).
    pub async fn add_task(
        &self,
        text: &str,
        priority: Priority,
        is_repeating: bool,
    ) -> Result<Task, TrackerError> {
        let text = InputValidator::validate_task_text(text)?;
        let task = Task::new(text, priority, is_repeating, self.clock.now());

        let mut tasks = self.tasks.write().await;
        tasks.insert(0, task.clone());
        self.after_change(&tasks).await;

        Ok(task)
    }

    /// Flips completion state. Unknown ids are a silent no-op.
    pub async fn toggle_task(&self, id: Uuid) {
        let mut tasks = self.tasks.write().await;
        let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
            return;
        };
        task.toggle(self.clock.now());
        self.after_change(&tasks).await;
    }

    /// Replaces a task's text with the trimmed value. Empty or
    /// whitespace-only text is rejected with no state change; unknown ids
    /// are a silent no-op.
    pub async fn update_task(&self, id: Uuid, text: &str) -> Result<(), TrackerError> {
        let text = InputValidator::validate_task_text(text)?;

        let mut tasks = self.tasks.write().await;
        let Some(task) = tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(());
        };
        task.set_text(text, self.clock.now());
        self.after_change(&tasks).await;

        Ok(())
    }

    /// Removes a task. Unknown ids are a silent no-op.
    pub async fn delete_task(&self, id: Uuid) {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return;
        }
        self.after_change(&tasks).await;
    }

    /// Replaces the collection with the caller-supplied permutation. The
    /// caller is responsible for merging any filtered view back into the
    /// full list; no filtering or validation happens here.
    pub async fn reorder_tasks(&self, new_order: Vec<Task>) {
        let mut tasks = self.tasks.write().await;
        *tasks = new_order;
        self.after_change(&tasks).await;
    }

    /// Day-boundary reset: every repeating task respawns as a fresh
    /// incomplete instance and non-repeating tasks drop out of the live
    /// collection (their history stays in prior DailyRecords). Returns the
    /// number of respawned tasks.
    pub async fn rollover(&self) -> usize {
        let now = self.clock.now();
        let today = effective_day(now);

        let mut tasks = self.tasks.write().await;
        let fresh: Vec<Task> = tasks
            .iter()
            .filter(|t| t.is_repeating)
            .map(|t| t.respawn(now))
            .collect();
        let respawned = fresh.len();
        *tasks = fresh;

        // Start the new day from an explicit empty record, then let the
        // recorder fill it in from the fresh instances.
        self.history
            .write()
            .await
            .insert(today, DailyRecord::empty(today));
        self.after_change(&tasks).await;

        info!(%today, respawned, "daily rollover complete");
        respawned
    }

    pub async fn tasks(&self) -> Vec<Task> {
        self.tasks.read().await.clone()
    }

    pub async fn tasks_filtered(&self, filter: Filter) -> Vec<Task> {
        self.tasks
            .read()
            .await
            .iter()
            .filter(|t| t.matches(filter))
            .cloned()
            .collect()
    }

    pub async fn record_for(&self, date: NaiveDate) -> Option<DailyRecord> {
        self.history.read().await.get(&date).cloned()
    }

    pub async fn history(&self) -> Vec<DailyRecord> {
        self.history.read().await.values().cloned().collect()
    }

    pub async fn analytics(&self) -> Analytics {
        let history = self.history.read().await;
        analytics::compute(&history, self.clock.effective_today())
    }

    pub async fn month_heatmap(&self, year: i32, month: u32) -> BTreeMap<NaiveDate, u32> {
        let history = self.history.read().await;
        analytics::month_heatmap(&history, year, month)
    }

    /// Recompute today's DailyRecord from the live collection and write
    /// everything through. Past days are never rewritten here: non-repeating
    /// tasks from prior days are no longer in the live collection.
    async fn after_change(&self, tasks: &[Task]) {
        let today = self.clock.effective_today();
        let record = compute_record(tasks, today);

        self.history.write().await.insert(today, record.clone());

        if let Err(e) = self.repository.daily_records.upsert(&record).await {
            warn!("Failed to persist daily record for {}: {:#}", today, e);
        }
        if let Err(e) = self.repository.tasks.replace_all(tasks).await {
            warn!("Failed to persist task collection: {:#}", e);
        }
    }
}

/// Today's aggregate: total = repeating tasks + non-repeating tasks created
/// today; completed = contributing tasks whose completion falls in today's
/// effective day. Completions are only counted for contributing tasks, which
/// keeps `completed_count <= total_count`.
fn compute_record(tasks: &[Task], today: NaiveDate) -> DailyRecord {
    let mut record = DailyRecord::empty(today);

    for task in tasks {
        let contributes = if task.is_repeating {
            record.repeating_task_ids.insert(task.id);
            true
        } else if effective_day(task.created_at) == today {
            record.non_repeating_task_ids.insert(task.id);
            true
        } else {
            false
        };

        if !contributes {
            continue;
        }
        record.total_count += 1;

        let completed_today = task.completed
            && task
                .last_completed
                .map(|done| effective_day(done) == today)
                .unwrap_or(false);
        if completed_today {
            record.completed_count += 1;
            record.completed_task_ids.insert(task.id);
        }
    }

    record
}
