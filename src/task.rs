//! Task records and the in-memory task collection.
//!
//! A [`Task`] is one time-boxed entry on the day timeline. The full set of
//! tasks lives in a [`TaskSet`], which is the single owning copy while the
//! app runs; the persisted file is a derived snapshot of it.

use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Default duration for tasks created from a timeline click
pub const DEFAULT_TASK_MINUTES: i64 = 60;

/// A single time-boxed task.
///
/// `start_time` and `end_time` are serialized as ISO-8601 strings under the
/// `startTime`/`endTime` keys. Fields the current version does not know
/// about are carried in `extra` so they survive a load/save cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Opaque unique id
    #[serde(default = "generate_task_id")]
    pub id: String,
    /// Human-readable name (non-empty)
    pub name: String,
    /// Start of the task interval
    pub start_time: DateTime<Local>,
    /// End of the task interval (must be after `start_time`)
    pub end_time: DateTime<Local>,
    /// Store format tag, stamped on save
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Unknown fields preserved round-trip
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn generate_task_id() -> String {
    Uuid::new_v4().to_string()
}

impl Task {
    /// Create a task with a freshly generated id.
    pub fn new(name: impl Into<String>, start_time: DateTime<Local>, end_time: DateTime<Local>) -> Self {
        Self {
            id: generate_task_id(),
            name: name.into(),
            start_time,
            end_time,
            version: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Create a one-hour task starting at the given time.
    pub fn one_hour(name: impl Into<String>, start_time: DateTime<Local>) -> Self {
        let end_time = start_time + Duration::minutes(DEFAULT_TASK_MINUTES);
        Self::new(name, start_time, end_time)
    }

    /// Check the record invariants: non-empty name, start strictly before end.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::EmptyName);
        }
        if self.start_time >= self.end_time {
            return Err(Error::InvertedInterval);
        }
        Ok(())
    }

    /// Duration in whole minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }
}

/// The in-memory task collection, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct TaskSet {
    tasks: Vec<Task>,
}

impl TaskSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a collection, dropping records that reuse an earlier id
    pub fn from_vec(tasks: Vec<Task>) -> Self {
        let mut set = Self::default();
        for task in tasks {
            if set.find(&task.id).is_some() {
                tracing::warn!(id = %task.id, "dropping task with duplicate id");
                continue;
            }
            set.tasks.push(task);
        }
        set
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    pub fn as_slice(&self) -> &[Task] {
        &self.tasks
    }

    /// Find a task by id
    pub fn find(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Find a task by id (mutable)
    pub fn find_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id == id)
    }

    /// Insert a new task (validates, rejects duplicate ids)
    pub fn insert(&mut self, task: Task) -> Result<()> {
        task.validate()?;
        if self.find(&task.id).is_some() {
            return Err(Error::InvalidArgument(format!(
                "task already exists: {}",
                task.id
            )));
        }
        self.tasks.push(task);
        Ok(())
    }

    /// Replace the task with the same id (validates the replacement)
    pub fn replace(&mut self, task: Task) -> Result<()> {
        task.validate()?;
        let slot = self
            .tasks
            .iter_mut()
            .find(|existing| existing.id == task.id)
            .ok_or_else(|| Error::TaskNotFound(task.id.clone()))?;
        *slot = task;
        Ok(())
    }

    /// Remove a task by id
    pub fn remove(&mut self, id: &str) -> Option<Task> {
        let idx = self.tasks.iter().position(|task| task.id == id)?;
        Some(self.tasks.remove(idx))
    }
}
