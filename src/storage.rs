//! Storage layer for dayplan
//!
//! Persists the task collection as a single JSON file holding an array of
//! task records. Loading is tolerant by design: a corrupt store degrades to
//! an empty collection, and individually invalid records are dropped while
//! valid siblings survive. Saving is best effort; a failed write is logged
//! and the in-memory collection stays authoritative for the session.
//!
//! # Record migration
//!
//! Older store shapes are upgraded on load through a versioned chain of pure
//! functions over raw JSON, applied before validation:
//!
//! - v0 -> v1: rename string-typed `start`/`end` to `startTime`/`endTime`
//! - v1 -> v2: stamp the record with the current format-version marker
//!
//! Each step is a shallow merge on the record object, so fields the current
//! version does not know about pass through untouched. New migrations are
//! appended to [`MIGRATIONS`] without editing old steps.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::task::{Task, TaskSet};

/// Current store format version, stamped on every saved record
pub const STORE_VERSION: &str = "2";

/// Default store file name inside the data directory
pub const STORE_FILE: &str = "tasks.json";

/// Storage manager for the task store file
#[derive(Debug, Clone)]
pub struct Storage {
    path: PathBuf,
}

impl Storage {
    /// Create a storage manager for an explicit store file
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Storage at the platform data directory (e.g. `~/.local/share/dayplan`)
    pub fn default_location() -> Result<Self> {
        let dirs = ProjectDirs::from("", "", "dayplan").ok_or_else(|| {
            Error::OperationFailed("could not determine a data directory".to_string())
        })?;
        Ok(Self::new(dirs.data_dir().join(STORE_FILE)))
    }

    /// Path to the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the task collection.
    ///
    /// Never fails: an absent store yields an empty collection; an unreadable
    /// or structurally corrupt store is cleared and yields an empty
    /// collection; records failing the task invariant are dropped.
    pub fn load(&self) -> TaskSet {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return TaskSet::new();
            }
            Err(err) => {
                tracing::warn!(path = %self.path.display(), %err, "failed to read task store");
                return TaskSet::new();
            }
        };

        let payload: Value = match serde_json::from_str(&raw) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), %err, "task store is not valid JSON, clearing it");
                self.clear();
                return TaskSet::new();
            }
        };

        let Value::Array(records) = payload else {
            tracing::warn!(path = %self.path.display(), "task store is not an array, clearing it");
            self.clear();
            return TaskSet::new();
        };

        let mut tasks = Vec::with_capacity(records.len());
        for record in records {
            match decode_record(record) {
                Ok(task) => tasks.push(task),
                Err(err) => {
                    tracing::warn!(%err, "dropping invalid task record");
                }
            }
        }

        TaskSet::from_vec(tasks)
    }

    /// Save the task collection, stamping every record with [`STORE_VERSION`].
    ///
    /// Best effort: failures (e.g. a full disk) are logged and swallowed.
    pub fn save(&self, tasks: &TaskSet) {
        if let Err(err) = self.try_save(tasks) {
            tracing::warn!(path = %self.path.display(), %err, "failed to save task store");
        }
    }

    /// Fallible variant of [`save`](Self::save), for callers that must report
    /// a failed write (e.g. one-shot CLI commands)
    pub fn try_save(&self, tasks: &TaskSet) -> Result<()> {
        let stamped: Vec<Task> = tasks
            .iter()
            .map(|task| {
                let mut task = task.clone();
                task.version = Some(STORE_VERSION.to_string());
                task
            })
            .collect();
        let json = serde_json::to_string_pretty(&stamped)?;
        self.write_atomic(json.as_bytes())
    }

    /// Remove the store file, ignoring errors (used when the payload is corrupt)
    fn clear(&self) {
        let _ = fs::remove_file(&self.path);
    }

    /// Write data atomically using temp file + rename
    fn write_atomic(&self, data: &[u8]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let temp_path = self.path.with_extension("tmp");
        let mut file = File::create(&temp_path)?;
        file.write_all(data)?;
        file.sync_all()?;
        fs::rename(&temp_path, &self.path)?;

        Ok(())
    }
}

/// Migrate a raw record through every upgrade step, then decode and validate it
fn decode_record(record: Value) -> Result<Task> {
    let mut record = record;
    for step in MIGRATIONS {
        record = step(record);
    }
    let task: Task = serde_json::from_value(record)?;
    task.validate()?;
    Ok(task)
}

type Migration = fn(Value) -> Value;

/// Upgrade chain, oldest step first. Append new steps; never edit old ones.
const MIGRATIONS: &[Migration] = &[migrate_v0_to_v1, migrate_v1_to_v2];

/// v0 records carried string-typed times under `start`/`end`
fn migrate_v0_to_v1(record: Value) -> Value {
    let Value::Object(mut fields) = record else {
        return record;
    };
    for (old, new) in [("start", "startTime"), ("end", "endTime")] {
        if let Some(value) = fields.remove(old) {
            fields.entry(new).or_insert(value);
        }
    }
    Value::Object(fields)
}

/// v1 records lacked (or carried a stale) format-version marker
fn migrate_v1_to_v2(record: Value) -> Value {
    let Value::Object(mut fields) = record else {
        return record;
    };
    fields.insert("version".to_string(), Value::String(STORE_VERSION.to_string()));
    Value::Object(fields)
}
