//! End-to-end checks of the store's tolerant load and migration chain,
//! driven through the public library API.

use chrono::{Local, TimeZone};
use tempfile::TempDir;

use dayplan::storage::{Storage, STORE_VERSION};
use dayplan::task::{Task, TaskSet};

fn storage(temp: &TempDir) -> Storage {
    Storage::new(temp.path().join("tasks.json"))
}

#[test]
fn mixed_generation_store_loads_as_one_collection() {
    let temp = TempDir::new().unwrap();
    let storage = storage(&temp);

    // One record per historical shape: v0 (start/end), v1 (no version),
    // and a current record.
    let payload = serde_json::json!([
        {
            "id": "v0",
            "name": "oldest",
            "start": "2025-06-02T09:00:00+00:00",
            "end": "2025-06-02T10:00:00+00:00"
        },
        {
            "id": "v1",
            "name": "older",
            "startTime": "2025-06-02T11:00:00+00:00",
            "endTime": "2025-06-02T12:00:00+00:00"
        },
        {
            "id": "v2",
            "name": "current",
            "startTime": "2025-06-02T13:00:00+00:00",
            "endTime": "2025-06-02T14:00:00+00:00",
            "version": STORE_VERSION
        }
    ]);
    std::fs::write(storage.path(), serde_json::to_string(&payload).unwrap()).unwrap();

    let loaded = storage.load();
    assert_eq!(loaded.len(), 3);
    for id in ["v0", "v1", "v2"] {
        let task = loaded.find(id).expect("record survives migration");
        assert_eq!(task.duration_minutes(), 60);
        assert_eq!(task.version.as_deref(), Some(STORE_VERSION));
    }
}

#[test]
fn migrated_store_is_rewritten_in_the_current_shape() {
    let temp = TempDir::new().unwrap();
    let storage = storage(&temp);

    let payload = serde_json::json!([
        {
            "id": "legacy",
            "name": "old shape",
            "start": "2025-06-02T09:00:00+00:00",
            "end": "2025-06-02T10:00:00+00:00",
            "notes": "keep me"
        }
    ]);
    std::fs::write(storage.path(), serde_json::to_string(&payload).unwrap()).unwrap();

    let loaded = storage.load();
    storage.try_save(&loaded).unwrap();

    let raw = std::fs::read_to_string(storage.path()).unwrap();
    let records: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let record = &records[0];
    assert!(record.get("start").is_none());
    assert!(record.get("startTime").is_some());
    assert_eq!(record["version"], STORE_VERSION);
    // Fields the current version does not model still round-trip
    assert_eq!(record["notes"], "keep me");
}

#[test]
fn corrupt_store_degrades_to_empty_and_recovers_on_save() {
    let temp = TempDir::new().unwrap();
    let storage = storage(&temp);
    std::fs::write(storage.path(), "{{{ not json").unwrap();

    let loaded = storage.load();
    assert!(loaded.is_empty());
    assert!(!storage.path().exists());

    // The next save starts a fresh, valid store
    let mut tasks = TaskSet::new();
    let start = Local.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
    let end = Local.with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap();
    tasks.insert(Task::new("fresh", start, end)).unwrap();
    storage.try_save(&tasks).unwrap();

    assert_eq!(storage.load().len(), 1);
}

#[test]
fn partially_invalid_store_keeps_the_valid_records() {
    let temp = TempDir::new().unwrap();
    let storage = storage(&temp);

    let payload = serde_json::json!([
        {
            "id": "keep",
            "name": "good",
            "startTime": "2025-06-02T09:00:00+00:00",
            "endTime": "2025-06-02T10:00:00+00:00"
        },
        "not an object",
        {
            "id": "drop",
            "name": "",
            "startTime": "2025-06-02T09:00:00+00:00",
            "endTime": "2025-06-02T10:00:00+00:00"
        }
    ]);
    std::fs::write(storage.path(), serde_json::to_string(&payload).unwrap()).unwrap();

    let loaded = storage.load();
    assert_eq!(loaded.len(), 1);
    assert!(loaded.find("keep").is_some());
}
