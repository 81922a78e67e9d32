//! Mutating actions behind the day view.
//!
//! Every action edits the in-memory [`TaskSet`], then persists it with a
//! best-effort save; the in-memory collection stays authoritative for the
//! session. Change events are emitted when a sink is configured.

use chrono::NaiveDate;

use crate::drag::{DragAction, DragUpdate};
use crate::error::{Error, Result};
use crate::events::{Event, EventKind, EventSink};
use crate::geometry::at_minutes;
use crate::storage::Storage;
use crate::task::{Task, TaskSet};

use super::editor::EditorSubmit;

#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub message: String,
    pub task_id: Option<String>,
}

pub fn create_task(
    tasks: &mut TaskSet,
    storage: &Storage,
    sink: Option<&mut EventSink>,
    date: NaiveDate,
    submit: &EditorSubmit,
) -> Result<ActionOutcome> {
    let task = Task::new(
        &submit.name,
        at_minutes(date, submit.start_minutes),
        at_minutes(date, submit.end_minutes),
    );
    let task_id = task.id.clone();
    tasks.insert(task.clone())?;
    storage.save(tasks);
    emit(sink, EventKind::TaskCreated, &task)?;

    Ok(ActionOutcome {
        message: format!("created '{}'", task.name),
        task_id: Some(task_id),
    })
}

/// Create a task from a click on an empty timeline slot
pub fn create_at_click(
    tasks: &mut TaskSet,
    storage: &Storage,
    sink: Option<&mut EventSink>,
    date: NaiveDate,
    start_minutes: i64,
    duration_minutes: i64,
) -> Result<ActionOutcome> {
    let end_minutes = (start_minutes + duration_minutes).min(24 * 60);
    let submit = EditorSubmit {
        name: "New task".to_string(),
        start_minutes,
        end_minutes,
    };
    create_task(tasks, storage, sink, date, &submit)
}

pub fn update_task(
    tasks: &mut TaskSet,
    storage: &Storage,
    sink: Option<&mut EventSink>,
    date: NaiveDate,
    task_id: &str,
    submit: &EditorSubmit,
) -> Result<ActionOutcome> {
    let mut task = tasks
        .find(task_id)
        .cloned()
        .ok_or_else(|| Error::TaskNotFound(task_id.to_string()))?;
    task.name = submit.name.clone();
    task.start_time = at_minutes(date, submit.start_minutes);
    task.end_time = at_minutes(date, submit.end_minutes);

    tasks.replace(task.clone())?;
    storage.save(tasks);
    emit(sink, EventKind::TaskEdited, &task)?;

    Ok(ActionOutcome {
        message: format!("updated '{}'", task.name),
        task_id: Some(task.id),
    })
}

/// Apply a drag update to the dragged task.
///
/// Called for every pointer movement during a drag, so the on-screen
/// position is always the committed position.
pub fn apply_drag(
    tasks: &mut TaskSet,
    storage: &Storage,
    sink: Option<&mut EventSink>,
    date: NaiveDate,
    action: DragAction,
    update: &DragUpdate,
) -> Result<ActionOutcome> {
    let mut task = tasks
        .find(&update.task_id)
        .cloned()
        .ok_or_else(|| Error::TaskNotFound(update.task_id.clone()))?;
    let before = (task.start_time, task.end_time);
    task.start_time = at_minutes(date, update.start_minutes);
    task.end_time = at_minutes(date, update.end_minutes);
    if (task.start_time, task.end_time) == before {
        return Ok(ActionOutcome {
            message: String::new(),
            task_id: Some(task.id),
        });
    }

    tasks.replace(task.clone())?;
    storage.save(tasks);
    let kind = match action {
        DragAction::Move => EventKind::TaskMoved,
        DragAction::ResizeTop | DragAction::ResizeBottom => EventKind::TaskResized,
    };
    emit(sink, kind, &task)?;

    Ok(ActionOutcome {
        message: format!("moved '{}'", task.name),
        task_id: Some(task.id),
    })
}

pub fn delete_task(
    tasks: &mut TaskSet,
    storage: &Storage,
    sink: Option<&mut EventSink>,
    task_id: &str,
) -> Result<ActionOutcome> {
    let removed = tasks
        .remove(task_id)
        .ok_or_else(|| Error::TaskNotFound(task_id.to_string()))?;
    storage.save(tasks);
    emit(sink, EventKind::TaskDeleted, &removed)?;

    Ok(ActionOutcome {
        message: format!("deleted '{}'", removed.name),
        task_id: None,
    })
}

fn emit(sink: Option<&mut EventSink>, kind: EventKind, task: &Task) -> Result<()> {
    let Some(sink) = sink else {
        return Ok(());
    };
    let payload = serde_json::json!({
        "id": task.id,
        "name": task.name,
        "start_time": task.start_time.to_rfc3339(),
        "end_time": task.end_time.to_rfc3339(),
    });
    sink.emit(&Event::new(kind).with_data(payload)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, Storage, TaskSet, NaiveDate) {
        let temp = TempDir::new().unwrap();
        let storage = Storage::new(temp.path().join("tasks.json"));
        let tasks = TaskSet::new();
        let date = NaiveDate::from_ymd_opt(2025, 6, 2).unwrap();
        (temp, storage, tasks, date)
    }

    #[test]
    fn create_and_delete_round_trip_through_storage() {
        let (_temp, storage, mut tasks, date) = fixture();
        let submit = EditorSubmit {
            name: "standup".to_string(),
            start_minutes: 540,
            end_minutes: 600,
        };
        let outcome = create_task(&mut tasks, &storage, None, date, &submit).unwrap();
        let id = outcome.task_id.unwrap();
        assert_eq!(storage.load().len(), 1);

        delete_task(&mut tasks, &storage, None, &id).unwrap();
        assert!(tasks.is_empty());
        assert!(storage.load().is_empty());
    }

    #[test]
    fn click_creation_defaults_to_one_hour() {
        let (_temp, storage, mut tasks, date) = fixture();
        let outcome = create_at_click(&mut tasks, &storage, None, date, 540, 60).unwrap();
        let task = tasks.find(outcome.task_id.as_deref().unwrap()).unwrap();
        assert_eq!(task.duration_minutes(), 60);

        // A click near the end of the day still produces a valid interval
        let outcome = create_at_click(&mut tasks, &storage, None, date, 1410, 60).unwrap();
        let task = tasks.find(outcome.task_id.as_deref().unwrap()).unwrap();
        assert_eq!(task.duration_minutes(), 30);
    }

    #[test]
    fn drag_update_moves_the_stored_task() {
        let (_temp, storage, mut tasks, date) = fixture();
        let submit = EditorSubmit {
            name: "standup".to_string(),
            start_minutes: 540,
            end_minutes: 600,
        };
        let id = create_task(&mut tasks, &storage, None, date, &submit)
            .unwrap()
            .task_id
            .unwrap();

        let update = DragUpdate {
            task_id: id.clone(),
            start_minutes: 570,
            end_minutes: 630,
        };
        apply_drag(&mut tasks, &storage, None, date, DragAction::Move, &update).unwrap();

        let task = tasks.find(&id).unwrap();
        assert_eq!(task.start_time, at_minutes(date, 570));
        assert_eq!(task.end_time, at_minutes(date, 630));
    }

    #[test]
    fn update_rejects_an_unknown_id() {
        let (_temp, storage, mut tasks, date) = fixture();
        let submit = EditorSubmit {
            name: "ghost".to_string(),
            start_minutes: 540,
            end_minutes: 600,
        };
        let err = update_task(&mut tasks, &storage, None, date, "missing", &submit).unwrap_err();
        assert!(matches!(err, Error::TaskNotFound(_)));
    }
}
