//! Task subcommand implementations
//!
//! One-shot commands over the task store: add, list, edit, rm. Each command
//! loads the store, mutates the in-memory collection, and writes it back
//! with an atomic save.

use chrono::{DateTime, Local, NaiveDate, NaiveTime};
use serde::Serialize;

use crate::error::{Error, Result};
use crate::events::{Event, EventDestination, EventKind};
use crate::geometry::at_minutes;
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::storage::Storage;
use crate::task::{Task, TaskSet};

/// Options for the add command
pub struct AddOptions {
    pub name: String,
    pub start: String,
    pub end: Option<String>,
    pub date: Option<String>,
    pub storage: Storage,
    pub output: OutputOptions,
    pub events: Option<EventDestination>,
}

/// Options for the list command
pub struct ListOptions {
    pub date: Option<String>,
    pub storage: Storage,
    pub output: OutputOptions,
}

/// Options for the edit command
pub struct EditOptions {
    pub id: String,
    pub name: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub date: Option<String>,
    pub storage: Storage,
    pub output: OutputOptions,
    pub events: Option<EventDestination>,
}

/// Options for the rm command
pub struct RmOptions {
    pub id: String,
    pub storage: Storage,
    pub output: OutputOptions,
    pub events: Option<EventDestination>,
}

/// Task shape used in JSON output and event payloads
#[derive(Debug, Clone, Serialize)]
pub struct TaskView {
    pub id: String,
    pub name: String,
    pub start_time: String,
    pub end_time: String,
    pub duration_minutes: i64,
}

impl TaskView {
    fn from_task(task: &Task) -> Self {
        Self {
            id: task.id.clone(),
            name: task.name.clone(),
            start_time: task.start_time.to_rfc3339(),
            end_time: task.end_time.to_rfc3339(),
            duration_minutes: task.duration_minutes(),
        }
    }
}

pub fn run_add(options: AddOptions) -> Result<()> {
    let date = resolve_date(options.date.as_deref())?;
    let start = parse_time(&options.start, date)?;
    let task = match &options.end {
        Some(end) => Task::new(&options.name, start, parse_time(end, date)?),
        None => Task::one_hour(&options.name, start),
    };

    let mut tasks = options.storage.load();
    tasks.insert(task.clone())?;
    options.storage.try_save(&tasks)?;

    let view = TaskView::from_task(&task);
    emit_event(&options.events, EventKind::TaskCreated, &view)?;

    let mut human = HumanOutput::new(format!("Created task '{}'", task.name));
    human.push_summary("id", short_id(&task.id));
    human.push_summary("when", format_interval(&task));
    emit_success(options.output, "add", &view, Some(&human))
}

pub fn run_list(options: ListOptions) -> Result<()> {
    let date = options.date.as_deref().map(parse_date).transpose()?;

    let tasks = options.storage.load();
    let mut listed: Vec<&Task> = match date {
        Some(date) => tasks
            .iter()
            .filter(|task| crate::geometry::intersects_day(task, date))
            .collect(),
        None => tasks.iter().collect(),
    };
    listed.sort_by_key(|task| task.start_time);

    let views: Vec<TaskView> = listed.iter().map(|task| TaskView::from_task(task)).collect();

    let header = match date {
        Some(date) => format!("{} task(s) on {}", listed.len(), date),
        None => format!("{} task(s)", listed.len()),
    };
    let mut human = HumanOutput::new(header);
    for task in &listed {
        human.push_detail(format!(
            "{}  {}  {}",
            short_id(&task.id),
            format_interval(task),
            task.name
        ));
    }
    emit_success(options.output, "list", &views, Some(&human))
}

pub fn run_edit(options: EditOptions) -> Result<()> {
    let mut tasks = options.storage.load();
    let id = resolve_task_id(&tasks, &options.id)?;

    let mut task = tasks.find(&id).cloned().ok_or_else(|| Error::TaskNotFound(id.clone()))?;
    let date = match options.date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => task.start_time.date_naive(),
    };

    if let Some(name) = options.name {
        task.name = name;
    }
    if let Some(start) = &options.start {
        task.start_time = parse_time(start, date)?;
    }
    if let Some(end) = &options.end {
        task.end_time = parse_time(end, date)?;
    }

    tasks.replace(task.clone())?;
    options.storage.try_save(&tasks)?;

    let view = TaskView::from_task(&task);
    emit_event(&options.events, EventKind::TaskEdited, &view)?;

    let mut human = HumanOutput::new(format!("Updated task '{}'", task.name));
    human.push_summary("id", short_id(&task.id));
    human.push_summary("when", format_interval(&task));
    emit_success(options.output, "edit", &view, Some(&human))
}

pub fn run_rm(options: RmOptions) -> Result<()> {
    let mut tasks = options.storage.load();
    let id = resolve_task_id(&tasks, &options.id)?;
    let removed = tasks
        .remove(&id)
        .ok_or_else(|| Error::TaskNotFound(id.clone()))?;
    options.storage.try_save(&tasks)?;

    let view = TaskView::from_task(&removed);
    emit_event(&options.events, EventKind::TaskDeleted, &view)?;

    let mut human = HumanOutput::new(format!("Removed task '{}'", removed.name));
    human.push_summary("id", short_id(&removed.id));
    emit_success(options.output, "rm", &view, Some(&human))
}

/// Parse a `YYYY-MM-DD` date, or the literal `today`
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("today") {
        return Ok(Local::now().date_naive());
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| {
        Error::InvalidTime(format!("invalid date '{trimmed}': expected YYYY-MM-DD"))
    })
}

fn resolve_date(raw: Option<&str>) -> Result<NaiveDate> {
    match raw {
        Some(raw) => parse_date(raw),
        None => Ok(Local::now().date_naive()),
    }
}

/// Parse `HH:MM` anchored on `date`, or a full RFC 3339 timestamp
fn parse_time(raw: &str, date: NaiveDate) -> Result<DateTime<Local>> {
    let trimmed = raw.trim();
    if let Ok(time) = NaiveTime::parse_from_str(trimmed, "%H:%M") {
        let minutes =
            time.signed_duration_since(NaiveTime::MIN).num_minutes();
        return Ok(at_minutes(date, minutes));
    }
    if let Ok(time) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(time.with_timezone(&Local));
    }
    Err(Error::InvalidTime(format!(
        "invalid time '{trimmed}': expected HH:MM or an RFC 3339 timestamp"
    )))
}

/// Resolve a full id or a unique id prefix against the collection
fn resolve_task_id(tasks: &TaskSet, query: &str) -> Result<String> {
    if tasks.find(query).is_some() {
        return Ok(query.to_string());
    }

    let matches: Vec<&Task> = tasks
        .iter()
        .filter(|task| task.id.starts_with(query))
        .collect();
    match matches.as_slice() {
        [] => Err(Error::TaskNotFound(query.to_string())),
        [task] => Ok(task.id.clone()),
        _ => Err(Error::InvalidArgument(format!(
            "id prefix '{query}' is ambiguous ({} matches)",
            matches.len()
        ))),
    }
}

fn emit_event<T: Serialize>(
    events: &Option<EventDestination>,
    kind: EventKind,
    data: &T,
) -> Result<()> {
    let Some(destination) = events else {
        return Ok(());
    };
    let mut sink = destination.open()?;
    sink.emit(&Event::new(kind).with_data(data)?)
}

fn short_id(id: &str) -> String {
    id.split('-').next().unwrap_or(id).to_string()
}

fn format_interval(task: &Task) -> String {
    format!(
        "{} - {}",
        task.start_time.format("%Y-%m-%d %H:%M"),
        task.end_time.format("%H:%M")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    #[test]
    fn parse_date_accepts_iso_and_today() {
        assert_eq!(parse_date("2025-06-02").unwrap(), date());
        assert_eq!(parse_date("today").unwrap(), Local::now().date_naive());
        assert!(parse_date("06/02/2025").is_err());
    }

    #[test]
    fn parse_time_accepts_wall_clock_and_rfc3339() {
        let nine = parse_time("09:00", date()).unwrap();
        assert_eq!(nine.hour(), 9);
        assert_eq!(nine.date_naive(), date());

        let explicit = parse_time("2025-06-02T09:00:00+00:00", date()).unwrap();
        assert_eq!(
            explicit,
            chrono::Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap()
        );

        assert!(matches!(
            parse_time("nine ish", date()),
            Err(Error::InvalidTime(_))
        ));
    }

    #[test]
    fn id_prefix_resolution() {
        let mut tasks = TaskSet::new();
        let start = Local.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap();
        let mut a = Task::one_hour("a", start);
        a.id = "aaaa-1111".to_string();
        let mut b = Task::one_hour("b", start);
        b.id = "aabb-2222".to_string();
        tasks.insert(a).unwrap();
        tasks.insert(b).unwrap();

        assert_eq!(resolve_task_id(&tasks, "aaaa-1111").unwrap(), "aaaa-1111");
        assert_eq!(resolve_task_id(&tasks, "aab").unwrap(), "aabb-2222");
        assert!(matches!(
            resolve_task_id(&tasks, "aa"),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            resolve_task_id(&tasks, "zz"),
            Err(Error::TaskNotFound(_))
        ));
    }
}
