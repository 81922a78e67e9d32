//! Pure view-model logic for the day view.
//!
//! Everything here is plain data math over the task collection and the
//! timeline column, kept free of terminal state so it can be tested
//! directly.

use chrono::{Local, NaiveDate};

use crate::geometry::{clip_to_day, intersects_day, minute_of_day, minutes_to_offset};
use crate::task::{Task, TaskSet};

/// Ids of the tasks intersecting `date`, ordered by start time.
///
/// The id list (rather than indices) keeps the selection stable while the
/// collection is mutated underneath it.
pub fn day_task_ids(tasks: &TaskSet, date: NaiveDate) -> Vec<String> {
    let mut visible: Vec<&Task> = tasks
        .iter()
        .filter(|task| intersects_day(task, date))
        .collect();
    visible.sort_by(|a, b| a.start_time.cmp(&b.start_time).then(a.id.cmp(&b.id)));
    visible.into_iter().map(|task| task.id.clone()).collect()
}

/// A task block laid out on the timeline column, rows relative to its top
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskBlock {
    pub task_id: String,
    pub top: u16,
    pub height: u16,
}

/// Lay out the day's tasks as row spans on a `total_rows`-high column.
///
/// Blocks keep the [`day_task_ids`] order, so later (overlapping) blocks
/// paint over earlier ones and win hit testing.
pub fn layout_blocks(tasks: &TaskSet, date: NaiveDate, total_rows: u16) -> Vec<TaskBlock> {
    day_task_ids(tasks, date)
        .into_iter()
        .filter_map(|id| {
            let task = tasks.find(&id)?;
            let (start, end) = clip_to_day(task, date)?;
            let top = minutes_to_offset(start, total_rows);
            let bottom = minutes_to_offset(end, total_rows).max(top + 1);
            Some(TaskBlock {
                task_id: id,
                top,
                height: bottom - top,
            })
        })
        .collect()
}

/// What part of the timeline a pointer position landed on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineHit {
    Empty { row: u16 },
    TaskBody { task_id: String },
    TaskTopEdge { task_id: String },
    TaskBottomEdge { task_id: String },
}

/// Hit-test a row of the timeline column against the laid-out blocks.
///
/// The topmost (latest-starting) block wins. Single-row blocks are all
/// body; the bottom row becomes a resize handle from two rows up, the top
/// row from three.
pub fn hit_test(blocks: &[TaskBlock], row: u16) -> TimelineHit {
    for block in blocks.iter().rev() {
        let bottom = block.top + block.height;
        if row < block.top || row >= bottom {
            continue;
        }
        if block.height >= 2 && row == bottom - 1 {
            return TimelineHit::TaskBottomEdge {
                task_id: block.task_id.clone(),
            };
        }
        if block.height >= 3 && row == block.top {
            return TimelineHit::TaskTopEdge {
                task_id: block.task_id.clone(),
            };
        }
        return TimelineHit::TaskBody {
            task_id: block.task_id.clone(),
        };
    }
    TimelineHit::Empty { row }
}

/// Row of the current-time indicator, when `date` is today
pub fn now_row(date: NaiveDate, total_rows: u16) -> Option<u16> {
    let now = Local::now();
    if now.date_naive() != date {
        return None;
    }
    let minutes = minute_of_day(now, date).clamp(0, 24 * 60) as u32;
    Some(minutes_to_offset(minutes, total_rows).min(total_rows.saturating_sub(1)))
}

/// Move a selection within the visible id list
pub fn step_selection(ids: &[String], selected: Option<&str>, delta: isize) -> Option<String> {
    if ids.is_empty() {
        return None;
    }
    let current = selected.and_then(|id| ids.iter().position(|candidate| candidate == id));
    let next = match current {
        Some(idx) => (idx as isize + delta).rem_euclid(ids.len() as isize) as usize,
        None => {
            if delta < 0 {
                ids.len() - 1
            } else {
                0
            }
        }
    };
    ids.get(next).cloned()
}
