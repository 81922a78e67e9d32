//! Drag controller for the day timeline
//!
//! An explicit state machine over an in-progress pointer drag. The anchor
//! (pointer row plus the task's endpoints at drag start) is captured on
//! pointer-down; every pointer movement recomputes the endpoints from the
//! anchor, so a drag cannot accumulate rounding drift. Resize actions are
//! clamped so the interval can never invert or shrink below one snap
//! interval, and every result stays inside the `[0, 24h]` day bound. Stored
//! tasks need not be snap-aligned, so the clamp bounds themselves saturate
//! at the day edges for tasks shorter than one snap interval.

use crate::geometry::{snap_to_interval, MINUTES_PER_DAY};

/// What part of the task block the drag grabbed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragAction {
    /// The task body: shift the whole interval, preserving duration
    Move,
    /// The top edge handle: shift the start
    ResizeTop,
    /// The bottom edge handle: shift the end
    ResizeBottom,
}

/// Drag controller state.
///
/// `Dragging` carries the full anchor, so a resize without an anchor is
/// unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        task_id: String,
        action: DragAction,
        anchor_row: u16,
        original_start: i64,
        original_end: i64,
    },
}

/// Recomputed endpoints for the dragged task, in minutes past midnight
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragUpdate {
    pub task_id: String,
    pub start_minutes: i64,
    pub end_minutes: i64,
}

impl DragState {
    /// Enter the dragging state, capturing the anchor
    pub fn begin(
        task_id: impl Into<String>,
        action: DragAction,
        anchor_row: u16,
        original_start: i64,
        original_end: i64,
    ) -> Self {
        DragState::Dragging {
            task_id: task_id.into(),
            action,
            anchor_row,
            original_start,
            original_end,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, DragState::Dragging { .. })
    }

    /// Id of the task under drag, if any
    pub fn dragged_task(&self) -> Option<&str> {
        match self {
            DragState::Idle => None,
            DragState::Dragging { task_id, .. } => Some(task_id),
        }
    }

    /// Pointer moved to `row` on a `total_rows`-high column.
    ///
    /// Returns the recomputed endpoints, or `None` when idle. The caller
    /// applies the update immediately (live preview is the live commit).
    pub fn moved(&self, row: u16, total_rows: u16, snap: u32) -> Option<DragUpdate> {
        let DragState::Dragging {
            task_id,
            action,
            anchor_row,
            original_start,
            original_end,
        } = self
        else {
            return None;
        };
        if total_rows == 0 {
            return None;
        }

        let day = MINUTES_PER_DAY as i64;
        let snap_step = snap.max(1) as i64;
        let delta_rows = row as i64 - *anchor_row as i64;
        let delta = snap_to_interval(delta_rows * day / total_rows as i64, snap);

        let (start, end) = match action {
            DragAction::Move => {
                // Clamp the shift, not the endpoints, so duration is preserved
                // even at the day edges.
                let delta = delta.clamp(-original_start, day - original_end);
                (original_start + delta, original_end + delta)
            }
            DragAction::ResizeBottom => {
                // Saturate the lower bound: a task ending within one snap of
                // midnight (or shorter than one snap) must not invert the
                // clamp range.
                let lo = (original_start + snap_step).min(day);
                let end = (original_end + delta).clamp(lo, day);
                (*original_start, end)
            }
            DragAction::ResizeTop => {
                let hi = (original_end - snap_step).max(0);
                let start = (original_start + delta).clamp(0, hi);
                (start, *original_end)
            }
        };

        Some(DragUpdate {
            task_id: task_id.clone(),
            start_minutes: start,
            end_minutes: end,
        })
    }

    /// Pointer released or left the timeline: discard the anchor.
    ///
    /// The last applied position stands; there is no rollback.
    pub fn finish(&mut self) {
        *self = DragState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{DAY_ROWS, SNAP_MINUTES};

    // One row of the default 48-row column is 30 minutes.
    const ROW_MINUTES: i64 = 30;

    fn drag(action: DragAction, start: i64, end: i64) -> DragState {
        DragState::begin("t1", action, 20, start, end)
    }

    #[test]
    fn idle_ignores_movement() {
        let state = DragState::Idle;
        assert_eq!(state.moved(25, DAY_ROWS, SNAP_MINUTES), None);
        assert!(!state.is_dragging());
    }

    #[test]
    fn move_by_one_row_shifts_both_endpoints() {
        let state = drag(DragAction::Move, 540, 600);
        let update = state.moved(21, DAY_ROWS, SNAP_MINUTES).unwrap();
        assert_eq!(update.start_minutes, 540 + ROW_MINUTES);
        assert_eq!(update.end_minutes, 600 + ROW_MINUTES);
        // Duration preserved
        assert_eq!(
            update.end_minutes - update.start_minutes,
            600 - 540
        );
    }

    #[test]
    fn move_clamps_to_the_day_bound_without_squashing() {
        let state = drag(DragAction::Move, 60, 120);
        // Dragging far above the top of the day
        let update = state.moved(0, DAY_ROWS, SNAP_MINUTES).unwrap();
        assert_eq!(update.start_minutes, 0);
        assert_eq!(update.end_minutes, 60);

        let state = drag(DragAction::Move, 1320, 1410);
        let update = state.moved(48, DAY_ROWS, SNAP_MINUTES).unwrap();
        assert_eq!(update.end_minutes, MINUTES_PER_DAY as i64);
        assert_eq!(update.end_minutes - update.start_minutes, 90);
    }

    #[test]
    fn move_by_exactly_one_snap_interval_on_a_minute_column() {
        let state = DragState::begin("t1", DragAction::Move, 600, 540, 600);
        let update = state.moved(615, 1440, SNAP_MINUTES).unwrap();
        assert_eq!(update.start_minutes, 540 + SNAP_MINUTES as i64);
        assert_eq!(update.end_minutes, 600 + SNAP_MINUTES as i64);
        assert_eq!(update.end_minutes - update.start_minutes, 60);
    }

    #[test]
    fn resize_bottom_with_a_coarse_snap_saturates_at_midnight() {
        // 23:15-24:00 with an hourly snap: the usual lower bound
        // (start + snap) would sit past the end of the day.
        let state = DragState::begin("t1", DragAction::ResizeBottom, 47, 1395, 1440);
        let update = state.moved(40, DAY_ROWS, 60).unwrap();
        assert_eq!(update.start_minutes, 1395);
        assert_eq!(update.end_minutes, MINUTES_PER_DAY as i64);
        assert!(update.start_minutes < update.end_minutes);
    }

    #[test]
    fn resize_top_of_a_task_shorter_than_the_snap_keeps_its_start() {
        // 00:00-00:10 is shorter than one snap interval; the upper bound
        // for the start saturates at 0 instead of going negative.
        let state = DragState::begin("t1", DragAction::ResizeTop, 0, 0, 10);
        let update = state.moved(5, DAY_ROWS, SNAP_MINUTES).unwrap();
        assert_eq!(update.start_minutes, 0);
        assert_eq!(update.end_minutes, 10);
    }

    #[test]
    fn resize_bottom_extends_the_end() {
        let state = drag(DragAction::ResizeBottom, 540, 600);
        let update = state.moved(22, DAY_ROWS, SNAP_MINUTES).unwrap();
        assert_eq!(update.start_minutes, 540);
        assert_eq!(update.end_minutes, 660);
    }

    #[test]
    fn resize_bottom_never_precedes_the_start() {
        let state = drag(DragAction::ResizeBottom, 540, 600);
        // Drag the bottom edge far above the start
        let update = state.moved(10, DAY_ROWS, SNAP_MINUTES).unwrap();
        assert_eq!(update.start_minutes, 540);
        assert_eq!(update.end_minutes, 540 + SNAP_MINUTES as i64);
    }

    #[test]
    fn resize_top_clamps_against_the_end() {
        let state = drag(DragAction::ResizeTop, 540, 600);
        let update = state.moved(30, DAY_ROWS, SNAP_MINUTES).unwrap();
        assert_eq!(update.start_minutes, 600 - SNAP_MINUTES as i64);
        assert_eq!(update.end_minutes, 600);
    }

    #[test]
    fn resize_top_stops_at_midnight() {
        let state = drag(DragAction::ResizeTop, 60, 600);
        let update = state.moved(0, DAY_ROWS, SNAP_MINUTES).unwrap();
        assert_eq!(update.start_minutes, 0);
    }

    #[test]
    fn resize_never_inverts_the_interval() {
        for action in [DragAction::ResizeTop, DragAction::ResizeBottom] {
            let state = drag(action, 540, 600);
            for row in 0..=DAY_ROWS {
                let update = state.moved(row, DAY_ROWS, SNAP_MINUTES).unwrap();
                assert!(update.start_minutes < update.end_minutes);
            }
        }
    }

    #[test]
    fn finish_returns_to_idle() {
        let mut state = drag(DragAction::Move, 540, 600);
        assert_eq!(state.dragged_task(), Some("t1"));
        state.finish();
        assert_eq!(state, DragState::Idle);
        assert_eq!(state.dragged_task(), None);
    }
}
