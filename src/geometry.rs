//! Timeline geometry
//!
//! Pure conversions between clock time and vertical cell offsets on a
//! fixed-height column representing 24 hours, plus day-bound clipping for
//! rendering. The functions are parameterized over the total column height
//! so the TUI (48 rows, 30 minutes per row) and finer-grained callers share
//! the same math.

use chrono::{DateTime, Duration, Local, LocalResult, NaiveDate, NaiveTime, TimeZone};

use crate::task::Task;

/// Snap granularity for dragged and clicked timestamps, in minutes
pub const SNAP_MINUTES: u32 = 15;

/// Minutes in a day
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Height of the rendered 24-hour column, in terminal rows (30 min per row)
pub const DAY_ROWS: u16 = 48;

/// Round minutes to the nearest snap interval (halves round up)
pub fn snap_to_interval(minutes: i64, snap: u32) -> i64 {
    let snap = snap as i64;
    if snap <= 1 {
        return minutes;
    }
    (minutes * 2 + snap).div_euclid(snap * 2) * snap
}

/// Linear time-of-day to cell offset over a `total_rows`-high column
pub fn minutes_to_offset(minutes: u32, total_rows: u16) -> u16 {
    let minutes = minutes.min(MINUTES_PER_DAY) as u64;
    (minutes * total_rows as u64 / MINUTES_PER_DAY as u64) as u16
}

/// Inverse of [`minutes_to_offset`], snapped to the nearest interval
pub fn offset_to_minutes(offset: u16, total_rows: u16, snap: u32) -> u32 {
    if total_rows == 0 {
        return 0;
    }
    let raw = offset.min(total_rows) as u64 * MINUTES_PER_DAY as u64 / total_rows as u64;
    let snapped = snap_to_interval(raw as i64, snap);
    snapped.clamp(0, MINUTES_PER_DAY as i64) as u32
}

/// Midnight at the start of the given date, in local time.
///
/// On DST transition days where local midnight is ambiguous or absent the
/// earlier interpretation (or the raw wall-clock time) is used.
pub fn day_start(date: NaiveDate) -> DateTime<Local> {
    let midnight = date.and_time(NaiveTime::MIN);
    match Local.from_local_datetime(&midnight) {
        LocalResult::Single(start) | LocalResult::Ambiguous(start, _) => start,
        LocalResult::None => Local.from_utc_datetime(&midnight),
    }
}

/// Exclusive end of the given date's day bound
pub fn day_end(date: NaiveDate) -> DateTime<Local> {
    day_start(date) + Duration::days(1)
}

/// The timestamp `minutes` past midnight on the given date
pub fn at_minutes(date: NaiveDate, minutes: i64) -> DateTime<Local> {
    day_start(date) + Duration::minutes(minutes)
}

/// Minutes past midnight of the given date (may be negative or beyond 24h)
pub fn minute_of_day(time: DateTime<Local>, date: NaiveDate) -> i64 {
    (time - day_start(date)).num_minutes()
}

/// Whether the task's interval intersects the `[dayStart, dayEnd)` window
pub fn intersects_day(task: &Task, date: NaiveDate) -> bool {
    task.start_time < day_end(date) && task.end_time > day_start(date)
}

/// Clip a task to the day bound, as `(start, end)` minutes past midnight.
///
/// Returns `None` when the task does not intersect the day at all.
pub fn clip_to_day(task: &Task, date: NaiveDate) -> Option<(u32, u32)> {
    if !intersects_day(task, date) {
        return None;
    }
    let day = MINUTES_PER_DAY as i64;
    let start = minute_of_day(task.start_time, date).clamp(0, day);
    let end = minute_of_day(task.end_time, date).clamp(0, day);
    if end <= start {
        return None;
    }
    Some((start as u32, end as u32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    fn at(day: u32, hour: u32, minute: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 6, day, hour, minute, 0).unwrap()
    }

    #[test]
    fn snap_rounds_to_nearest_interval() {
        assert_eq!(snap_to_interval(0, 15), 0);
        assert_eq!(snap_to_interval(7, 15), 15);
        assert_eq!(snap_to_interval(547, 15), 540); // 09:07 -> 09:00
        assert_eq!(snap_to_interval(8, 15), 15);
        assert_eq!(snap_to_interval(22, 15), 15);
        assert_eq!(snap_to_interval(23, 15), 30);
        assert_eq!(snap_to_interval(-7, 15), 0);
        assert_eq!(snap_to_interval(-8, 15), -15);
    }

    #[test]
    fn offset_mapping_is_linear() {
        assert_eq!(minutes_to_offset(0, DAY_ROWS), 0);
        assert_eq!(minutes_to_offset(720, DAY_ROWS), 24);
        assert_eq!(minutes_to_offset(MINUTES_PER_DAY, DAY_ROWS), DAY_ROWS);
        // 30 minutes per row at the default height
        assert_eq!(minutes_to_offset(90, DAY_ROWS), 3);
    }

    #[test]
    fn offset_to_minutes_snaps_to_the_interval() {
        // A minute-granular column: offset 547 is 09:07, which snaps to 09:00
        assert_eq!(offset_to_minutes(547, 1440, 15), 540);
        // Row 19 of 48 is 09:30
        assert_eq!(offset_to_minutes(19, DAY_ROWS, 15), 570);
        assert_eq!(offset_to_minutes(0, DAY_ROWS, 15), 0);
        assert_eq!(offset_to_minutes(DAY_ROWS, DAY_ROWS, 15), MINUTES_PER_DAY);
    }

    #[test]
    fn tasks_outside_the_day_are_excluded() {
        let yesterday = Task::new("before", at(1, 9, 0), at(1, 10, 0));
        assert!(!intersects_day(&yesterday, date()));
        assert_eq!(clip_to_day(&yesterday, date()), None);

        let today = Task::new("inside", at(2, 9, 0), at(2, 10, 0));
        assert_eq!(clip_to_day(&today, date()), Some((540, 600)));
    }

    #[test]
    fn straddling_tasks_are_clipped_to_the_day_bound() {
        let late = Task::new("overnight", at(2, 23, 0), at(3, 1, 0));
        assert_eq!(clip_to_day(&late, date()), Some((23 * 60, MINUTES_PER_DAY)));

        let early = Task::new("from yesterday", at(1, 23, 0), at(2, 1, 0));
        assert_eq!(clip_to_day(&early, date()), Some((0, 60)));
    }

    #[test]
    fn task_ending_at_midnight_is_not_visible_the_next_day() {
        let task = Task::new("until midnight", at(2, 23, 0), at(3, 0, 0));
        assert_eq!(
            clip_to_day(&task, NaiveDate::from_ymd_opt(2025, 6, 3).unwrap()),
            None
        );
    }

    #[test]
    fn at_minutes_round_trips_through_minute_of_day() {
        let time = at_minutes(date(), 540);
        assert_eq!(minute_of_day(time, date()), 540);
        assert_eq!(time, at(2, 9, 0));
    }
}
