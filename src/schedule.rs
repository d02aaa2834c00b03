//! Evenly spaced publishing slots within a daily window.

use chrono::{DateTime, LocalResult, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use thiserror::Error;

/// Errors from schedule construction.
#[derive(Debug, Error, PartialEq)]
pub enum ScheduleError {
    /// The window has zero or negative duration
    #[error("Scheduling window must end after it starts")]
    EmptyWindow,
    /// The local wall-clock time is skipped by a DST transition
    #[error("Local time {time} on {date} does not exist in {tz}")]
    NonexistentLocalTime {
        time: NaiveTime,
        date: NaiveDate,
        tz: Tz,
    },
}

/// One computed instant within the publishing window, assigned to exactly
/// one item by position.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleSlot {
    pub scheduled_at: DateTime<Tz>,
    pub item_index: usize,
}

/// Distributes `count` slots evenly across `[start_time, end_time)` on
/// `run_date` in the given timezone.
///
/// `end_time` defaults to 23:59 local. The first slot lands exactly on the
/// window start; the interval is `window / count`, so no slot ever reaches
/// the window end and slots are strictly increasing for `count > 1`.
///
/// `count == 0` yields an empty schedule, not an error. A window that does
/// not end after it starts is a [`ScheduleError::EmptyWindow`].
pub fn build_schedule(
    count: usize,
    run_date: NaiveDate,
    tz: Tz,
    start_time: NaiveTime,
    end_time: Option<NaiveTime>,
) -> Result<Vec<ScheduleSlot>, ScheduleError> {
    if count == 0 {
        return Ok(Vec::new());
    }

    let end_time = end_time.unwrap_or_else(default_end_time);
    let run_start = resolve_local(run_date, start_time, tz)?;
    let run_end = resolve_local(run_date, end_time, tz)?;

    if run_end <= run_start {
        return Err(ScheduleError::EmptyWindow);
    }

    let interval = (run_end - run_start) / count as i32;
    let slots = (0..count)
        .map(|i| ScheduleSlot {
            scheduled_at: run_start + interval * i as i32,
            item_index: i,
        })
        .collect();

    Ok(slots)
}

fn default_end_time() -> NaiveTime {
    // Literal is always valid.
    NaiveTime::from_hms_opt(23, 59, 0).unwrap()
}

/// Resolves a local wall-clock time to an instant. Times repeated by a DST
/// fold take the earlier instant; times skipped by a DST gap are an error.
fn resolve_local(date: NaiveDate, time: NaiveTime, tz: Tz) -> Result<DateTime<Tz>, ScheduleError> {
    match tz.from_local_datetime(&date.and_time(time)) {
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(earlier, _) => Ok(earlier),
        LocalResult::None => Err(ScheduleError::NonexistentLocalTime { time, date, tz }),
    }
}
