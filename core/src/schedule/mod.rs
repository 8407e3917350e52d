//! Day-part schedule
//!
//! A `DaySchedule` partitions the 24-hour day into contiguous windows, each
//! bound to a `SessionMode`. Lookup is by local wall-clock minute; seconds
//! never change the answer.
//!
//! ```text
//!  00:00        07:00          11:30             17:00          24:00
//!    |  After    |   Morning    |     Midday      |    After      |
//!    |  Hours    |              |                 |    Hours      |
//! ```
//!
//! Boundaries come from configuration, so nothing here assumes particular
//! times or a particular number of windows.

mod error;
mod window;


pub use error::ScheduleError;
pub use window::{
    MINUTES_PER_DAY, Window, format_minute_of_day, minute_of_day, parse_minute_of_day,
};

use bynoral_types::{SessionMode, WindowConfig, default_windows};
use chrono::{DateTime, Days, LocalResult, NaiveDateTime, Offset, TimeDelta, TimeZone};

/// A total, non-overlapping partition of the day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaySchedule {
    /// Sorted by start minute
    windows: Vec<Window>,
}

impl Default for DaySchedule {
    fn default() -> Self {
        Self::from_config(&default_windows()).expect("built-in schedule is a valid partition")
    }
}

impl DaySchedule {
    /// Validate configured windows into a schedule.
    ///
    /// Windows may be listed in any order. Every minute of the day must be
    /// covered by exactly one window.
    pub fn from_config(configs: &[WindowConfig]) -> Result<Self, ScheduleError> {
        let windows = configs
            .iter()
            .map(Window::from_config)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(windows)
    }

    pub fn new(mut windows: Vec<Window>) -> Result<Self, ScheduleError> {
        if windows.is_empty() {
            return Err(ScheduleError::Empty);
        }
        windows.sort_by_key(|w| w.start);

        for (idx, window) in windows.iter().enumerate() {
            let next = &windows[(idx + 1) % windows.len()];
            let room = match (next.start + MINUTES_PER_DAY - window.start) % MINUTES_PER_DAY {
                // Same start as the next window, or a single window
                0 if windows.len() > 1 => {
                    return Err(ScheduleError::Overlap {
                        first: window.mode,
                        second: next.mode,
                        at: format_minute_of_day(window.start),
                    });
                }
                0 => MINUTES_PER_DAY,
                room => room,
            };

            let len = window.len_minutes();
            if len < room {
                return Err(ScheduleError::Gap {
                    from: format_minute_of_day(window.end),
                    until: format_minute_of_day(next.start),
                });
            }
            if len > room {
                return Err(ScheduleError::Overlap {
                    first: window.mode,
                    second: next.mode,
                    at: format_minute_of_day(next.start),
                });
            }
        }

        Ok(Self { windows })
    }

    pub fn windows(&self) -> &[Window] {
        &self.windows
    }

    /// The window containing a wall-clock minute.
    pub fn window_at(&self, minute: u16) -> &Window {
        let minute = minute % MINUTES_PER_DAY;
        let idx = self.windows.partition_point(|w| w.start <= minute);
        // Before the first start we are still inside the last window, which wraps
        match idx {
            0 => &self.windows[self.windows.len() - 1],
            idx => &self.windows[idx - 1],
        }
    }

    pub fn mode_at(&self, minute: u16) -> SessionMode {
        self.window_at(minute).mode
    }

    /// The mode the clock alone selects at `now`.
    pub fn resolve_automatic_mode<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> SessionMode {
        self.mode_at(minute_of_day(now))
    }

    /// The next instant after `now` where the schedule moves on, in `now`'s
    /// time zone.
    ///
    /// That is the earliest window start strictly after `now`. A start that
    /// falls into a daylight-saving gap moves to the first representable
    /// minute after it. A start inside a repeated hour counts at both of its
    /// occurrences. When clocks go back into a different window, the
    /// transition itself is a boundary too.
    pub fn next_boundary<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        let tz = now.timezone();
        let today = now.naive_local().date();

        let mut next: Option<DateTime<Tz>> = None;
        for day_offset in 0..=2u64 {
            let Some(date) = today.checked_add_days(Days::new(day_offset)) else {
                break;
            };
            for window in &self.windows {
                let Some(naive) = date.and_hms_opt(
                    u32::from(window.start / 60),
                    u32::from(window.start % 60),
                    0,
                ) else {
                    continue;
                };
                for at in local_instants(&tz, naive) {
                    if at > *now && next.as_ref().is_none_or(|n| at < *n) {
                        next = Some(at);
                    }
                }
            }
        }

        // Only reached in a zone with no valid local time for days
        let next = next.unwrap_or_else(|| now.clone() + TimeDelta::days(1));
        self.mode_shift_before(now, &next).unwrap_or(next)
    }

    /// First UTC offset change in `(now, until]` that lands in another window.
    fn mode_shift_before<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
        until: &DateTime<Tz>,
    ) -> Option<DateTime<Tz>> {
        let tz = now.timezone();
        let at = |secs: i64| tz.timestamp_opt(secs, 0).single();
        let end = until.timestamp();

        let mut from = now.timestamp();
        while from < end {
            let to = (from + OFFSET_SCAN_STEP_SECS).min(end);
            if at(from)?.offset().fix() != at(to)?.offset().fix() {
                let shift = first_offset_change(&tz, from, to)?;
                let before = at(shift.timestamp() - 1)?;
                if self.resolve_automatic_mode(&before) != self.resolve_automatic_mode(&shift) {
                    return Some(shift);
                }
            }
            from = to;
        }
        None
    }
}

/// Offsets are scanned hourly; real zones never change twice within an hour.
const OFFSET_SCAN_STEP_SECS: i64 = 3600;

/// Every instant a naive local time maps to in `tz`.
///
/// A time inside a gap walks forward to the first valid minute, at most a day.
fn local_instants<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Vec<DateTime<Tz>> {
    let mut candidate = naive;
    for _ in 0..MINUTES_PER_DAY {
        match tz.from_local_datetime(&candidate) {
            LocalResult::Single(at) => return vec![at],
            LocalResult::Ambiguous(first, second) => return vec![first, second],
            LocalResult::None => candidate += TimeDelta::minutes(1),
        }
    }
    Vec::new()
}

/// The first second in `(lo, hi]` whose offset differs from the one at `lo`.
///
/// The offset at `hi` must already differ.
fn first_offset_change<Tz: TimeZone>(tz: &Tz, mut lo: i64, mut hi: i64) -> Option<DateTime<Tz>> {
    let at = |secs: i64| tz.timestamp_opt(secs, 0).single();
    let base = at(lo)?.offset().fix();
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if at(mid)?.offset().fix() == base {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    at(hi)
}
