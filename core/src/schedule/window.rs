//! Minute-of-day arithmetic and single windows

use bynoral_types::{SessionMode, WindowConfig};
use chrono::{NaiveTime, Timelike};

use super::ScheduleError;

pub const MINUTES_PER_DAY: u16 = 24 * 60;

/// Parse local wall-clock `HH:MM` into minutes since midnight.
///
/// `24:00` is accepted as a synonym for midnight so a window can be written
/// as ending at the end of the day.
pub fn parse_minute_of_day(value: &str) -> Result<u16, ScheduleError> {
    let trimmed = value.trim();
    if trimmed == "24:00" {
        return Ok(0);
    }
    let time = NaiveTime::parse_from_str(trimmed, "%H:%M").map_err(|_| {
        ScheduleError::InvalidTime {
            value: value.to_string(),
        }
    })?;
    Ok((time.hour() * 60 + time.minute()) as u16)
}

/// Format minutes since midnight as `HH:MM`.
pub fn format_minute_of_day(minute: u16) -> String {
    let minute = minute % MINUTES_PER_DAY;
    format!("{:02}:{:02}", minute / 60, minute % 60)
}

/// Wall-clock minute of any timelike value; seconds are dropped.
pub fn minute_of_day<T: Timelike>(time: &T) -> u16 {
    (time.hour() * 60 + time.minute()) as u16
}

/// A validated window `[start, end)` in minutes since midnight.
///
/// `end <= start` means the window runs past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub mode: SessionMode,
    pub start: u16,
    pub end: u16,
}

impl Window {
    pub fn from_config(config: &WindowConfig) -> Result<Self, ScheduleError> {
        Ok(Self {
            mode: config.mode,
            start: parse_minute_of_day(&config.start)?,
            end: parse_minute_of_day(&config.end)?,
        })
    }

    /// Length in minutes. A window whose end equals its start spans the whole day.
    pub fn len_minutes(&self) -> u16 {
        match (self.end + MINUTES_PER_DAY - self.start) % MINUTES_PER_DAY {
            0 => MINUTES_PER_DAY,
            len => len,
        }
    }

    pub fn contains(&self, minute: u16) -> bool {
        let offset = (minute + MINUTES_PER_DAY - self.start) % MINUTES_PER_DAY;
        offset < self.len_minutes()
    }

    pub fn wraps_midnight(&self) -> bool {
        self.end <= self.start
    }
}
