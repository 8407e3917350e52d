//! Error types for schedule construction

use bynoral_types::SessionMode;
use thiserror::Error;

/// Errors while turning configured windows into a `DaySchedule`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("invalid time '{value}' (expected HH:MM)")]
    InvalidTime { value: String },

    #[error("schedule has no windows")]
    Empty,

    #[error("schedule leaves {from}-{until} uncovered")]
    Gap { from: String, until: String },

    #[error("{first} and {second} windows overlap at {at}")]
    Overlap {
        first: SessionMode,
        second: SessionMode,
        at: String,
    },
}
