//! Shared session mode and configuration types for Bynoral
//!
//! This crate only holds serializable data. Validation, persistence and the
//! time arithmetic live in bynoral-core.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// ─────────────────────────────────────────────────────────────────────────────
// Session Mode
// ─────────────────────────────────────────────────────────────────────────────

/// The day-part playback profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    /// Opening through the morning rush
    Morning,
    /// Lunch and the afternoon
    Midday,
    /// Evening service and close
    AfterHours,
}

impl SessionMode {
    /// Every mode, in day order.
    pub const ALL: [SessionMode; 3] = [
        SessionMode::Morning,
        SessionMode::Midday,
        SessionMode::AfterHours,
    ];

    /// Stable key used in config files and the override slot.
    pub fn key(self) -> &'static str {
        match self {
            SessionMode::Morning => "morning",
            SessionMode::Midday => "midday",
            SessionMode::AfterHours => "after_hours",
        }
    }

    /// Human-facing label.
    pub fn label(self) -> &'static str {
        match self {
            SessionMode::Morning => "Morning Service",
            SessionMode::Midday => "Midday Flow",
            SessionMode::AfterHours => "After Hours",
        }
    }
}

impl fmt::Display for SessionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Returned when text does not name a session mode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown session mode '{0}' (expected morning, midday or after_hours)")]
pub struct UnknownMode(pub String);

impl FromStr for SessionMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();

        match normalized.as_str() {
            "morning" | "morningservice" => Ok(SessionMode::Morning),
            "midday" | "middayflow" => Ok(SessionMode::Midday),
            "afterhours" | "evening" => Ok(SessionMode::AfterHours),
            _ => Err(UnknownMode(s.to_string())),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Schedule Config
// ─────────────────────────────────────────────────────────────────────────────

/// One window of the day as written in the config file.
///
/// Times are local wall-clock `HH:MM`. The window covers `[start, end)`;
/// an `end` at or before `start` wraps past midnight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    pub mode: SessionMode,
    pub start: String,
    pub end: String,
}

impl WindowConfig {
    pub fn new(mode: SessionMode, start: &str, end: &str) -> Self {
        Self {
            mode,
            start: start.to_string(),
            end: end.to_string(),
        }
    }
}

pub fn default_windows() -> Vec<WindowConfig> {
    vec![
        WindowConfig::new(SessionMode::Morning, "07:00", "11:30"),
        WindowConfig::new(SessionMode::Midday, "11:30", "17:00"),
        WindowConfig::new(SessionMode::AfterHours, "17:00", "07:00"),
    ]
}

// ─────────────────────────────────────────────────────────────────────────────
// Tracks
// ─────────────────────────────────────────────────────────────────────────────

/// Audio source for each mode. Relative paths resolve against
/// `AppConfig::audio_directory`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackTable {
    #[serde(default = "default_morning_track")]
    pub morning: String,
    #[serde(default = "default_midday_track")]
    pub midday: String,
    #[serde(default = "default_after_hours_track")]
    pub after_hours: String,
}

fn default_morning_track() -> String {
    "audio/morning-service.mp3".to_string()
}

fn default_midday_track() -> String {
    "audio/midday-flow.mp3".to_string()
}

fn default_after_hours_track() -> String {
    "audio/after-hours.mp3".to_string()
}

impl Default for TrackTable {
    fn default() -> Self {
        Self {
            morning: default_morning_track(),
            midday: default_midday_track(),
            after_hours: default_after_hours_track(),
        }
    }
}

impl TrackTable {
    pub fn get(&self, mode: SessionMode) -> &str {
        match mode {
            SessionMode::Morning => &self.morning,
            SessionMode::Midday => &self.midday,
            SessionMode::AfterHours => &self.after_hours,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// App Config
// ─────────────────────────────────────────────────────────────────────────────

/// Persistence methods (load/save) are provided by bynoral-core via the
/// `AppConfigExt` trait.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_windows")]
    pub windows: Vec<WindowConfig>,

    /// How long a manual mode switch lasts
    #[serde(default = "default_override_minutes")]
    pub override_minutes: u32,

    #[serde(default)]
    pub tracks: TrackTable,

    #[serde(default = "default_audio_directory")]
    pub audio_directory: String,

    /// Volume level (0-100)
    #[serde(default = "default_volume")]
    pub volume: u8,

    /// Override slot location; the platform data directory when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_path: Option<String>,
}

fn default_override_minutes() -> u32 {
    12 * 60
}

fn default_audio_directory() -> String {
    ".".to_string()
}

fn default_volume() -> u8 {
    80
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            windows: default_windows(),
            override_minutes: default_override_minutes(),
            tracks: TrackTable::default(),
            audio_directory: default_audio_directory(),
            volume: default_volume(),
            override_path: None,
        }
    }
}
