//! Application configuration
//!
//! Re-exports the shared types from bynoral-types and adds persistence and
//! the conversions into validated runtime values.

use std::path::PathBuf;

use chrono::TimeDelta;

pub use bynoral_types::{AppConfig, TrackTable, WindowConfig};

use super::ConfigError;
use crate::playback::TrackCatalog;
use crate::schedule::DaySchedule;
use crate::store::FileStore;

const APP_NAME: &str = "bynoral";
const CONFIG_NAME: &str = "config";

/// Extension trait for AppConfig persistence and derived runtime values
pub trait AppConfigExt: Sized {
    /// Load, falling back to defaults when the file cannot be read.
    fn load() -> Self;
    fn try_load() -> Result<Self, ConfigError>;
    fn save(&self) -> Result<(), ConfigError>;
    fn config_path() -> Result<PathBuf, ConfigError>;

    /// Validated schedule, or the built-in one when the configured windows
    /// do not partition the day.
    fn day_schedule(&self) -> DaySchedule;
    fn override_duration(&self) -> TimeDelta;
    fn track_catalog(&self) -> TrackCatalog;
    fn override_store(&self) -> FileStore;
}

impl AppConfigExt for AppConfig {
    fn load() -> Self {
        Self::try_load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Using default configuration");
            AppConfig::default()
        })
    }

    fn try_load() -> Result<Self, ConfigError> {
        Ok(confy::load(APP_NAME, CONFIG_NAME)?)
    }

    fn save(&self) -> Result<(), ConfigError> {
        confy::store(APP_NAME, CONFIG_NAME, self).map_err(ConfigError::Save)
    }

    fn config_path() -> Result<PathBuf, ConfigError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME).map_err(ConfigError::Locate)
    }

    fn day_schedule(&self) -> DaySchedule {
        match DaySchedule::from_config(&self.windows) {
            Ok(schedule) => schedule,
            Err(e) => {
                tracing::warn!(error = %e, "Invalid schedule in configuration, using default windows");
                DaySchedule::default()
            }
        }
    }

    fn override_duration(&self) -> TimeDelta {
        TimeDelta::minutes(i64::from(self.override_minutes.max(1)))
    }

    fn track_catalog(&self) -> TrackCatalog {
        TrackCatalog::from_config(self)
    }

    fn override_store(&self) -> FileStore {
        match &self.override_path {
            Some(path) => FileStore::new(path),
            None => FileStore::at_default_location(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bynoral_types::SessionMode;

    #[test]
    fn test_default_config_schedule_matches_built_in() {
        assert_eq!(AppConfig::default().day_schedule(), DaySchedule::default());
    }

    #[test]
    fn test_invalid_windows_fall_back_to_default_schedule() {
        let config = AppConfig {
            windows: vec![WindowConfig::new(SessionMode::Morning, "07:00", "11:00")],
            ..AppConfig::default()
        };
        assert_eq!(config.day_schedule(), DaySchedule::default());
    }

    #[test]
    fn test_custom_windows_are_used() {
        let config = AppConfig {
            windows: vec![
                WindowConfig::new(SessionMode::Morning, "06:00", "11:00"),
                WindowConfig::new(SessionMode::Midday, "11:00", "16:00"),
                WindowConfig::new(SessionMode::AfterHours, "16:00", "06:00"),
            ],
            ..AppConfig::default()
        };
        let schedule = config.day_schedule();
        assert_eq!(schedule.mode_at(16 * 60), SessionMode::AfterHours);
        assert_eq!(schedule.mode_at(6 * 60), SessionMode::Morning);
    }

    #[test]
    fn test_override_duration_defaults_to_twelve_hours() {
        assert_eq!(AppConfig::default().override_duration(), TimeDelta::hours(12));
        let zero = AppConfig {
            override_minutes: 0,
            ..AppConfig::default()
        };
        assert_eq!(zero.override_duration(), TimeDelta::minutes(1));
    }

    #[test]
    fn test_override_path_from_config() {
        let config = AppConfig {
            override_path: Some("/tmp/bynoral-slot.toml".to_string()),
            ..AppConfig::default()
        };
        assert_eq!(
            config.override_store().path(),
            std::path::Path::new("/tmp/bynoral-slot.toml")
        );
    }
}
