use std::path::{Path, PathBuf};

use bynoral_types::{AppConfig, SessionMode, TrackTable};

/// Maps each mode to the file it plays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackCatalog {
    audio_directory: PathBuf,
    tracks: TrackTable,
}

impl Default for TrackCatalog {
    fn default() -> Self {
        Self::new(".", TrackTable::default())
    }
}

impl TrackCatalog {
    pub fn new(audio_directory: impl Into<PathBuf>, tracks: TrackTable) -> Self {
        Self {
            audio_directory: audio_directory.into(),
            tracks,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.audio_directory, config.tracks.clone())
    }

    pub fn audio_directory(&self) -> &Path {
        &self.audio_directory
    }

    /// Absolute track paths are used as-is; relative ones hang off the
    /// audio directory.
    pub fn source_for(&self, mode: SessionMode) -> PathBuf {
        self.audio_directory.join(self.tracks.get(mode))
    }
}
