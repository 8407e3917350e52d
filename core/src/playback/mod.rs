//! Playback surface abstraction
//!
//! The surface is whatever actually makes sound. Decoding and output are
//! its business; this crate only tells it which file to load and when to
//! play or pause. `Player` sits on top and keeps the playing flag, the
//! loaded mode and the run time.

mod player;
mod tracks;


pub use player::{Player, format_elapsed};
pub use tracks::TrackCatalog;

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// The host refused to start audio. Retrying needs a new user action.
    #[error("playback blocked: {reason}")]
    Blocked { reason: String },

    #[error("playback unavailable: {reason}")]
    Unavailable { reason: String },
}

impl PlaybackError {
    /// Short hint for the person at the counter.
    pub fn user_hint(&self) -> &'static str {
        match self {
            PlaybackError::Blocked { .. } => "Tap again to start audio",
            PlaybackError::Unavailable { .. } => "Audio output is not available",
        }
    }
}

pub trait PlaybackSurface: Send {
    /// Replace the current source. Takes effect on the next `play`.
    fn load(&mut self, source: &Path);

    fn play(&mut self) -> Result<(), PlaybackError>;

    fn pause(&mut self);

    /// Output level in percent, 0 to 100.
    fn set_volume(&mut self, percent: u8);
}

impl<P: PlaybackSurface + ?Sized> PlaybackSurface for Box<P> {
    fn load(&mut self, source: &Path) {
        (**self).load(source)
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        (**self).play()
    }

    fn pause(&mut self) {
        (**self).pause()
    }

    fn set_volume(&mut self, percent: u8) {
        (**self).set_volume(percent)
    }
}

/// A surface with no audio device. Logs what it would do.
#[derive(Debug, Default)]
pub struct HeadlessSurface {
    loaded: Option<PathBuf>,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PlaybackSurface for HeadlessSurface {
    fn load(&mut self, source: &Path) {
        tracing::debug!(source = %source.display(), "Headless load");
        self.loaded = Some(source.to_path_buf());
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        match &self.loaded {
            Some(source) => {
                tracing::info!(source = %source.display(), "Headless playback started");
                Ok(())
            }
            None => Err(PlaybackError::Unavailable {
                reason: "no track loaded".to_string(),
            }),
        }
    }

    fn pause(&mut self) {
        tracing::debug!("Headless pause");
    }

    fn set_volume(&mut self, percent: u8) {
        tracing::debug!(percent, "Headless volume");
    }
}
