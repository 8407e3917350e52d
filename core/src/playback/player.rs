use std::time::Duration;

use bynoral_types::SessionMode;
use tokio::sync::watch;
use tokio::time::Instant;

use super::{PlaybackError, PlaybackSurface, TrackCatalog};

/// Drives a playback surface from the active session mode.
pub struct Player<P> {
    surface: P,
    catalog: TrackCatalog,
    loaded: Option<SessionMode>,
    playing: watch::Sender<bool>,
    /// Run time of finished stretches of playback
    run_time: Duration,
    /// Start of the stretch playing now
    running_since: Option<Instant>,
}

impl<P: PlaybackSurface> Player<P> {
    pub fn new(surface: P, catalog: TrackCatalog) -> Self {
        let (playing, _) = watch::channel(false);
        Self {
            surface,
            catalog,
            loaded: None,
            playing,
            run_time: Duration::ZERO,
            running_since: None,
        }
    }

    /// Receives every change of the playing flag.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.playing.subscribe()
    }

    pub fn is_playing(&self) -> bool {
        *self.playing.borrow()
    }

    pub fn loaded_mode(&self) -> Option<SessionMode> {
        self.loaded
    }

    pub fn catalog(&self) -> &TrackCatalog {
        &self.catalog
    }

    /// Switch to the track for `mode`.
    ///
    /// Playback resumes on the new track only if it was running before the
    /// switch. Switching to the already loaded mode does nothing.
    pub fn follow_mode(&mut self, mode: SessionMode) -> Result<(), PlaybackError> {
        if self.loaded == Some(mode) {
            return Ok(());
        }

        let resume = self.is_playing();
        let source = self.catalog.source_for(mode);
        tracing::info!(mode = %mode, source = %source.display(), resume, "Switching track");

        self.surface.pause();
        self.surface.load(&source);
        self.loaded = Some(mode);

        if resume {
            self.start()
        } else {
            self.set_playing(false);
            Ok(())
        }
    }

    pub fn play(&mut self) -> Result<(), PlaybackError> {
        if self.is_playing() {
            return Ok(());
        }
        self.start()
    }

    pub fn pause(&mut self) {
        self.surface.pause();
        self.set_playing(false);
    }

    /// Play when stopped, pause when playing. Returns the new playing flag.
    pub fn toggle(&mut self) -> Result<bool, PlaybackError> {
        if self.is_playing() {
            self.pause();
            Ok(false)
        } else {
            self.start().map(|()| true)
        }
    }

    /// Set the output level, clamped to 100. Returns the level applied.
    pub fn set_volume(&mut self, percent: u8) -> u8 {
        let percent = percent.min(100);
        self.surface.set_volume(percent);
        percent
    }

    /// Total time spent playing. Pauses do not count.
    pub fn elapsed(&self) -> Duration {
        self.run_time + self.running_since.map(|t| t.elapsed()).unwrap_or_default()
    }

    fn start(&mut self) -> Result<(), PlaybackError> {
        match self.surface.play() {
            Ok(()) => {
                self.running_since.get_or_insert_with(Instant::now);
                self.set_playing(true);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Playback did not start");
                self.set_playing(false);
                Err(e)
            }
        }
    }

    fn set_playing(&mut self, playing: bool) {
        if !playing {
            if let Some(since) = self.running_since.take() {
                self.run_time += since.elapsed();
            }
        }
        self.playing.send_if_modified(|current| {
            let changed = *current != playing;
            *current = playing;
            changed
        });
    }
}

/// `MM:SS`, minutes keep counting past an hour.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    format!("{:02}:{:02}", total / 60, total % 60)
}
