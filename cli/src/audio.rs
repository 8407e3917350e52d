//! Speaker output through rodio
//!
//! rodio's output stream cannot leave the thread that opened it, so the
//! stream and sink live on a dedicated thread and the surface talks to it
//! over a channel.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread::JoinHandle;
use std::time::Duration;

use bynoral_core::{PlaybackError, PlaybackSurface};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

const REPLY_TIMEOUT: Duration = Duration::from_secs(2);

enum AudioCommand {
    Load(PathBuf),
    Play(mpsc::Sender<Result<(), PlaybackError>>),
    Pause,
    Volume(f32),
}

pub struct RodioSurface {
    commands: mpsc::Sender<AudioCommand>,
    thread: Option<JoinHandle<()>>,
}

impl RodioSurface {
    /// `volume` is a percentage, clamped to 100.
    pub fn new(volume: u8) -> Self {
        let (commands, rx) = mpsc::channel();
        let volume = level(volume);
        let thread = std::thread::Builder::new()
            .name("bynoral-audio".to_string())
            .spawn(move || run(rx, volume))
            .map_err(|e| tracing::error!(error = %e, "Failed to start audio thread"))
            .ok();
        Self { commands, thread }
    }
}

impl Drop for RodioSurface {
    fn drop(&mut self) {
        // Closing the channel ends the thread's loop
        let (closed, _) = mpsc::channel();
        self.commands = closed;
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl PlaybackSurface for RodioSurface {
    fn load(&mut self, source: &Path) {
        let _ = self.commands.send(AudioCommand::Load(source.to_path_buf()));
    }

    fn play(&mut self) -> Result<(), PlaybackError> {
        let unavailable = |reason: &str| PlaybackError::Unavailable {
            reason: reason.to_string(),
        };

        let (reply, rx) = mpsc::channel();
        self.commands
            .send(AudioCommand::Play(reply))
            .map_err(|_| unavailable("audio thread is not running"))?;
        rx.recv_timeout(REPLY_TIMEOUT)
            .map_err(|_| unavailable("audio thread did not answer"))?
    }

    fn pause(&mut self) {
        let _ = self.commands.send(AudioCommand::Pause);
    }

    fn set_volume(&mut self, percent: u8) {
        let _ = self.commands.send(AudioCommand::Volume(level(percent)));
    }
}

struct Output {
    // Dropping the stream silences every sink created from it
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

fn level(percent: u8) -> f32 {
    f32::from(percent.min(100)) / 100.0
}

fn run(rx: mpsc::Receiver<AudioCommand>, mut volume: f32) {
    let output = match OutputStream::try_default() {
        Ok((stream, handle)) => Some(Output {
            _stream: stream,
            handle,
        }),
        Err(e) => {
            tracing::warn!(error = %e, "No audio output device");
            None
        }
    };

    let mut sink: Option<Sink> = None;
    let mut load_error: Option<String> = None;

    while let Ok(command) = rx.recv() {
        match command {
            AudioCommand::Load(path) => {
                sink = None;
                load_error = None;
                let Some(output) = &output else { continue };
                match open_looped(&output.handle, &path, volume) {
                    Ok(new_sink) => {
                        tracing::debug!(source = %path.display(), "Track loaded");
                        sink = Some(new_sink);
                    }
                    Err(reason) => {
                        tracing::warn!(source = %path.display(), reason = %reason, "Failed to load track");
                        load_error = Some(reason);
                    }
                }
            }
            AudioCommand::Play(reply) => {
                let result = match (&output, &sink) {
                    (None, _) => Err(PlaybackError::Unavailable {
                        reason: "no audio output device".to_string(),
                    }),
                    (Some(_), Some(sink)) => {
                        sink.play();
                        Ok(())
                    }
                    (Some(_), None) => Err(PlaybackError::Unavailable {
                        reason: load_error
                            .clone()
                            .unwrap_or_else(|| "no track loaded".to_string()),
                    }),
                };
                let _ = reply.send(result);
            }
            AudioCommand::Pause => {
                if let Some(sink) = &sink {
                    sink.pause();
                }
            }
            AudioCommand::Volume(new_volume) => {
                volume = new_volume;
                if let Some(sink) = &sink {
                    sink.set_volume(volume);
                }
            }
        }
    }
}

/// Sink holding `path` on repeat, paused until told to play.
fn open_looped(handle: &OutputStreamHandle, path: &Path, volume: f32) -> Result<Sink, String> {
    let file = File::open(path).map_err(|e| e.to_string())?;
    let source = Decoder::new_looped(BufReader::new(file)).map_err(|e| e.to_string())?;
    let sink = Sink::try_new(handle).map_err(|e| e.to_string())?;
    sink.pause();
    sink.set_volume(volume);
    sink.append(source);
    Ok(sink)
}
