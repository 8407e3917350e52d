//! Mode scheduler
//!
//! Runs the resolver in one tokio task with exactly one timer pending:
//! the next schedule boundary while automatic, the override expiry while
//! overridden. Every command or timer firing recomputes the wakeup and the
//! old sleep is simply dropped, so there is nothing to cancel explicitly.
//!
//! Consumers hold a `ModeHandle`: commands go in over an mpsc channel, the
//! current `ModeSnapshot` comes out over a watch channel.

#[cfg(test)]
mod scheduler_tests;

use std::time::Duration;

use bynoral_types::SessionMode;
use chrono::TimeDelta;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::clock::Clock;
use crate::resolver::{ModeOverride, ModeSnapshot, ResolverError, SessionResolver};
use crate::store::OverrideStore;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("mode scheduler is not running")]
    Stopped,

    #[error(transparent)]
    Resolver(#[from] ResolverError),
}

enum Command {
    SetOverride {
        mode: SessionMode,
        duration: TimeDelta,
        reply: oneshot::Sender<Result<ModeOverride, ResolverError>>,
    },
    ClearOverride {
        reply: oneshot::Sender<Result<(), ResolverError>>,
    },
    Shutdown,
}

/// Cloneable front door to a running scheduler.
#[derive(Clone)]
pub struct ModeHandle {
    commands: mpsc::Sender<Command>,
    snapshot: watch::Receiver<ModeSnapshot>,
}

impl ModeHandle {
    /// Latest published snapshot.
    pub fn snapshot(&self) -> ModeSnapshot {
        *self.snapshot.borrow()
    }

    /// Woken whenever the snapshot changes.
    pub fn subscribe(&self) -> watch::Receiver<ModeSnapshot> {
        self.snapshot.clone()
    }

    pub async fn set_override(
        &self,
        mode: SessionMode,
        duration: TimeDelta,
    ) -> Result<ModeOverride, SchedulerError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::SetOverride {
            mode,
            duration,
            reply,
        })
        .await?;
        Ok(rx.await.map_err(|_| SchedulerError::Stopped)??)
    }

    pub async fn clear_override(&self) -> Result<(), SchedulerError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::ClearOverride { reply }).await?;
        Ok(rx.await.map_err(|_| SchedulerError::Stopped)??)
    }

    pub async fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown).await;
    }

    async fn send(&self, command: Command) -> Result<(), SchedulerError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| SchedulerError::Stopped)
    }
}

pub struct ModeScheduler<S, C> {
    resolver: SessionResolver<S, C>,
    commands: mpsc::Receiver<Command>,
    snapshot: watch::Sender<ModeSnapshot>,
}

impl<S, C> ModeScheduler<S, C>
where
    S: OverrideStore + 'static,
    C: Clock + 'static,
{
    /// Evaluate once so the handle has a snapshot before the task runs.
    pub fn new(mut resolver: SessionResolver<S, C>) -> (Self, ModeHandle) {
        let initial = resolver.snapshot();
        tracing::info!(
            mode = %initial.mode,
            overridden = initial.state.is_overridden(),
            "Session mode initialized"
        );

        let (command_tx, command_rx) = mpsc::channel(16);
        let (snapshot_tx, snapshot_rx) = watch::channel(initial);

        let scheduler = Self {
            resolver,
            commands: command_rx,
            snapshot: snapshot_tx,
        };
        let handle = ModeHandle {
            commands: command_tx,
            snapshot: snapshot_rx,
        };
        (scheduler, handle)
    }

    /// Build and spawn onto the current tokio runtime.
    pub fn spawn(resolver: SessionResolver<S, C>) -> (ModeHandle, JoinHandle<()>) {
        let (scheduler, handle) = Self::new(resolver);
        let task = tokio::spawn(scheduler.run());
        (handle, task)
    }

    pub async fn run(mut self) {
        loop {
            let snapshot = self.publish();
            let delay = self.delay_until(&snapshot);
            tracing::debug!(
                at = %snapshot.next_wakeup.at,
                reason = ?snapshot.next_wakeup.reason,
                delay_secs = delay.as_secs(),
                "Timer armed"
            );

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                command = self.commands.recv() => match command {
                    Some(Command::SetOverride { mode, duration, reply }) => {
                        let result = self.resolver.set_override(mode, duration);
                        self.publish();
                        let _ = reply.send(result);
                    }
                    Some(Command::ClearOverride { reply }) => {
                        let result = self.resolver.clear_override();
                        self.publish();
                        let _ = reply.send(result);
                    }
                    Some(Command::Shutdown) | None => break,
                },
            }
        }

        tracing::debug!("Mode scheduler stopped");
    }

    /// Re-evaluate and notify subscribers if anything changed.
    fn publish(&mut self) -> ModeSnapshot {
        let snapshot = self.resolver.snapshot();
        self.snapshot.send_if_modified(|current| {
            if *current == snapshot {
                return false;
            }
            if current.mode != snapshot.mode {
                tracing::info!(
                    from = %current.mode,
                    to = %snapshot.mode,
                    overridden = snapshot.state.is_overridden(),
                    "Session mode changed"
                );
            }
            *current = snapshot;
            true
        });
        snapshot
    }

    fn delay_until(&self, snapshot: &ModeSnapshot) -> Duration {
        (snapshot.next_wakeup.at - self.resolver.now())
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}
