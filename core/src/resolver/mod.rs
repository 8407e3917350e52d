//! Session mode resolution
//!
//! The resolver answers one question: which mode is playing right now. The
//! clock picks a mode through the `DaySchedule`; a manual `ModeOverride`
//! takes precedence until it expires.
//!
//! # States
//!
//! ```text
//!              set_override
//!   Automatic ───────────────▶ Overridden
//!       ▲                          │
//!       └──── clear_override ──────┤
//!       └──── expiry (lazy) ───────┘
//! ```
//!
//! Expiry is detected when the slot is read; nothing sweeps in the
//! background. Stale and malformed slots are purged and read as "no
//! override", never reported to the caller.

mod mode_override;

#[cfg(test)]
mod resolver_tests;

pub use mode_override::ModeOverride;

use bynoral_types::SessionMode;
use chrono::{DateTime, Local, TimeDelta, TimeZone};
use thiserror::Error;

use crate::clock::Clock;
use crate::schedule::DaySchedule;
use crate::store::{OverrideStore, StoreError};

#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("override duration must be positive, got {minutes} minutes")]
    InvalidDuration { minutes: i64 },

    #[error("override of {minutes} minutes ends too far in the future")]
    DurationTooLong { minutes: i64 },

    #[error("failed to persist override")]
    Store(#[from] StoreError),
}

/// Which source decides the mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverState {
    Automatic,
    Overridden(ModeOverride),
}

impl ResolverState {
    pub fn is_overridden(&self) -> bool {
        matches!(self, ResolverState::Overridden(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeReason {
    /// The schedule moves into the next window
    Boundary,
    /// The active override lapses
    OverrideExpiry,
}

/// The single next instant the mode has to be re-evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Wakeup {
    pub at: DateTime<Local>,
    pub reason: WakeReason,
}

/// Everything a consumer needs to know about the mode at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeSnapshot {
    pub mode: SessionMode,
    pub state: ResolverState,
    pub next_wakeup: Wakeup,
}

/// Mode at `now` given a slot value that has already been read.
///
/// Pure: no store access, no purge.
pub fn active_mode<Tz: TimeZone>(
    schedule: &DaySchedule,
    now: &DateTime<Tz>,
    current: Option<&ModeOverride>,
) -> SessionMode {
    match current {
        Some(o) if o.is_active_at(now) => o.mode,
        _ => schedule.resolve_automatic_mode(now),
    }
}

/// Owns the schedule, the override slot and the clock.
pub struct SessionResolver<S, C> {
    schedule: DaySchedule,
    store: S,
    clock: C,
}

impl<S: OverrideStore, C: Clock> SessionResolver<S, C> {
    pub fn new(schedule: DaySchedule, store: S, clock: C) -> Self {
        Self {
            schedule,
            store,
            clock,
        }
    }

    pub fn schedule(&self) -> &DaySchedule {
        &self.schedule
    }

    pub fn now(&self) -> DateTime<Local> {
        self.clock.now()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read the slot, purging it when stale or malformed.
    pub fn current_override_at(&mut self, now: &DateTime<Local>) -> Option<ModeOverride> {
        match self.store.read() {
            Ok(Some(o)) if o.is_active_at(now) => Some(o),
            Ok(Some(stale)) => {
                tracing::info!(
                    mode = %stale.mode,
                    expired_at = %stale.expires_at_local(),
                    "Manual mode expired, returning to schedule"
                );
                self.purge();
                None
            }
            Ok(None) => None,
            Err(e) if e.is_malformed() => {
                tracing::warn!(error = %e, "Discarding malformed override");
                self.purge();
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Override slot unreadable, using schedule");
                None
            }
        }
    }

    pub fn current_override(&mut self) -> Option<ModeOverride> {
        let now = self.clock.now();
        self.current_override_at(&now)
    }

    pub fn active_mode_at(&mut self, now: &DateTime<Local>) -> SessionMode {
        let current = self.current_override_at(now);
        active_mode(&self.schedule, now, current.as_ref())
    }

    pub fn active_mode(&mut self) -> SessionMode {
        let now = self.clock.now();
        self.active_mode_at(&now)
    }

    pub fn state_at(&mut self, now: &DateTime<Local>) -> ResolverState {
        match self.current_override_at(now) {
            Some(o) => ResolverState::Overridden(o),
            None => ResolverState::Automatic,
        }
    }

    pub fn state(&mut self) -> ResolverState {
        let now = self.clock.now();
        self.state_at(&now)
    }

    /// Mode, state and next wakeup from a single read of the slot.
    pub fn snapshot_at(&mut self, now: &DateTime<Local>) -> ModeSnapshot {
        match self.current_override_at(now) {
            Some(o) => ModeSnapshot {
                mode: o.mode,
                state: ResolverState::Overridden(o),
                next_wakeup: Wakeup {
                    at: o.expires_at_local(),
                    reason: WakeReason::OverrideExpiry,
                },
            },
            None => ModeSnapshot {
                mode: self.schedule.resolve_automatic_mode(now),
                state: ResolverState::Automatic,
                next_wakeup: Wakeup {
                    at: self.schedule.next_boundary(now),
                    reason: WakeReason::Boundary,
                },
            },
        }
    }

    pub fn snapshot(&mut self) -> ModeSnapshot {
        let now = self.clock.now();
        self.snapshot_at(&now)
    }

    /// Override expiry while overridden, otherwise the next schedule boundary.
    pub fn next_wakeup_at(&mut self, now: &DateTime<Local>) -> Wakeup {
        self.snapshot_at(now).next_wakeup
    }

    pub fn set_override_at(
        &mut self,
        mode: SessionMode,
        now: &DateTime<Local>,
        duration: TimeDelta,
    ) -> Result<ModeOverride, ResolverError> {
        if duration <= TimeDelta::zero() {
            return Err(ResolverError::InvalidDuration {
                minutes: duration.num_minutes(),
            });
        }

        let value = ModeOverride::new(mode, now, duration).ok_or(
            ResolverError::DurationTooLong {
                minutes: duration.num_minutes(),
            },
        )?;
        self.store.write(&value)?;
        tracing::info!(
            mode = %mode,
            until = %value.expires_at_local(),
            "Manual mode set"
        );
        Ok(value)
    }

    pub fn set_override(
        &mut self,
        mode: SessionMode,
        duration: TimeDelta,
    ) -> Result<ModeOverride, ResolverError> {
        let now = self.clock.now();
        self.set_override_at(mode, &now, duration)
    }

    pub fn clear_override(&mut self) -> Result<(), ResolverError> {
        self.store.delete()?;
        tracing::info!("Manual mode cleared, following schedule");
        Ok(())
    }

    fn purge(&mut self) {
        if let Err(e) = self.store.delete() {
            tracing::warn!(error = %e, "Failed to purge override slot");
        }
    }
}
