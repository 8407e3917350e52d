use bynoral_types::SessionMode;
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A manual mode selection that lapses at `expires_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeOverride {
    pub mode: SessionMode,
    pub expires_at: DateTime<Utc>,
}

impl ModeOverride {
    /// `None` when `now + duration` is past the representable range.
    pub fn new<Tz: TimeZone>(
        mode: SessionMode,
        now: &DateTime<Tz>,
        duration: TimeDelta,
    ) -> Option<Self> {
        let expires_at = now.with_timezone(&Utc).checked_add_signed(duration)?;
        Some(Self { mode, expires_at })
    }

    /// Active strictly before expiry; the expiry instant itself is automatic.
    pub fn is_active_at<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> bool {
        now.with_timezone(&Utc) < self.expires_at
    }

    pub fn remaining<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> TimeDelta {
        (self.expires_at - now.with_timezone(&Utc)).max(TimeDelta::zero())
    }

    pub fn expires_at_local(&self) -> DateTime<Local> {
        self.expires_at.with_timezone(&Local)
    }
}
