//! Override slot persistence
//!
//! The slot holds at most one `ModeOverride`, encoded as a small TOML
//! document:
//!
//! ```toml
//! mode = "after_hours"
//! expires_at = "2025-01-15T21:00:00Z"
//! ```
//!
//! Stores only move bytes. Deciding whether an override is still active,
//! and purging stale or malformed entries, is the resolver's job.

mod error;
mod file;
mod memory;

pub use error::StoreError;
pub use file::{FileStore, default_override_path};
pub use memory::MemoryStore;

use crate::resolver::ModeOverride;

/// A single persisted override slot.
pub trait OverrideStore: Send {
    /// `Ok(None)` when the slot is empty, `Err(StoreError::Malformed)` when
    /// it holds something that is not an override.
    fn read(&self) -> Result<Option<ModeOverride>, StoreError>;

    fn write(&mut self, value: &ModeOverride) -> Result<(), StoreError>;

    /// Empty the slot. Deleting an empty slot is not an error.
    fn delete(&mut self) -> Result<(), StoreError>;
}

impl<S: OverrideStore + ?Sized> OverrideStore for Box<S> {
    fn read(&self) -> Result<Option<ModeOverride>, StoreError> {
        (**self).read()
    }

    fn write(&mut self, value: &ModeOverride) -> Result<(), StoreError> {
        (**self).write(value)
    }

    fn delete(&mut self) -> Result<(), StoreError> {
        (**self).delete()
    }
}

pub(crate) fn encode(value: &ModeOverride) -> Result<String, StoreError> {
    Ok(toml::to_string(value)?)
}

pub(crate) fn decode(raw: &str) -> Result<ModeOverride, StoreError> {
    toml::from_str(raw).map_err(|e| StoreError::Malformed {
        reason: e.message().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bynoral_types::SessionMode;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_decode_written_slot() {
        let raw = "mode = \"after_hours\"\nexpires_at = \"2025-01-15T21:00:00Z\"\n";
        let value = decode(raw).unwrap();
        assert_eq!(value.mode, SessionMode::AfterHours);
        assert_eq!(
            value.expires_at,
            Utc.with_ymd_and_hms(2025, 1, 15, 21, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_encode_uses_mode_keys() {
        let value = ModeOverride {
            mode: SessionMode::Midday,
            expires_at: Utc.with_ymd_and_hms(2025, 1, 15, 21, 0, 0).unwrap(),
        };
        let raw = encode(&value).unwrap();
        assert!(raw.contains("mode = \"midday\""), "{raw}");
        assert_eq!(decode(&raw).unwrap(), value);
    }

    #[test]
    fn test_decode_rejects_malformed_slots() {
        let cases = [
            "",
            "not toml at all {",
            "mode = \"after_hours\"\n",
            "expires_at = \"2025-01-15T21:00:00Z\"\n",
            "mode = \"brunch\"\nexpires_at = \"2025-01-15T21:00:00Z\"\n",
            "mode = \"midday\"\nexpires_at = \"tomorrow\"\n",
        ];
        for raw in cases {
            let err = decode(raw).unwrap_err();
            assert!(err.is_malformed(), "expected malformed for {raw:?}, got {err:?}");
        }
    }
}
