use std::sync::{Arc, Mutex, MutexGuard};

use super::{OverrideStore, StoreError, decode, encode};
use crate::resolver::ModeOverride;

/// In-memory override slot holding the raw encoded text, like a browser
/// local-storage key. Clones share the slot.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the slot with arbitrary text, valid or not.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(raw.into()))),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.lock().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_none()
    }

    fn lock(&self) -> MutexGuard<'_, Option<String>> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl OverrideStore for MemoryStore {
    fn read(&self) -> Result<Option<ModeOverride>, StoreError> {
        self.lock().as_deref().map(decode).transpose()
    }

    fn write(&mut self, value: &ModeOverride) -> Result<(), StoreError> {
        let raw = encode(value)?;
        *self.lock() = Some(raw);
        Ok(())
    }

    fn delete(&mut self) -> Result<(), StoreError> {
        self.lock().take();
        Ok(())
    }
}
