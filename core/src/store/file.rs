use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{OverrideStore, StoreError, decode, encode};
use crate::resolver::ModeOverride;

/// Default slot location: `~/.local/share/bynoral/override.toml` or the
/// platform equivalent.
pub fn default_override_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bynoral")
        .join("override.toml")
}

/// Override slot backed by one file. Survives restarts on this machine only.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn at_default_location() -> Self {
        Self::new(default_override_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OverrideStore for FileStore {
    fn read(&self) -> Result<Option<ModeOverride>, StoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) if e.kind() == ErrorKind::InvalidData => {
                return Err(StoreError::Malformed {
                    reason: "override file is not valid UTF-8".to_string(),
                });
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        decode(&raw).map(Some)
    }

    fn write(&mut self, value: &ModeOverride) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let content = encode(value)?;
        std::fs::write(&self.path, content).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }

    fn delete(&mut self) -> Result<(), StoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Delete {
                path: self.path.clone(),
                source,
            }),
        }
    }
}
