//! Save/load persistence for the leaderboard service
//!
//! Features:
//! - Versioned JSON envelope
//! - Backup rotation (tmp → save, old save → backup)
//! - Corruption detection and recovery from the backup

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Current envelope format
pub const ENVELOPE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("corrupt store {path}: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("store {path} has unsupported version {found}")]
    UnsupportedVersion { path: PathBuf, found: u32 },
}

/// On-disk wrapper around the payload
#[derive(Debug, Serialize, Deserialize)]
struct Envelope<T> {
    version: u32,
    /// Unix timestamp (ms) of the write
    saved_at: u64,
    payload: T,
}

/// A JSON document on disk with a rotating backup
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        with_suffix(&self.path, "tmp")
    }

    fn backup_path(&self) -> PathBuf {
        with_suffix(&self.path, "bak")
    }

    /// Load the payload. `Ok(None)` means no store exists yet.
    ///
    /// A corrupt main file falls back to the backup if that one reads cleanly.
    pub fn load<T: DeserializeOwned>(&self) -> Result<Option<T>, PersistenceError> {
        match read_envelope(&self.path) {
            Ok(payload) => Ok(payload),
            Err(err @ PersistenceError::Corrupt { .. }) => {
                let backup = self.backup_path();
                match read_envelope(&backup) {
                    Ok(Some(payload)) => {
                        log::warn!("{}; recovered from {}", err, backup.display());
                        Ok(Some(payload))
                    }
                    _ => Err(err),
                }
            }
            Err(err) => Err(err),
        }
    }

    /// Write the payload: tmp file first, previous save copied to the backup,
    /// then the tmp file renamed over the main file.
    pub fn save<T: Serialize>(&self, payload: &T) -> Result<(), PersistenceError> {
        let envelope = Envelope {
            version: ENVELOPE_VERSION,
            saved_at: crate::now_millis(),
            payload,
        };
        let json = serde_json::to_vec_pretty(&envelope).map_err(|source| PersistenceError::Corrupt {
            path: self.path.clone(),
            source,
        })?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| io_error(dir, source))?;
        }

        let tmp = self.tmp_path();
        fs::write(&tmp, json).map_err(|source| io_error(&tmp, source))?;

        if self.path.exists() {
            let backup = self.backup_path();
            fs::copy(&self.path, &backup).map_err(|source| io_error(&backup, source))?;
        }
        fs::rename(&tmp, &self.path).map_err(|source| io_error(&self.path, source))?;
        Ok(())
    }
}

fn read_envelope<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, PersistenceError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => return Err(io_error(path, source)),
    };
    let envelope: Envelope<T> =
        serde_json::from_slice(&bytes).map_err(|source| PersistenceError::Corrupt {
            path: path.to_path_buf(),
            source,
        })?;
    if envelope.version != ENVELOPE_VERSION {
        return Err(PersistenceError::UnsupportedVersion {
            path: path.to_path_buf(),
            found: envelope.version,
        });
    }
    Ok(Some(envelope.payload))
}

fn io_error(path: &Path, source: io::Error) -> PersistenceError {
    PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}
