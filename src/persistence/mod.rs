//! High-score persistence
//!
//! The only state that outlives a session is one numeric high score. It is
//! stored as a small versioned JSON record through a `ScoreStore` backend:
//! - `MemoryStore`: process lifetime only (tests, headless runs)
//! - `FileStore`: JSON file with tmp-then-rename writes (native)
//! - `LocalStorageStore`: browser LocalStorage (wasm32)

#[cfg(not(target_arch = "wasm32"))]
pub mod file;
#[cfg(target_arch = "wasm32")]
pub mod web;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;
#[cfg(target_arch = "wasm32")]
pub use web::LocalStorageStore;

use std::fmt;

use serde::{Deserialize, Serialize};

/// Current record format version
pub const RECORD_VERSION: u32 = 1;

/// Errors from a score backend
#[derive(Debug)]
pub enum StorageError {
    /// Filesystem failure
    Io(std::io::Error),
    /// Stored data is not a valid record
    Format(serde_json::Error),
    /// Record written by an unknown format version
    Version(u32),
    /// Backend not reachable (no window, storage disabled, ...)
    Unavailable(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "storage I/O error: {e}"),
            StorageError::Format(e) => write!(f, "malformed score record: {e}"),
            StorageError::Version(v) => write!(f, "unsupported score record version {v}"),
            StorageError::Unavailable(why) => write!(f, "storage unavailable: {why}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            StorageError::Format(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Format(e)
    }
}

/// Backend for the persisted high score
pub trait ScoreStore {
    /// Stored score, or 0 if nothing has been saved yet
    fn load(&self) -> Result<u64, StorageError>;
    fn save(&mut self, score: u64) -> Result<(), StorageError>;
}

impl<S: ScoreStore + ?Sized> ScoreStore for Box<S> {
    fn load(&self) -> Result<u64, StorageError> {
        (**self).load()
    }

    fn save(&mut self, score: u64) -> Result<(), StorageError> {
        (**self).save(score)
    }
}

/// On-disk record
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct ScoreRecord {
    version: u32,
    high_score: u64,
}

/// Serialize a score as a versioned record
pub fn encode(score: u64) -> Result<String, StorageError> {
    let record = ScoreRecord {
        version: RECORD_VERSION,
        high_score: score,
    };
    Ok(serde_json::to_string(&record)?)
}

/// Parse a versioned record
pub fn decode(json: &str) -> Result<u64, StorageError> {
    let record: ScoreRecord = serde_json::from_str(json)?;
    if record.version != RECORD_VERSION {
        return Err(StorageError::Version(record.version));
    }
    Ok(record.high_score)
}

/// In-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    value: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a raw stored record, valid or not
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            value: Some(raw.into()),
        }
    }
}

impl ScoreStore for MemoryStore {
    fn load(&self) -> Result<u64, StorageError> {
        match &self.value {
            Some(raw) => decode(raw),
            None => Ok(0),
        }
    }

    fn save(&mut self, score: u64) -> Result<(), StorageError> {
        self.value = Some(encode(score)?);
        Ok(())
    }
}
