//! LocalStorage-backed score store (wasm32)

use web_sys::Storage;

use super::{ScoreStore, StorageError, decode, encode};

/// Default LocalStorage key
pub const STORAGE_KEY: &str = "signal_strike_high_score";

/// High score kept in the browser's LocalStorage
#[derive(Debug, Clone)]
pub struct LocalStorageStore {
    key: String,
}

impl Default for LocalStorageStore {
    fn default() -> Self {
        Self::new(STORAGE_KEY)
    }
}

impl LocalStorageStore {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn storage() -> Result<Storage, StorageError> {
        web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("no window".into()))?
            .local_storage()
            .map_err(|e| StorageError::Unavailable(format!("{e:?}")))?
            .ok_or_else(|| StorageError::Unavailable("LocalStorage disabled".into()))
    }
}

impl ScoreStore for LocalStorageStore {
    fn load(&self) -> Result<u64, StorageError> {
        let item = Self::storage()?
            .get_item(&self.key)
            .map_err(|e| StorageError::Unavailable(format!("{e:?}")))?;
        match item {
            Some(json) => decode(&json),
            None => Ok(0),
        }
    }

    fn save(&mut self, score: u64) -> Result<(), StorageError> {
        let json = encode(score)?;
        Self::storage()?
            .set_item(&self.key, &json)
            .map_err(|e| StorageError::Unavailable(format!("{e:?}")))?;
        log::info!("High score saved ({})", score);
        Ok(())
    }
}
