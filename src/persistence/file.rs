//! File-backed score store (native)

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{ScoreStore, StorageError, decode, encode};

/// JSON record on disk
///
/// Writes go to `<path>.tmp` first and are renamed over the real file, so a
/// crash mid-write never leaves a truncated record behind.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        PathBuf::from(tmp)
    }
}

impl ScoreStore for FileStore {
    fn load(&self) -> Result<u64, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(json) => decode(&json),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, score: u64) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let tmp = self.tmp_path();
        fs::write(&tmp, encode(score)?)?;
        fs::rename(&tmp, &self.path)?;
        log::debug!("High score {} written to {}", score, self.path.display());
        Ok(())
    }
}
