//! Persistence backends for the favorites store.
//!
//! A backend is a string key-value store: read a blob, write a blob.
//! `FileBackend` keeps one `{key}.json` file per key under a directory;
//! `MemoryBackend` keeps everything in a map.

use crate::error::StorageError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub trait StorageBackend {
    /// `Ok(None)` when nothing was ever written under `key`.
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&mut self, key: &str, blob: &str) -> Result<(), StorageError>;
}

/// Directory of JSON files, one per key.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `~/.local/share/natureid` on Linux, the platform equivalent elsewhere.
    pub fn default_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("natureid")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of the file backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Creates the directory if it doesn't exist.
    fn write(&mut self, key: &str, blob: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), blob)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    blobs: HashMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a blob, e.g. to simulate what an earlier session left behind.
    pub fn with_blob(mut self, key: &str, blob: &str) -> Self {
        self.blobs.insert(key.to_string(), blob.to_string());
        self
    }

    pub fn blob(&self, key: &str) -> Option<&str> {
        self.blobs.get(key).map(String::as_str)
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.blobs.get(key).cloned())
    }

    fn write(&mut self, key: &str, blob: &str) -> Result<(), StorageError> {
        self.blobs.insert(key.to_string(), blob.to_string());
        Ok(())
    }
}
