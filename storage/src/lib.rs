//! XFISH Storage Layer - File-Based Snapshots
//!
//! Sale state lives in memory for the duration of one operation:
//! - Snapshot loaded before the operation
//! - Snapshot written only after the operation succeeds
//! - A failed write never leaves a half-written snapshot behind

use serde::{de::DeserializeOwned, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Snapshot name used for the sale state
pub const SALE_SNAPSHOT: &str = "sale";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Snapshot not found: {0}")]
    SnapshotNotFound(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// File-based snapshot storage
#[derive(Debug, Clone)]
pub struct Storage {
    data_dir: PathBuf,
}

impl Storage {
    /// Open storage directory, creating it if needed
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data_dir = path.as_ref().to_path_buf();

        if !data_dir.exists() {
            fs::create_dir_all(&data_dir)?;
            log::info!("created data directory {}", data_dir.display());
        }

        Ok(Self { data_dir })
    }

    /// Save a snapshot (JSON for readability, Bincode for speed)
    pub fn save_snapshot<T: Serialize>(&self, name: &str, data: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(data)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        let bin = bincode::serialize(data)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        // Both encodings succeeded; only now touch the files
        self.write_atomic(&self.json_path(name), json.as_bytes())?;
        self.write_atomic(&self.bin_path(name), &bin)?;

        log::debug!("saved snapshot '{}' ({} bytes)", name, bin.len());
        Ok(())
    }

    /// Load a snapshot (tries Bincode first, falls back to JSON)
    pub fn load_snapshot<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let bin_path = self.bin_path(name);
        let json_path = self.json_path(name);

        if bin_path.exists() {
            let data = fs::read(&bin_path)?;
            match bincode::deserialize(&data) {
                Ok(value) => return Ok(value),
                Err(e) if json_path.exists() => {
                    log::warn!("snapshot '{}' binary copy unreadable ({}), using JSON", name, e);
                }
                Err(e) => return Err(StorageError::SerializationError(e.to_string())),
            }
        }

        if json_path.exists() {
            let data = fs::read_to_string(&json_path)?;
            return serde_json::from_str(&data)
                .map_err(|e| StorageError::SerializationError(e.to_string()));
        }

        Err(StorageError::SnapshotNotFound(name.to_string()))
    }

    /// Load a snapshot if one exists
    pub fn try_load_snapshot<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        match self.load_snapshot(name) {
            Ok(value) => Ok(Some(value)),
            Err(StorageError::SnapshotNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Check if snapshot exists
    pub fn has_snapshot(&self, name: &str) -> bool {
        self.bin_path(name).exists() || self.json_path(name).exists()
    }

    /// Get storage directory path
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn bin_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{}.bin", name))
    }

    fn json_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", name))
    }

    fn write_atomic(&self, path: &Path, contents: &[u8]) -> Result<()> {
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, contents)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}
