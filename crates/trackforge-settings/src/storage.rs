//! File-backed cold storage
//!
//! Keeps the builder's cold snapshot in a JSON file so a session that ends
//! without teardown can be repaired on the next start.

use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use trackforge_core::{ColdSnapshot, ColdStorage, MemoryColdStorage, StorageError};

use crate::config::BuilderConfig;

/// Cold storage persisted as a JSON document
#[derive(Debug)]
pub struct JsonFileColdStorage {
    path: PathBuf,
    // guards file access
    lock: Mutex<()>,
}

impl JsonFileColdStorage {
    /// Storage at `path`; the file is created on first write
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn backend_error(&self, err: std::io::Error) -> StorageError {
        StorageError::Backend {
            reason: format!("{}: {}", self.path.display(), err),
        }
    }
}

impl ColdStorage for JsonFileColdStorage {
    fn load(&self) -> Result<ColdSnapshot, StorageError> {
        let _guard = self.lock.lock();
        if !self.path.exists() {
            return Ok(ColdSnapshot::default());
        }
        let content = std::fs::read_to_string(&self.path).map_err(|e| self.backend_error(e))?;
        if content.trim().is_empty() {
            return Ok(ColdSnapshot::default());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn store(&self, snapshot: &ColdSnapshot) -> Result<(), StorageError> {
        let _guard = self.lock.lock();
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| self.backend_error(e))?;
            }
        }
        let content = serde_json::to_string_pretty(snapshot)?;
        std::fs::write(&self.path, content).map_err(|e| self.backend_error(e))?;
        tracing::trace!("Cold storage written to {}", self.path.display());
        Ok(())
    }
}

/// Cold storage selected by the configuration
pub fn cold_storage_from_config(config: &BuilderConfig) -> Arc<dyn ColdStorage> {
    match &config.storage.cold_storage_path {
        Some(path) => {
            tracing::debug!("Using cold storage file {}", path.display());
            Arc::new(JsonFileColdStorage::new(path.clone()))
        }
        None => Arc::new(MemoryColdStorage::new()),
    }
}
