//! Prior fit results keyed by configuration hash.

use std::sync::Mutex;

use crate::errors::StorageError;
use crate::types::{FitResult, FxHashMap};

/// Cache of completed fits. Keys combine the configuration hash,
/// the tensor fingerprint and the fit target.
pub trait FitCache: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<FitResult>, StorageError>;

    fn put(&self, key: &str, result: &FitResult) -> Result<(), StorageError>;

    fn len(&self) -> Result<usize, StorageError>;

    fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }
}

/// Process-local cache.
#[derive(Debug, Default)]
pub struct MemoryFitCache {
    entries: Mutex<FxHashMap<String, FitResult>>,
}

impl MemoryFitCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FitCache for MemoryFitCache {
    fn get(&self, key: &str) -> Result<Option<FitResult>, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::LockPoisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: &str, result: &FitResult) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(|_| StorageError::LockPoisoned)?;
        entries.insert(key.to_string(), result.clone());
        Ok(())
    }

    fn len(&self) -> Result<usize, StorageError> {
        let entries = self.entries.lock().map_err(|_| StorageError::LockPoisoned)?;
        Ok(entries.len())
    }
}
