use crate::error::{Result, SnapError};
use crate::store::StoragePort;
use std::collections::HashMap;
use std::io;
use std::sync::Mutex;

/// Process-local storage, used in tests and for `--ephemeral` runs
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned() -> SnapError {
    SnapError::StorageError(io::Error::other("memory storage lock poisoned"))
}

impl StoragePort for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().map_err(|_| poisoned())?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| poisoned())?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
