//! crates/alttrack_core/src/storage.rs
//!
//! A process-local `KeyValueStore`, used when nothing needs to outlive the
//! process (tests, ephemeral sessions).

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::ports::{KeyValueStore, PortError, PortResult, StorageWrite};

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store, e.g. with data left by a previous run.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let entries = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: Mutex::new(entries),
        }
    }

    pub fn snapshot(&self) -> HashMap<String, String> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> PortResult<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| PortError::Storage(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    async fn apply(&self, writes: &[StorageWrite]) -> PortResult<()> {
        // One lock for the whole batch keeps it atomic for readers.
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| PortError::Storage(e.to_string()))?;
        for write in writes {
            match write {
                StorageWrite::Put { key, value } => {
                    entries.insert(key.clone(), value.clone());
                }
                StorageWrite::Remove { key } => {
                    entries.remove(key);
                }
            }
        }
        Ok(())
    }
}
