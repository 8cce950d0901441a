use std::{
    collections::HashMap,
    io,
    sync::atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;

/// Storage key holding the serialized category list.
pub const CATEGORIES_KEY: &str = "categories";
/// Storage key holding the serialized transaction list.
pub const TRANSACTIONS_KEY: &str = "transactions";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Asynchronous get/set-by-key string store the record stores persist into.
///
/// Both calls are fallible. Callers treat a failed `get` as "no data" and a
/// failed `set` as a lost write; neither is retried.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    async fn set(&self, key: &str, value: String) -> Result<(), StorageError>;
}

/// Process-local storage, used when nothing should touch the disk.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    entries: Mutex<HashMap<String, String>>,
    reject_writes: AtomicBool,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a raw value under `key`.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.into(), value.into());
        Self {
            entries: Mutex::new(entries),
            reject_writes: AtomicBool::new(false),
        }
    }

    /// Makes subsequent `set` calls fail, simulating a full or locked device.
    pub fn reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    pub async fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().await.get(key).cloned()
    }
}

#[async_trait]
impl KeyValueStorage for InMemoryStorage {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageError> {
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(format!(
                "writes to `{key}` are rejected"
            )));
        }
        self.entries.lock().await.insert(key.to_string(), value);
        Ok(())
    }
}
