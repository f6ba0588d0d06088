//! Key/value storage backend trait and error types.
//!
//! The city list only needs `get`/`set` on string keys; this trait keeps it
//! independent of where those strings live (SQLite on disk, memory in tests).

use citycast_core::error::RusqliteErrorExt;
use citycast_core::StorageError;
use parking_lot::Mutex;
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during key/value backend operations.
#[derive(Debug, Error)]
pub enum KvBackendError {
    /// Storage error (database open, read or write).
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Generic error wrapper.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl KvBackendError {
    /// A failed write with the given cause
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(StorageError::WriteFailed(message.into()))
    }
}

impl From<rusqlite::Error> for KvBackendError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Storage(e.into_storage_error())
    }
}

/// Result type for key/value backend operations.
pub type KvBackendResult<T> = Result<T, KvBackendError>;

/// Trait for durable string key/value storage.
pub trait KvBackend: Send + Sync {
    /// Read the value stored under `key`, `None` if absent.
    fn get(&self, key: &str) -> KvBackendResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> KvBackendResult<()>;
}

/// In-memory backend for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with one value
    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::new();
        store.values.lock().insert(key.to_string(), value.to_string());
        store
    }
}

impl KvBackend for MemoryKvStore {
    fn get(&self, key: &str) -> KvBackendResult<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> KvBackendResult<()> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }
}
