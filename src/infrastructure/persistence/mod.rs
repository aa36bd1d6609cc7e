//! Key-value persistence adapters
//!
//! Both backends implement `KeyValueStorePort`; `KeyValueBackend` selects one
//! at startup from the storage configuration.

mod memory_store;
mod sqlite_store;

pub use memory_store::InMemoryKeyValueStore;
pub use sqlite_store::SqliteKeyValueStore;

use anyhow::Result;
use async_trait::async_trait;

use crate::application::ports::outbound::{KeyValueStorePort, StorageError};
use crate::infrastructure::config::StorageConfig;

/// Runtime-selected storage backend
#[derive(Clone)]
pub enum KeyValueBackend {
    Memory(InMemoryKeyValueStore),
    Sqlite(SqliteKeyValueStore),
}

impl KeyValueBackend {
    pub async fn from_config(config: &StorageConfig) -> Result<Self> {
        match config.backend.as_str() {
            "memory" => Ok(Self::Memory(InMemoryKeyValueStore::new())),
            "sqlite" => Ok(Self::Sqlite(
                SqliteKeyValueStore::open(&config.sqlite_path).await?,
            )),
            backend => anyhow::bail!("Unsupported storage backend: {}", backend),
        }
    }
}

#[async_trait]
impl KeyValueStorePort for KeyValueBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self {
            KeyValueBackend::Memory(s) => s.get(key).await,
            KeyValueBackend::Sqlite(s) => s.get(key).await,
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        match self {
            KeyValueBackend::Memory(s) => s.set(key, value).await,
            KeyValueBackend::Sqlite(s) => s.set(key, value).await,
        }
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        match self {
            KeyValueBackend::Memory(s) => s.remove(key).await,
            KeyValueBackend::Sqlite(s) => s.remove(key).await,
        }
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        match self {
            KeyValueBackend::Memory(s) => s.keys_with_prefix(prefix).await,
            KeyValueBackend::Sqlite(s) => s.keys_with_prefix(prefix).await,
        }
    }
}
