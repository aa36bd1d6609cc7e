//! Storage keys and JSON record helpers shared by the application services

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::application::ports::outbound::{KeyValueStorePort, StorageError};
use crate::domain::value_objects::CampaignId;

/// Key layout under a configurable namespace
#[derive(Debug, Clone)]
pub struct StorageKeys {
    namespace: String,
}

impl StorageKeys {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn characters(&self) -> String {
        format!("{}_characters", self.namespace)
    }

    pub fn campaigns(&self) -> String {
        format!("{}_campaigns", self.namespace)
    }

    pub fn battle(&self, campaign_id: CampaignId) -> String {
        format!("{}_battle_{}", self.namespace, campaign_id)
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self::new("dnd")
    }
}

/// Read and decode a JSON record; a missing key yields `None`
pub async fn load<T: DeserializeOwned>(
    store: &dyn KeyValueStorePort,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match store.get(key).await? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StorageError::Serialization(format!("{}: {}", key, e))),
        None => Ok(None),
    }
}

/// Read a JSON array record, treating a missing key as empty
pub async fn load_list<T: DeserializeOwned>(
    store: &dyn KeyValueStorePort,
    key: &str,
) -> Result<Vec<T>, StorageError> {
    Ok(load(store, key).await?.unwrap_or_default())
}

pub async fn save<T: Serialize + ?Sized>(
    store: &dyn KeyValueStorePort,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value)
        .map_err(|e| StorageError::Serialization(format!("{}: {}", key, e)))?;
    store.set(key, &raw).await
}
