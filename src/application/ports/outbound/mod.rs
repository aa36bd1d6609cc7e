//! Outbound ports - Interfaces that the application requires from external systems

mod monster_catalog_port;
mod storage_port;

pub use monster_catalog_port::{CatalogError, MonsterCatalogPort, MonsterStatBlock};
pub use storage_port::{KeyValueStorePort, StorageError};

#[cfg(test)]
pub use monster_catalog_port::MockMonsterCatalogPort;
#[cfg(test)]
pub use storage_port::MockKeyValueStorePort;
