//! Application services - Use case implementations
//!
//! Each service is handed its outbound ports at construction and returns
//! domain types; routes turn those into DTOs.

pub mod directory_service;
pub mod encounter_service;
pub mod monster_catalog_service;
pub mod records;
mod service_error;

pub use directory_service::{DirectoryService, DirectoryServiceImpl};
pub use encounter_service::{EncounterService, EncounterServiceImpl, HpTarget, LinkedCombatant};
pub use monster_catalog_service::{CatalogSnapshot, MonsterCatalogService};
pub use records::StorageKeys;
pub use service_error::ServiceError;
