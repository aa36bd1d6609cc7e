//! Domain services - Pure combat rules with no I/O

pub mod condition_registry;
pub mod health_ledger;
pub mod initiative;

pub use health_ledger::{HealthStatus, HpShortcut};
