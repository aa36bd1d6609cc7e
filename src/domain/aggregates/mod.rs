//! Aggregates - Cluster of domain objects treated as a single unit

pub mod encounter;

pub use encounter::{Encounter, EncounterError};
