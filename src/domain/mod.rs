//! Domain layer - Core combat rules with no external I/O
//!
//! This layer contains:
//! - Entities: CharacterTemplate, Campaign, Combatant
//! - Value Objects: ids, HP floor policy, condition catalog, dice
//! - Aggregates: Encounter aggregate root (roster, turn order, round)
//! - Domain Services: health ledger, condition registry, initiative rolls

pub mod aggregates;
pub mod entities;
pub mod services;
pub mod value_objects;
