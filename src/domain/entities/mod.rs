//! Domain entities - Core business objects with identity

mod campaign;
mod character;
mod combatant;

pub use campaign::Campaign;
pub use character::{AbilityScores, CharacterCategory, CharacterTemplate, ExtendedSheet, SkillEntry};
pub use combatant::{Combatant, CombatantPatch};
