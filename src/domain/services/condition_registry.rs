//! Condition registry - attaching and detaching status effects
//!
//! The condition set and current HP are stored independently, so the
//! maximal-fatigue rule is re-applied by `enforce_invariants` after every
//! mutation and whenever an encounter is loaded.

use crate::domain::entities::Combatant;
use crate::domain::value_objects::{Condition, HpFloor};

/// Attach a condition; adding one that is already present changes nothing
pub fn add_condition(combatant: &mut Combatant, condition: Condition, floor: HpFloor) {
    if !combatant.has_condition(condition) {
        combatant.conditions.push(condition);
    }
    enforce_invariants(combatant, floor);
}

/// Detach a condition if present
pub fn remove_condition(combatant: &mut Combatant, condition: Condition) -> bool {
    let before = combatant.conditions.len();
    combatant.conditions.retain(|c| *c != condition);
    combatant.conditions.len() != before
}

/// Restore every combatant invariant
///
/// - `max_hp >= 1`
/// - `current_hp` within `[lower_bound, max_hp]`
/// - `temporary_hp >= 0`
/// - no duplicate condition tags
/// - maximal fatigue pins `current_hp` to the lower bound
pub fn enforce_invariants(combatant: &mut Combatant, floor: HpFloor) {
    combatant.max_hp = combatant.max_hp.max(1);
    combatant.current_hp = floor.clamp(combatant.current_hp, combatant.max_hp);
    combatant.temporary_hp = combatant.temporary_hp.max(0);

    let mut seen = Vec::with_capacity(combatant.conditions.len());
    combatant.conditions.retain(|c| {
        if seen.contains(c) {
            false
        } else {
            seen.push(*c);
            true
        }
    });

    if combatant.is_maximally_fatigued() {
        combatant.current_hp = floor.lower_bound(combatant.max_hp);
    }
}
