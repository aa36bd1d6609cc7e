//! Health ledger - hit-point arithmetic and status derivation
//!
//! Every write goes through the floor policy clamp and then re-applies the
//! condition invariants, so a fatigued combatant can never be healed back
//! above its lower bound without the tag being removed first.

use serde::{Deserialize, Serialize};

use crate::domain::entities::Combatant;
use crate::domain::services::condition_registry;
use crate::domain::value_objects::HpFloor;

/// Derived health status; computed on read, never stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Dead,
    Unconscious,
    Bloodied,
    Healthy,
}

impl std::fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthStatus::Dead => write!(f, "Dead"),
            HealthStatus::Unconscious => write!(f, "Unconscious"),
            HealthStatus::Bloodied => write!(f, "Bloodied"),
            HealthStatus::Healthy => write!(f, "Healthy"),
        }
    }
}

/// Quick-set targets for current HP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HpShortcut {
    Full,
    Half,
    Zero,
}

impl HpShortcut {
    pub fn value_for(self, max_hp: i32) -> i32 {
        match self {
            HpShortcut::Full => max_hp,
            HpShortcut::Half => max_hp / 2,
            HpShortcut::Zero => 0,
        }
    }
}

/// Heal (positive) or damage (negative) a combatant
pub fn apply_delta(combatant: &mut Combatant, amount: i32, floor: HpFloor) {
    let raw = combatant.current_hp.saturating_add(amount);
    combatant.current_hp = floor.clamp(raw, combatant.max_hp);
    condition_registry::enforce_invariants(combatant, floor);
}

/// Overwrite current HP, bypassing delta math
pub fn set_absolute(combatant: &mut Combatant, value: i32, floor: HpFloor) {
    combatant.current_hp = floor.clamp(value, combatant.max_hp);
    condition_registry::enforce_invariants(combatant, floor);
}

/// Replace temporary HP; negative input counts as zero
pub fn set_temporary_hp(combatant: &mut Combatant, value: i32) {
    combatant.temporary_hp = value.max(0);
}

/// Classify a combatant on the Dead / Unconscious / Bloodied / Healthy ladder
pub fn classify_status(combatant: &Combatant, floor: HpFloor) -> HealthStatus {
    let lower_bound = floor.lower_bound(combatant.max_hp);

    if combatant.is_maximally_fatigued() || (lower_bound < 0 && combatant.current_hp <= lower_bound)
    {
        HealthStatus::Dead
    } else if combatant.current_hp <= 0 {
        HealthStatus::Unconscious
    } else if combatant.current_hp <= combatant.max_hp / 2 {
        HealthStatus::Bloodied
    } else {
        HealthStatus::Healthy
    }
}

/// Health bar fill in percent, clamped to [0, 100]
///
/// Under the negative floor the bar spans the full `[-max_hp, max_hp]` range.
pub fn hp_percentage(combatant: &Combatant, floor: HpFloor) -> f64 {
    let max = f64::from(combatant.max_hp.max(1));
    let current = f64::from(combatant.current_hp);
    let pct = match floor {
        HpFloor::Zero => current / max * 100.0,
        HpFloor::NegativeMax => (current + max) / (2.0 * max) * 100.0,
    };
    pct.clamp(0.0, 100.0)
}
