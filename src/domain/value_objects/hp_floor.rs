//! Hit-point floor policy
//!
//! Two rulesets exist for how far damage may push a combatant: a simple
//! "unconscious floor" at zero, and the detailed ladder where hit points
//! may drop to the negative of maximum HP before death.

use serde::{Deserialize, Serialize};

/// Lower bound applied when clamping current hit points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HpFloor {
    /// Current HP never drops below 0
    Zero,
    /// Current HP may drop to -max_hp, which is death
    #[default]
    NegativeMax,
}

impl HpFloor {
    /// The lowest value current HP may take for a combatant with `max_hp`
    pub fn lower_bound(self, max_hp: i32) -> i32 {
        match self {
            HpFloor::Zero => 0,
            HpFloor::NegativeMax => -max_hp,
        }
    }

    /// Clamp a raw HP value into `[lower_bound, max_hp]`
    pub fn clamp(self, value: i32, max_hp: i32) -> i32 {
        value.clamp(self.lower_bound(max_hp), max_hp)
    }
}

impl std::fmt::Display for HpFloor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HpFloor::Zero => write!(f, "zero"),
            HpFloor::NegativeMax => write!(f, "negative_max"),
        }
    }
}

impl std::str::FromStr for HpFloor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zero" | "0" | "a" => Ok(HpFloor::Zero),
            "negative_max" | "negative-max" | "b" => Ok(HpFloor::NegativeMax),
            other => Err(format!("Unknown HP floor policy: {}", other)),
        }
    }
}
