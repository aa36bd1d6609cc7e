//! Value objects - Immutable objects defined by their attributes

mod condition;
mod dice;
mod hp_floor;
mod ids;
mod settings;

pub use condition::{Condition, UnknownCondition};
pub use dice::{roll_d20, DiceError, DiceRoll, DICE_TYPES};
pub use hp_floor::HpFloor;
pub use ids::*;
pub use settings::TrackerSettings;
