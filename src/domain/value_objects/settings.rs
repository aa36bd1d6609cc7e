//! Tracker settings value object
//!
//! Defaults substituted for blank or unparseable form input, plus the HP
//! floor used when an encounter is started without an explicit policy.

use serde::{Deserialize, Serialize};

use crate::domain::value_objects::HpFloor;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrackerSettings {
    pub default_max_hp: i32,
    pub default_armor_class: i32,
    pub default_dexterity_modifier: i32,
    pub default_hp_floor: HpFloor,
    pub max_name_length: usize,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            default_max_hp: 10,
            default_armor_class: 10,
            default_dexterity_modifier: 0,
            default_hp_floor: HpFloor::NegativeMax,
            max_name_length: 255,
        }
    }
}
