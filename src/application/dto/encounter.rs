use serde::{Deserialize, Serialize};

use crate::application::dto::lenient;
use crate::domain::aggregates::Encounter;
use crate::domain::entities::{CharacterCategory, Combatant, CombatantPatch};
use crate::domain::services::{HealthStatus, HpShortcut};
use crate::domain::value_objects::{Condition, HpFloor, UnknownCondition};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartEncounterRequestDto {
    #[serde(default)]
    pub hp_floor: Option<HpFloor>,
}

/// Add a combatant either from a directory template or as a custom entry
///
/// A blank or unparseable `initiative` means "roll for it".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddCombatantRequestDto {
    #[serde(default)]
    pub template_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "type")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub max_hp: Option<i32>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub armor_class: Option<i32>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub dexterity_modifier: Option<i32>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub initiative: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCombatantRequestDto {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub max_hp: Option<i32>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub current_hp: Option<i32>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub temporary_hp: Option<i32>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub armor_class: Option<i32>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub dexterity_modifier: Option<i32>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub initiative: Option<i32>,
    #[serde(default)]
    pub conditions: Option<Vec<String>>,
}

impl UpdateCombatantRequestDto {
    /// Convert to a domain patch; unknown condition names are rejected
    pub fn into_patch(self) -> Result<CombatantPatch, UnknownCondition> {
        let conditions = self
            .conditions
            .map(|names| {
                names
                    .iter()
                    .map(|name| name.parse::<Condition>())
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;

        Ok(CombatantPatch {
            name: self.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            max_hp: self.max_hp,
            current_hp: self.current_hp,
            temporary_hp: self.temporary_hp,
            armor_class: self.armor_class,
            dexterity_modifier: self.dexterity_modifier,
            initiative: self.initiative,
            conditions,
        })
    }
}

/// Damage is a negative amount, healing a positive one
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HpDeltaRequestDto {
    #[serde(default, deserialize_with = "lenient::int")]
    pub amount: Option<i32>,
}

/// Either an explicit value or one of the full / half / zero shortcuts
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetHpRequestDto {
    #[serde(default, deserialize_with = "lenient::int")]
    pub value: Option<i32>,
    #[serde(default)]
    pub shortcut: Option<HpShortcut>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemporaryHpRequestDto {
    #[serde(default, deserialize_with = "lenient::int")]
    pub value: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombatantResponseDto {
    pub id: String,
    pub template_id: Option<String>,
    pub name: String,
    pub category: CharacterCategory,
    pub max_hp: i32,
    pub current_hp: i32,
    pub temporary_hp: i32,
    pub armor_class: i32,
    pub dexterity_modifier: i32,
    pub initiative: i32,
    pub conditions: Vec<Condition>,
    pub status: HealthStatus,
    pub hp_percent: f64,
    pub is_current_turn: bool,
}

impl CombatantResponseDto {
    pub fn from_combatant(encounter: &Encounter, combatant: &Combatant) -> Self {
        Self {
            id: combatant.id.to_string(),
            template_id: combatant.template_id.map(|id| id.to_string()),
            name: combatant.name.clone(),
            category: combatant.category,
            max_hp: combatant.max_hp,
            current_hp: combatant.current_hp,
            temporary_hp: combatant.temporary_hp,
            armor_class: combatant.armor_class,
            dexterity_modifier: combatant.dexterity_modifier,
            initiative: combatant.initiative,
            conditions: combatant.conditions.clone(),
            status: encounter.status_of(combatant),
            hp_percent: encounter.hp_percentage_of(combatant),
            is_current_turn: encounter.current_turn() == Some(combatant.id),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncounterResponseDto {
    pub campaign_id: String,
    pub is_active: bool,
    pub hp_floor: HpFloor,
    pub round: u32,
    pub current_turn: Option<String>,
    pub combatants: Vec<CombatantResponseDto>,
}

impl From<&Encounter> for EncounterResponseDto {
    fn from(encounter: &Encounter) -> Self {
        Self {
            campaign_id: encounter.campaign_id().to_string(),
            is_active: encounter.is_active(),
            hp_floor: encounter.hp_floor(),
            round: encounter.round(),
            current_turn: encounter.current_combatant().map(|c| c.id.to_string()),
            combatants: encounter
                .combatants()
                .iter()
                .map(|c| CombatantResponseDto::from_combatant(encounter, c))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiceRollRequestDto {
    #[serde(default, deserialize_with = "lenient::int")]
    pub count: Option<i32>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub sides: Option<i32>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub modifier: Option<i32>,
}
