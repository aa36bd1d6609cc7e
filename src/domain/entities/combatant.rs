//! Combatant entity - an encounter-scoped participant
//!
//! Name and stats are copied from the template when the combatant joins
//! the fight. The copy is never live-linked back to the directory.

use serde::{Deserialize, Serialize};

use crate::domain::entities::{CharacterCategory, CharacterTemplate};
use crate::domain::value_objects::{CharacterId, CombatantId, Condition};

/// A participant in the current encounter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub id: CombatantId,
    /// Template this combatant was created from, if any
    #[serde(default)]
    pub template_id: Option<CharacterId>,
    pub name: String,
    pub category: CharacterCategory,
    pub max_hp: i32,
    pub current_hp: i32,
    /// Display-only buffer; not absorbed automatically
    #[serde(default)]
    pub temporary_hp: i32,
    pub armor_class: i32,
    pub dexterity_modifier: i32,
    pub initiative: i32,
    #[serde(default)]
    pub conditions: Vec<Condition>,
}

impl Combatant {
    /// Create an ad-hoc combatant at full health
    pub fn new(
        name: impl Into<String>,
        category: CharacterCategory,
        max_hp: i32,
        initiative: i32,
    ) -> Self {
        let max_hp = max_hp.max(1);
        Self {
            id: CombatantId::new(),
            template_id: None,
            name: name.into(),
            category,
            max_hp,
            current_hp: max_hp,
            temporary_hp: 0,
            armor_class: 10,
            dexterity_modifier: 0,
            initiative,
            conditions: Vec::new(),
        }
    }

    /// Instantiate a template with a fresh combatant id
    pub fn from_template(template: &CharacterTemplate, initiative: i32) -> Self {
        Self {
            template_id: Some(template.id),
            armor_class: template.armor_class,
            dexterity_modifier: template.dexterity_modifier,
            ..Self::new(template.name.clone(), template.category, template.max_hp, initiative)
        }
    }

    pub fn with_armor_class(mut self, armor_class: i32) -> Self {
        self.armor_class = armor_class;
        self
    }

    pub fn with_dexterity_modifier(mut self, modifier: i32) -> Self {
        self.dexterity_modifier = modifier;
        self
    }

    pub fn has_condition(&self, condition: Condition) -> bool {
        self.conditions.contains(&condition)
    }

    pub fn is_maximally_fatigued(&self) -> bool {
        self.conditions.iter().any(Condition::is_maximal_fatigue)
    }

    /// Merge a partial update into this combatant
    ///
    /// Does not clamp; callers re-normalize afterwards.
    pub fn apply_patch(&mut self, patch: CombatantPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(max_hp) = patch.max_hp {
            self.max_hp = max_hp.max(1);
        }
        if let Some(current_hp) = patch.current_hp {
            self.current_hp = current_hp;
        }
        if let Some(temporary_hp) = patch.temporary_hp {
            self.temporary_hp = temporary_hp;
        }
        if let Some(armor_class) = patch.armor_class {
            self.armor_class = armor_class;
        }
        if let Some(modifier) = patch.dexterity_modifier {
            self.dexterity_modifier = modifier;
        }
        if let Some(initiative) = patch.initiative {
            self.initiative = initiative;
        }
        if let Some(conditions) = patch.conditions {
            self.conditions = conditions;
        }
    }
}

/// Partial update for a combatant; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombatantPatch {
    pub name: Option<String>,
    pub max_hp: Option<i32>,
    pub current_hp: Option<i32>,
    pub temporary_hp: Option<i32>,
    pub armor_class: Option<i32>,
    pub dexterity_modifier: Option<i32>,
    pub initiative: Option<i32>,
    pub conditions: Option<Vec<Condition>>,
}
