//! Character template entity - reusable sheets kept in the directory
//!
//! Templates live independently of any encounter. A combatant copies the
//! combat-relevant fields at add-time; later edits here never reach it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::CharacterId;

/// Which side of the screen a character belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharacterCategory {
    #[default]
    Player,
    Npc,
    Monster,
}

impl std::fmt::Display for CharacterCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CharacterCategory::Player => write!(f, "Player"),
            CharacterCategory::Npc => write!(f, "NPC"),
            CharacterCategory::Monster => write!(f, "Monster"),
        }
    }
}

impl std::str::FromStr for CharacterCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "player" | "pc" => Ok(CharacterCategory::Player),
            "npc" => Ok(CharacterCategory::Npc),
            "monster" => Ok(CharacterCategory::Monster),
            other => Err(format!("Unknown character category: {}", other)),
        }
    }
}

/// A reusable character or monster definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterTemplate {
    pub id: CharacterId,
    pub name: String,
    pub category: CharacterCategory,
    /// Always at least 1
    pub max_hp: i32,
    pub armor_class: i32,
    pub dexterity_modifier: i32,
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
    /// Full character-sheet data; never read by combat rules
    #[serde(default)]
    pub sheet: Option<ExtendedSheet>,
}

impl CharacterTemplate {
    pub fn new(name: impl Into<String>, category: CharacterCategory, max_hp: i32) -> Self {
        Self {
            id: CharacterId::new(),
            name: name.into(),
            category,
            max_hp: max_hp.max(1),
            armor_class: 10,
            dexterity_modifier: 0,
            level: None,
            notes: String::new(),
            created_at: Utc::now(),
            sheet: None,
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

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = Some(level);
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_sheet(mut self, sheet: ExtendedSheet) -> Self {
        self.sheet = Some(sheet);
        self
    }

    pub fn set_max_hp(&mut self, max_hp: i32) {
        self.max_hp = max_hp.max(1);
    }
}

/// The six ability scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityScores {
    pub strength: i32,
    pub dexterity: i32,
    pub constitution: i32,
    pub intelligence: i32,
    pub wisdom: i32,
    pub charisma: i32,
}

impl Default for AbilityScores {
    fn default() -> Self {
        Self {
            strength: 10,
            dexterity: 10,
            constitution: 10,
            intelligence: 10,
            wisdom: 10,
            charisma: 10,
        }
    }
}

impl AbilityScores {
    /// Standard modifier: floor((score - 10) / 2)
    pub fn modifier(score: i32) -> i32 {
        // Widened; the halved result always fits back into i32
        (i64::from(score) - 10).div_euclid(2) as i32
    }
}

/// A named skill with its total bonus
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillEntry {
    pub name: String,
    pub bonus: i32,
}

/// Optional full character-sheet fields
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExtendedSheet {
    #[serde(default)]
    pub abilities: AbilityScores,
    #[serde(default)]
    pub skills: Vec<SkillEntry>,
    #[serde(default)]
    pub equipment: Vec<String>,
    #[serde(default)]
    pub speed: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
}
