use serde::{Deserialize, Serialize};

use crate::application::dto::lenient;
use crate::domain::entities::{Campaign, CharacterCategory, CharacterTemplate, ExtendedSheet};

/// Character form as submitted by the client
///
/// Numeric fields accept numbers or numeric strings; junk falls back to
/// the tracker defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateCharacterRequestDto {
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "type")]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub max_hp: Option<i32>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub armor_class: Option<i32>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub dexterity_modifier: Option<i32>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub level: Option<i32>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub sheet: Option<ExtendedSheet>,
}

/// Partial character edit; absent fields are left as they are
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCharacterRequestDto {
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
    pub level: Option<i32>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub sheet: Option<ExtendedSheet>,
}

/// Parse a category name, defaulting to player for anything unknown
pub fn parse_category(raw: Option<&str>) -> CharacterCategory {
    raw.and_then(|s| s.parse().ok()).unwrap_or_default()
}

/// Levels below 1 mean "no level"
pub fn parse_level(raw: Option<i32>) -> Option<u32> {
    raw.filter(|level| *level > 0).map(|level| level as u32)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterResponseDto {
    pub id: String,
    pub name: String,
    pub category: CharacterCategory,
    pub max_hp: i32,
    pub armor_class: i32,
    pub dexterity_modifier: i32,
    pub level: Option<u32>,
    pub notes: String,
    pub created_at: String,
    pub sheet: Option<ExtendedSheet>,
}

impl From<CharacterTemplate> for CharacterResponseDto {
    fn from(template: CharacterTemplate) -> Self {
        Self {
            id: template.id.to_string(),
            name: template.name,
            category: template.category,
            max_hp: template.max_hp,
            armor_class: template.armor_class,
            dexterity_modifier: template.dexterity_modifier,
            level: template.level,
            notes: template.notes,
            created_at: template.created_at.to_rfc3339(),
            sheet: template.sheet,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCampaignRequestDto {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignResponseDto {
    pub id: String,
    pub name: String,
    pub created_at: String,
}

impl From<Campaign> for CampaignResponseDto {
    fn from(campaign: Campaign) -> Self {
        Self {
            id: campaign.id.to_string(),
            name: campaign.name,
            created_at: campaign.created_at.to_rfc3339(),
        }
    }
}
