//! Remote monster catalog port
//!
//! A read-only, optional source of monster stat blocks. Failures are
//! expected and degrade to "no remote monsters available".

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::application::dto::lenient;

/// A monster stat block as published by the remote catalog
///
/// Numeric fields are parsed leniently; anything missing or malformed is
/// left empty and replaced by tracker defaults when turned into a template.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MonsterStatBlock {
    pub name: String,
    #[serde(default, deserialize_with = "lenient::int")]
    pub hit_points: Option<i32>,
    #[serde(default, deserialize_with = "lenient::armor_class")]
    pub armor_class: Option<i32>,
    #[serde(default, deserialize_with = "lenient::int")]
    pub dexterity: Option<i32>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub size: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "lenient::text")]
    pub creature_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::text")]
    pub challenge_rating: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Catalog is not configured")]
    NotConfigured,
    #[error("HTTP request failed: {0}")]
    Http(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("Malformed catalog payload: {0}")]
    Payload(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MonsterCatalogPort: Send + Sync {
    async fn fetch_monsters(&self) -> Result<Vec<MonsterStatBlock>, CatalogError>;
}
