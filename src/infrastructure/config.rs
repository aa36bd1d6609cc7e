//! Application configuration
//!
//! Built-in defaults overlaid with `BATTLEKEEP_*` environment variables.
//! Nested keys use a double underscore, e.g. `BATTLEKEEP_STORAGE__BACKEND=sqlite`
//! or `BATTLEKEEP_TRACKER__DEFAULT_HP_FLOOR=zero`.

use anyhow::{Context, Result};
use config::{Config, Environment, Map};
use serde::Deserialize;

use crate::domain::value_objects::TrackerSettings;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP server port
    pub server_port: u16,
    pub storage: StorageConfig,
    #[serde(default)]
    pub tracker: TrackerSettings,
    pub monster_catalog: MonsterCatalogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// "memory" or "sqlite"
    pub backend: String,
    pub sqlite_path: String,
    /// Prefix for every stored key
    pub namespace: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonsterCatalogConfig {
    /// Endpoint returning a JSON list of stat blocks; unset disables the catalog
    #[serde(default)]
    pub url: Option<String>,
    pub timeout_secs: u64,
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// Load configuration from an explicit variable map instead of the environment
    pub fn from_map(vars: Map<String, String>) -> Result<Self> {
        Self::load(Some(vars))
    }

    fn load(vars: Option<Map<String, String>>) -> Result<Self> {
        let environment = Environment::with_prefix("BATTLEKEEP")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .source(vars);

        Config::builder()
            .set_default("server_port", 3000)?
            .set_default("storage.backend", "memory")?
            .set_default("storage.sqlite_path", "./data/battlekeep.db")?
            .set_default("storage.namespace", "dnd")?
            .set_default("monster_catalog.timeout_secs", 10)?
            .add_source(environment)
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }
}
