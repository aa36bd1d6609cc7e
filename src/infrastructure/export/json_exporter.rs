//! JSON export and import of rosters and character lists
//!
//! Import is all-or-nothing: the whole payload is decoded before anything is
//! handed back, so a malformed file never causes a partial write.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::domain::entities::{CharacterTemplate, Combatant};

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Import payload is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("Import payload must be a JSON array")]
    NotAList,
    #[error("Import entry {index} is malformed: {message}")]
    MalformedEntry { index: usize, message: String },
}

/// Pretty-printed JSON arrays for download, and the matching import
pub struct JsonExporter;

impl JsonExporter {
    pub fn export_characters(characters: &[CharacterTemplate]) -> Result<String, serde_json::Error> {
        Self::export(characters)
    }

    pub fn export_combatants(combatants: &[Combatant]) -> Result<String, serde_json::Error> {
        Self::export(combatants)
    }

    pub fn import_characters(payload: &str) -> Result<Vec<CharacterTemplate>, ImportError> {
        Self::import(payload)
    }

    pub fn import_combatants(payload: &str) -> Result<Vec<Combatant>, ImportError> {
        Self::import(payload)
    }

    fn export<T: Serialize>(items: &[T]) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(items)
    }

    fn import<T: DeserializeOwned>(payload: &str) -> Result<Vec<T>, ImportError> {
        let value: Value =
            serde_json::from_str(payload).map_err(|e| ImportError::InvalidJson(e.to_string()))?;
        let Value::Array(entries) = value else {
            return Err(ImportError::NotAList);
        };

        entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                serde_json::from_value(entry).map_err(|e| ImportError::MalformedEntry {
                    index,
                    message: e.to_string(),
                })
            })
            .collect()
    }
}
