//! Export and import of tracker data
//!
//! - [`JsonExporter`]: JSON arrays of combatants or character templates
//! - [`render_character_sheet`]: a plain-text sheet for printing

mod json_exporter;
mod sheet_text;

pub use json_exporter::{ImportError, JsonExporter};
pub use sheet_text::render_character_sheet;
