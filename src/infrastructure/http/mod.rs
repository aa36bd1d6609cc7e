//! HTTP REST API routes

mod campaign_routes;
mod character_routes;
mod dice_routes;
mod encounter_routes;
mod export_routes;
mod monster_routes;

use axum::{
    http::StatusCode,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::services::ServiceError;
use crate::domain::aggregates::EncounterError;
use crate::domain::value_objects::{CampaignId, CharacterId, CombatantId};
use crate::infrastructure::export::ImportError;
use crate::infrastructure::state::AppState;

/// Create all API routes
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Character directory
        .route(
            "/api/characters",
            get(character_routes::list_characters).post(character_routes::create_character),
        )
        .route("/api/characters/export", get(export_routes::export_characters))
        .route("/api/characters/import", post(export_routes::import_characters))
        .route(
            "/api/characters/{id}",
            get(character_routes::get_character)
                .put(character_routes::update_character)
                .delete(character_routes::delete_character),
        )
        .route("/api/characters/{id}/sheet", get(export_routes::character_sheet))
        // Campaigns
        .route(
            "/api/campaigns",
            get(campaign_routes::list_campaigns).post(campaign_routes::create_campaign),
        )
        .route(
            "/api/campaigns/{id}",
            axum::routing::delete(campaign_routes::delete_campaign),
        )
        // Encounter
        .route(
            "/api/campaigns/{id}/encounter",
            get(encounter_routes::get_encounter)
                .post(encounter_routes::start_encounter)
                .delete(encounter_routes::end_encounter),
        )
        .route(
            "/api/campaigns/{id}/encounter/next-turn",
            post(encounter_routes::next_turn),
        )
        .route(
            "/api/campaigns/{id}/encounter/roster",
            get(encounter_routes::linked_roster),
        )
        .route(
            "/api/campaigns/{id}/encounter/export",
            get(export_routes::export_roster),
        )
        .route(
            "/api/campaigns/{id}/encounter/import",
            post(export_routes::import_roster),
        )
        .route(
            "/api/campaigns/{id}/encounter/combatants",
            post(encounter_routes::add_combatant),
        )
        .route(
            "/api/campaigns/{id}/encounter/combatants/{combatant_id}",
            put(encounter_routes::update_combatant).delete(encounter_routes::remove_combatant),
        )
        .route(
            "/api/campaigns/{id}/encounter/combatants/{combatant_id}/hp",
            post(encounter_routes::apply_hp_delta).put(encounter_routes::set_hp),
        )
        .route(
            "/api/campaigns/{id}/encounter/combatants/{combatant_id}/temp-hp",
            put(encounter_routes::set_temporary_hp),
        )
        .route(
            "/api/campaigns/{id}/encounter/combatants/{combatant_id}/conditions/{tag}",
            post(encounter_routes::add_condition).delete(encounter_routes::remove_condition),
        )
        .route("/api/conditions", get(encounter_routes::list_conditions))
        // Monster catalog
        .route("/api/monsters", get(monster_routes::list_monsters))
        .route("/api/monsters/refresh", post(monster_routes::refresh_monsters))
        .route(
            "/api/monsters/{index}/template",
            post(monster_routes::create_template_from_monster),
        )
        // Dice
        .route("/api/dice/roll", post(dice_routes::roll_dice))
}

/// Map a service failure onto a status code and message
pub(crate) fn to_http_error(error: anyhow::Error) -> (StatusCode, String) {
    if let Some(service_error) = error.downcast_ref::<ServiceError>() {
        return match service_error {
            ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, service_error.to_string()),
            ServiceError::Validation(_) => (StatusCode::BAD_REQUEST, service_error.to_string()),
        };
    }
    if let Some(encounter_error) = error.downcast_ref::<EncounterError>() {
        return (StatusCode::NOT_FOUND, encounter_error.to_string());
    }
    if let Some(import_error) = error.downcast_ref::<ImportError>() {
        return (StatusCode::BAD_REQUEST, import_error.to_string());
    }

    tracing::error!("Request failed: {:#}", error);
    (StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", error))
}

fn parse_uuid(raw: &str, what: &str) -> Result<Uuid, (StatusCode, String)> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| (StatusCode::BAD_REQUEST, format!("Invalid {} ID", what)))
}

pub(crate) fn parse_campaign_id(raw: &str) -> Result<CampaignId, (StatusCode, String)> {
    parse_uuid(raw, "campaign").map(CampaignId::from_uuid)
}

pub(crate) fn parse_character_id(raw: &str) -> Result<CharacterId, (StatusCode, String)> {
    parse_uuid(raw, "character").map(CharacterId::from_uuid)
}

pub(crate) fn parse_combatant_id(raw: &str) -> Result<CombatantId, (StatusCode, String)> {
    parse_uuid(raw, "combatant").map(CombatantId::from_uuid)
}
