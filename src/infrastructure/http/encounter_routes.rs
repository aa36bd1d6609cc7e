//! Encounter API routes
//!
//! Every mutating route answers with the whole encounter so the client can
//! redraw the roster, turn marker and derived statuses in one go.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::application::dto::{
    AddCombatantRequestDto, CharacterResponseDto, CombatantResponseDto, EncounterResponseDto,
    HpDeltaRequestDto, SetHpRequestDto, StartEncounterRequestDto, TemporaryHpRequestDto,
    UpdateCombatantRequestDto,
};
use crate::application::services::{EncounterService, HpTarget};
use crate::domain::aggregates::Encounter;
use crate::domain::value_objects::Condition;
use crate::infrastructure::http::{parse_campaign_id, parse_combatant_id, to_http_error};
use crate::infrastructure::state::AppState;

type EncounterResult = Result<Json<EncounterResponseDto>, (StatusCode, String)>;

fn respond(encounter: &Encounter) -> Json<EncounterResponseDto> {
    Json(EncounterResponseDto::from(encounter))
}

fn parse_condition(tag: &str) -> Result<Condition, (StatusCode, String)> {
    tag.parse()
        .map_err(|e: crate::domain::value_objects::UnknownCondition| {
            (StatusCode::BAD_REQUEST, e.to_string())
        })
}

/// Get the campaign's current encounter
pub async fn get_encounter(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> EncounterResult {
    let campaign_id = parse_campaign_id(&id)?;
    let encounter = state
        .encounter_service
        .get(campaign_id)
        .await
        .map_err(to_http_error)?;
    Ok(respond(&encounter))
}

/// Start a fresh encounter; the body may be empty or name an HP floor
pub async fn start_encounter(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: String,
) -> Result<(StatusCode, Json<EncounterResponseDto>), (StatusCode, String)> {
    let campaign_id = parse_campaign_id(&id)?;
    let req: StartEncounterRequestDto = if body.trim().is_empty() {
        StartEncounterRequestDto::default()
    } else {
        serde_json::from_str(&body)
            .map_err(|e| (StatusCode::BAD_REQUEST, format!("Invalid request: {}", e)))?
    };

    let encounter = state
        .encounter_service
        .start(campaign_id, req.hp_floor)
        .await
        .map_err(to_http_error)?;
    Ok((StatusCode::CREATED, respond(&encounter)))
}

pub async fn end_encounter(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    let campaign_id = parse_campaign_id(&id)?;
    state
        .encounter_service
        .end(campaign_id)
        .await
        .map_err(to_http_error)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Move the turn marker to the next combatant
pub async fn next_turn(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> EncounterResult {
    let campaign_id = parse_campaign_id(&id)?;
    let encounter = state
        .encounter_service
        .advance_turn(campaign_id)
        .await
        .map_err(to_http_error)?;
    Ok(respond(&encounter))
}

#[derive(Debug, Serialize)]
pub struct LinkedCombatantResponseDto {
    pub combatant: CombatantResponseDto,
    pub template: Option<CharacterResponseDto>,
}

/// Combatants with their source templates; orphaned ones are left out
pub async fn linked_roster(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<LinkedCombatantResponseDto>>, (StatusCode, String)> {
    let campaign_id = parse_campaign_id(&id)?;
    let (encounter, roster) = state
        .encounter_service
        .linked_roster(campaign_id)
        .await
        .map_err(to_http_error)?;

    Ok(Json(
        roster
            .into_iter()
            .map(|linked| LinkedCombatantResponseDto {
                combatant: CombatantResponseDto::from_combatant(&encounter, &linked.combatant),
                template: linked.template.map(CharacterResponseDto::from),
            })
            .collect(),
    ))
}

/// Add a combatant from a template or as a custom entry
pub async fn add_combatant(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<AddCombatantRequestDto>,
) -> Result<(StatusCode, Json<EncounterResponseDto>), (StatusCode, String)> {
    let campaign_id = parse_campaign_id(&id)?;
    let (encounter, _) = state
        .encounter_service
        .add_combatant(campaign_id, req)
        .await
        .map_err(to_http_error)?;
    Ok((StatusCode::CREATED, respond(&encounter)))
}

pub async fn update_combatant(
    State(state): State<Arc<AppState>>,
    Path((id, combatant_id)): Path<(String, String)>,
    Json(req): Json<UpdateCombatantRequestDto>,
) -> EncounterResult {
    let campaign_id = parse_campaign_id(&id)?;
    let combatant_id = parse_combatant_id(&combatant_id)?;
    let patch = req
        .into_patch()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let encounter = state
        .encounter_service
        .update_combatant(campaign_id, combatant_id, patch)
        .await
        .map_err(to_http_error)?;
    Ok(respond(&encounter))
}

pub async fn remove_combatant(
    State(state): State<Arc<AppState>>,
    Path((id, combatant_id)): Path<(String, String)>,
) -> EncounterResult {
    let campaign_id = parse_campaign_id(&id)?;
    let combatant_id = parse_combatant_id(&combatant_id)?;
    let encounter = state
        .encounter_service
        .remove_combatant(campaign_id, combatant_id)
        .await
        .map_err(to_http_error)?;
    Ok(respond(&encounter))
}

/// Damage (negative) or heal (positive)
pub async fn apply_hp_delta(
    State(state): State<Arc<AppState>>,
    Path((id, combatant_id)): Path<(String, String)>,
    Json(req): Json<HpDeltaRequestDto>,
) -> EncounterResult {
    let campaign_id = parse_campaign_id(&id)?;
    let combatant_id = parse_combatant_id(&combatant_id)?;
    let encounter = state
        .encounter_service
        .apply_delta(campaign_id, combatant_id, req.amount.unwrap_or(0))
        .await
        .map_err(to_http_error)?;
    Ok(respond(&encounter))
}

/// Set current HP to a value or a full / half / zero shortcut
pub async fn set_hp(
    State(state): State<Arc<AppState>>,
    Path((id, combatant_id)): Path<(String, String)>,
    Json(req): Json<SetHpRequestDto>,
) -> EncounterResult {
    let campaign_id = parse_campaign_id(&id)?;
    let combatant_id = parse_combatant_id(&combatant_id)?;
    let target = match req.shortcut {
        Some(shortcut) => HpTarget::Shortcut(shortcut),
        None => HpTarget::Value(req.value.unwrap_or(0)),
    };

    let encounter = state
        .encounter_service
        .set_hp(campaign_id, combatant_id, target)
        .await
        .map_err(to_http_error)?;
    Ok(respond(&encounter))
}

pub async fn set_temporary_hp(
    State(state): State<Arc<AppState>>,
    Path((id, combatant_id)): Path<(String, String)>,
    Json(req): Json<TemporaryHpRequestDto>,
) -> EncounterResult {
    let campaign_id = parse_campaign_id(&id)?;
    let combatant_id = parse_combatant_id(&combatant_id)?;
    let encounter = state
        .encounter_service
        .set_temporary_hp(campaign_id, combatant_id, req.value.unwrap_or(0))
        .await
        .map_err(to_http_error)?;
    Ok(respond(&encounter))
}

pub async fn add_condition(
    State(state): State<Arc<AppState>>,
    Path((id, combatant_id, tag)): Path<(String, String, String)>,
) -> EncounterResult {
    let campaign_id = parse_campaign_id(&id)?;
    let combatant_id = parse_combatant_id(&combatant_id)?;
    let condition = parse_condition(&tag)?;

    let encounter = state
        .encounter_service
        .add_condition(campaign_id, combatant_id, condition)
        .await
        .map_err(to_http_error)?;
    Ok(respond(&encounter))
}

pub async fn remove_condition(
    State(state): State<Arc<AppState>>,
    Path((id, combatant_id, tag)): Path<(String, String, String)>,
) -> EncounterResult {
    let campaign_id = parse_campaign_id(&id)?;
    let combatant_id = parse_combatant_id(&combatant_id)?;
    let condition = parse_condition(&tag)?;

    let encounter = state
        .encounter_service
        .remove_condition(campaign_id, combatant_id, condition)
        .await
        .map_err(to_http_error)?;
    Ok(respond(&encounter))
}

/// The condition catalog
pub async fn list_conditions() -> Json<Vec<String>> {
    Json(Condition::catalog().iter().map(Condition::name).collect())
}
