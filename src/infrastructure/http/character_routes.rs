//! Character directory API routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::application::dto::{
    CharacterResponseDto, CreateCharacterRequestDto, UpdateCharacterRequestDto,
};
use crate::application::services::DirectoryService;
use crate::infrastructure::http::{parse_character_id, to_http_error};
use crate::infrastructure::state::AppState;

/// List all character templates
pub async fn list_characters(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CharacterResponseDto>>, (StatusCode, String)> {
    let characters = state
        .directory_service
        .list_characters()
        .await
        .map_err(to_http_error)?;

    Ok(Json(characters.into_iter().map(CharacterResponseDto::from).collect()))
}

/// Create a character template
pub async fn create_character(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateCharacterRequestDto>,
) -> Result<(StatusCode, Json<CharacterResponseDto>), (StatusCode, String)> {
    let character = state
        .directory_service
        .create_character(req)
        .await
        .map_err(to_http_error)?;

    Ok((StatusCode::CREATED, Json(CharacterResponseDto::from(character))))
}

/// Get a character template by ID
pub async fn get_character(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<CharacterResponseDto>, (StatusCode, String)> {
    let id = parse_character_id(&id)?;

    let character = state
        .directory_service
        .get_character(id)
        .await
        .map_err(to_http_error)?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Character not found".to_string()))?;

    Ok(Json(CharacterResponseDto::from(character)))
}

/// Partially update a character template
pub async fn update_character(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateCharacterRequestDto>,
) -> Result<Json<CharacterResponseDto>, (StatusCode, String)> {
    let id = parse_character_id(&id)?;

    let character = state
        .directory_service
        .update_character(id, req)
        .await
        .map_err(to_http_error)?;

    Ok(Json(CharacterResponseDto::from(character)))
}

/// Delete a character template
pub async fn delete_character(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    let id = parse_character_id(&id)?;

    state
        .directory_service
        .delete_character(id)
        .await
        .map_err(to_http_error)?;

    Ok(StatusCode::NO_CONTENT)
}
