//! Monster catalog API routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use crate::application::dto::CharacterResponseDto;
use crate::application::ports::outbound::MonsterStatBlock;
use crate::application::services::{CatalogSnapshot, DirectoryService};
use crate::infrastructure::http::to_http_error;
use crate::infrastructure::state::AppState;

#[derive(Debug, Serialize)]
pub struct MonsterCatalogResponseDto {
    pub monsters: Vec<MonsterStatBlock>,
    /// Shown inline; a failed fetch is not an HTTP error
    pub error: Option<String>,
}

impl From<CatalogSnapshot> for MonsterCatalogResponseDto {
    fn from(snapshot: CatalogSnapshot) -> Self {
        Self {
            monsters: snapshot.monsters,
            error: snapshot.error,
        }
    }
}

/// Cached catalog; fetched on first use
pub async fn list_monsters(State(state): State<Arc<AppState>>) -> Json<MonsterCatalogResponseDto> {
    let catalog = &state.monster_catalog_service;
    let mut snapshot = catalog.snapshot().await;
    if snapshot.monsters.is_empty() && snapshot.error.is_none() {
        snapshot = catalog.refresh().await;
    }
    Json(snapshot.into())
}

pub async fn refresh_monsters(
    State(state): State<Arc<AppState>>,
) -> Json<MonsterCatalogResponseDto> {
    Json(state.monster_catalog_service.refresh().await.into())
}

/// Copy a cached monster into the character directory
pub async fn create_template_from_monster(
    State(state): State<Arc<AppState>>,
    Path(index): Path<String>,
) -> Result<(StatusCode, Json<CharacterResponseDto>), (StatusCode, String)> {
    let index: usize = index
        .trim()
        .parse()
        .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid monster index".to_string()))?;

    let template = state
        .monster_catalog_service
        .to_template(index)
        .await
        .map_err(to_http_error)?;
    let stored = state
        .directory_service
        .import_characters(vec![template])
        .await
        .map_err(to_http_error)?;
    let created = stored
        .into_iter()
        .next()
        .ok_or_else(|| (StatusCode::INTERNAL_SERVER_ERROR, "Template was not stored".to_string()))?;

    Ok((StatusCode::CREATED, Json(CharacterResponseDto::from(created))))
}
