//! Campaign API routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::application::dto::{CampaignResponseDto, CreateCampaignRequestDto};
use crate::application::services::DirectoryService;
use crate::infrastructure::http::{parse_campaign_id, to_http_error};
use crate::infrastructure::state::AppState;

pub async fn list_campaigns(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CampaignResponseDto>>, (StatusCode, String)> {
    let campaigns = state
        .directory_service
        .list_campaigns()
        .await
        .map_err(to_http_error)?;

    Ok(Json(campaigns.into_iter().map(CampaignResponseDto::from).collect()))
}

pub async fn create_campaign(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateCampaignRequestDto>,
) -> Result<(StatusCode, Json<CampaignResponseDto>), (StatusCode, String)> {
    let campaign = state
        .directory_service
        .create_campaign(&req.name)
        .await
        .map_err(to_http_error)?;

    Ok((StatusCode::CREATED, Json(CampaignResponseDto::from(campaign))))
}

/// Delete a campaign and its encounter
pub async fn delete_campaign(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    let id = parse_campaign_id(&id)?;

    state
        .directory_service
        .delete_campaign(id)
        .await
        .map_err(to_http_error)?;

    Ok(StatusCode::NO_CONTENT)
}
