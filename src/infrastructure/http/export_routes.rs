//! Export and import API routes
//!
//! Downloads are pretty-printed JSON arrays; imports accept the same shape
//! and either store every entry or nothing.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use crate::application::dto::{CharacterResponseDto, EncounterResponseDto};
use crate::application::services::{DirectoryService, EncounterService};
use crate::infrastructure::export::{render_character_sheet, JsonExporter};
use crate::infrastructure::http::{parse_campaign_id, parse_character_id, to_http_error};
use crate::infrastructure::state::AppState;

fn json_download(body: String) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], body)
}

fn export_failed(error: serde_json::Error) -> (StatusCode, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        format!("Export failed: {}", error),
    )
}

/// Download the character directory
pub async fn export_characters(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let characters = state
        .directory_service
        .list_characters()
        .await
        .map_err(to_http_error)?;
    let json = JsonExporter::export_characters(&characters).map_err(export_failed)?;
    Ok(json_download(json))
}

/// Append characters from an exported file under fresh ids
pub async fn import_characters(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<(StatusCode, Json<Vec<CharacterResponseDto>>), (StatusCode, String)> {
    let templates =
        JsonExporter::import_characters(&body).map_err(|e| to_http_error(e.into()))?;
    let stored = state
        .directory_service
        .import_characters(templates)
        .await
        .map_err(to_http_error)?;

    Ok((
        StatusCode::CREATED,
        Json(stored.into_iter().map(CharacterResponseDto::from).collect()),
    ))
}

/// Plain-text character sheet
pub async fn character_sheet(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let character_id = parse_character_id(&id)?;
    let template = state
        .directory_service
        .get_character(character_id)
        .await
        .map_err(to_http_error)?
        .ok_or_else(|| (StatusCode::NOT_FOUND, "Character not found".to_string()))?;

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        render_character_sheet(&template),
    ))
}

/// Download the encounter roster
pub async fn export_roster(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let campaign_id = parse_campaign_id(&id)?;
    let encounter = state
        .encounter_service
        .get(campaign_id)
        .await
        .map_err(to_http_error)?;
    let json = JsonExporter::export_combatants(encounter.combatants()).map_err(export_failed)?;
    Ok(json_download(json))
}

/// Merge an exported roster into the running encounter
pub async fn import_roster(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: String,
) -> Result<Json<EncounterResponseDto>, (StatusCode, String)> {
    let campaign_id = parse_campaign_id(&id)?;
    let combatants =
        JsonExporter::import_combatants(&body).map_err(|e| to_http_error(e.into()))?;
    let encounter = state
        .encounter_service
        .import_combatants(campaign_id, combatants)
        .await
        .map_err(to_http_error)?;
    Ok(Json(EncounterResponseDto::from(&encounter)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::{json, Value};

    use crate::infrastructure::http::test_support::{app, send, send_raw};

    #[tokio::test]
    async fn test_character_export_import() {
        let app = app();
        send(
            &app,
            "POST",
            "/api/characters",
            Some(json!({"name": "Mira", "type": "player", "max_hp": 31, "level": 5})),
        )
        .await;

        let (status, exported) = send_raw(&app, "GET", "/api/characters/export", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(exported.contains("\n"));

        let (status, imported) = send_raw(
            &app,
            "POST",
            "/api/characters/import",
            Some(exported),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let imported: Value = serde_json::from_str(&imported).unwrap();
        assert_eq!(imported[0]["name"], "Mira");

        let (_, list) = send(&app, "GET", "/api/characters", None).await;
        let list = list.as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_ne!(list[0]["id"], list[1]["id"]);
    }

    #[tokio::test]
    async fn test_bad_import_changes_nothing() {
        let app = app();
        send(&app, "POST", "/api/characters", Some(json!({"name": "Keep"}))).await;

        for payload in ["not json", r#"{"name": "x"}"#, r#"[{"name": "ok"}, 7]"#] {
            let (status, _) =
                send_raw(&app, "POST", "/api/characters/import", Some(payload.to_string())).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "payload {}", payload);
        }

        let (_, list) = send(&app, "GET", "/api/characters", None).await;
        assert_eq!(list.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_character_sheet_is_plain_text() {
        let app = app();
        let (_, created) = send(
            &app,
            "POST",
            "/api/characters",
            Some(json!({"name": "Ogre", "type": "monster", "max_hp": 59})),
        )
        .await;
        let uri = format!("/api/characters/{}/sheet", created["id"].as_str().unwrap());

        let (status, sheet) = send_raw(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(sheet.contains("Ogre"));
        assert!(sheet.contains("Type: Monster"));

        let missing = format!("/api/characters/{}/sheet", uuid::Uuid::new_v4());
        let (status, _) = send_raw(&app, "GET", &missing, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_roster_moves_between_campaigns() {
        let app = app();
        let mut encounters = Vec::new();
        for name in ["Source", "Target"] {
            let (_, campaign) =
                send(&app, "POST", "/api/campaigns", Some(json!({"name": name}))).await;
            let base = format!(
                "/api/campaigns/{}/encounter",
                campaign["id"].as_str().unwrap()
            );
            send(&app, "POST", &base, None).await;
            encounters.push(base);
        }
        for (name, init) in [("Bandit", 9), ("Captain", 14)] {
            send(
                &app,
                "POST",
                &format!("{}/combatants", encounters[0]),
                Some(json!({"name": name, "initiative": init})),
            )
            .await;
        }

        let (status, roster) =
            send_raw(&app, "GET", &format!("{}/export", encounters[0]), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, merged) = send_raw(
            &app,
            "POST",
            &format!("{}/import", encounters[1]),
            Some(roster),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let merged: Value = serde_json::from_str(&merged).unwrap();
        let names: Vec<&str> = merged["combatants"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Captain", "Bandit"]);

        let (_, source) = send(&app, "GET", &encounters[0], None).await;
        assert_ne!(source["combatants"][0]["id"], merged["combatants"][0]["id"]);

        let (status, _) = send_raw(
            &app,
            "POST",
            &format!("{}/import", encounters[1]),
            Some("[1, 2]".to_string()),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
