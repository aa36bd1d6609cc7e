//! Dice roller API route

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::application::dto::DiceRollRequestDto;
use crate::domain::value_objects::DiceRoll;
use crate::infrastructure::state::AppState;

/// Roll `count` dice of one size plus a modifier; defaults to a single d20
pub async fn roll_dice(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DiceRollRequestDto>,
) -> Result<Json<DiceRoll>, (StatusCode, String)> {
    let count = u32::try_from(req.count.unwrap_or(1))
        .map_err(|_| (StatusCode::BAD_REQUEST, "Dice count cannot be negative".to_string()))?;
    let sides = u32::try_from(req.sides.unwrap_or(20))
        .map_err(|_| (StatusCode::BAD_REQUEST, "Die size cannot be negative".to_string()))?;

    let roll = state
        .roll_dice(count, sides, req.modifier.unwrap_or(0))
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    Ok(Json(roll))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::infrastructure::http::test_support::{app, send};

    #[tokio::test]
    async fn test_default_roll_is_one_d20() {
        let app = app();
        let (status, roll) = send(&app, "POST", "/api/dice/roll", Some(json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(roll["sides"], 20);
        let rolls = roll["rolls"].as_array().unwrap();
        assert_eq!(rolls.len(), 1);
        let face = rolls[0].as_i64().unwrap();
        assert!((1..=20).contains(&face));
        assert_eq!(roll["total"].as_i64().unwrap(), face);
    }

    #[tokio::test]
    async fn test_roll_with_modifier_from_strings() {
        let app = app();
        let (status, roll) = send(
            &app,
            "POST",
            "/api/dice/roll",
            Some(json!({"count": "3", "sides": "6", "modifier": "-2"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let sum: i64 = roll["rolls"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r.as_i64().unwrap())
            .sum();
        assert_eq!(roll["rolls"].as_array().unwrap().len(), 3);
        assert_eq!(roll["total"].as_i64().unwrap(), sum - 2);
    }

    #[tokio::test]
    async fn test_invalid_dice_are_rejected() {
        let app = app();
        for body in [
            json!({"sides": 7}),
            json!({"count": 0}),
            json!({"count": -1}),
            json!({"sides": -20}),
        ] {
            let (status, _) = send(&app, "POST", "/api/dice/roll", Some(body.clone())).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body {}", body);
        }
    }
}
