use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::errors::AppError;
use crate::models::{ScanFieldsResponse, ScanRequest, ScreenRequest};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/scan/fields", get(scan_fields))
        .route("/scan", post(scan))
        .route("/screen/stocks", post(screen))
}

async fn scan_fields() -> Json<ScanFieldsResponse> {
    Json(ScanFieldsResponse {
        fields: vec!["ticker", "last_close", "ema_20", "ema_50", "ema_200", "rsi", "trend"],
    })
}

async fn scan(
    State(_state): State<AppState>,
    Json(body): Json<ScanRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    if body.fields.is_empty() {
        return Err(AppError::Validation("fields must not be empty".into()));
    }
    Ok(Json(serde_json::json!({ "results": [] })))
}

const SCREEN_MODES: &[&str] = &["fundamental", "technical"];

async fn screen(
    State(_state): State<AppState>,
    Json(body): Json<ScreenRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !SCREEN_MODES.contains(&body.mode.as_str()) {
        return Err(AppError::Validation(format!(
            "mode must be one of {SCREEN_MODES:?}, got '{}'",
            body.mode
        )));
    }
    Ok(Json(serde_json::json!({ "results": [] })))
}
