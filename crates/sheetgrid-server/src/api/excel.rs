use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;

use crate::api::auth::MessageResponse;
use crate::error::AppError;
use crate::AppState;

/// Sheet upload; `data` is stored as-is
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SaveExcelRequest {
    pub data: Option<serde_json::Value>,
}

async fn save_excel(
    State(state): State<AppState>,
    Json(req): Json<SaveExcelRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let data = req
        .data
        .filter(|d| !d.is_null())
        .ok_or_else(|| AppError::BadRequest("Missing field: data".to_string()))?;

    let id = state.db.save_excel(&data).await?;
    tracing::info!(%id, "saved sheet data");

    Ok(Json(MessageResponse {
        message: "Data saved".to_string(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/saveExcel", post(save_excel))
}
