use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoadPage {
    pub html: String,
}

pub async fn load_page(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoadPage>,
) -> Result<Json<Value>, AppError> {
    if payload.html.trim().is_empty() {
        return Err(AppError::BadRequest("html must not be empty".to_string()));
    }
    let bytes = payload.html.len();
    state.page.load(payload.html).await?;
    Ok(Json(json!({ "loaded": true, "bytes": bytes })))
}

/// The booking page as it currently stands, filled values included.
pub async fn get_page(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    state
        .page
        .snapshot()
        .await?
        .map(Html)
        .ok_or_else(|| AppError::NotFound("no booking page is loaded".to_string()))
}
