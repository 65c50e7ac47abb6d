use std::sync::Arc;

use axum::extract::State;
use axum::response::Html;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::{BookingRecord, FillReport, StatusLine};
use crate::state::AppState;

static PANEL_HTML: &str = include_str!("../web/panel.html");

pub async fn panel_page() -> Html<&'static str> {
    Html(PANEL_HTML)
}

#[derive(Deserialize)]
pub struct ExtractRequest {
    pub text: String,
}

#[derive(Serialize)]
pub struct RecordResponse {
    pub status: StatusLine,
    pub record: Option<BookingRecord>,
}

#[derive(Serialize)]
pub struct FillResponse {
    pub status: StatusLine,
    pub report: FillReport,
}

pub async fn extract(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ExtractRequest>,
) -> Result<Json<RecordResponse>, AppError> {
    let (record, status) = state.panel.extract(&payload.text).await?;
    Ok(Json(RecordResponse {
        status,
        record: Some(record),
    }))
}

pub async fn get_record(State(state): State<Arc<AppState>>) -> Json<RecordResponse> {
    let (record, status) = state.panel.current().await;
    Json(RecordResponse { status, record })
}

/// Operator corrections to the extracted record, replacing it wholesale.
pub async fn put_record(
    State(state): State<Arc<AppState>>,
    Json(record): Json<BookingRecord>,
) -> Json<RecordResponse> {
    let (record, status) = state.panel.replace_record(record).await;
    Json(RecordResponse {
        status,
        record: Some(record),
    })
}

pub async fn fill(State(state): State<Arc<AppState>>) -> Result<Json<FillResponse>, AppError> {
    let (report, status) = state.panel.fill().await?;
    Ok(Json(FillResponse { status, report }))
}
