use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::services::page::PageError;
use crate::services::panel::PanelError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Panel(#[from] PanelError),

    #[error("page error: {0}")]
    Page(#[from] PageError),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Panel(PanelError::NothingPasted) => StatusCode::BAD_REQUEST,
            AppError::Panel(PanelError::NothingExtracted) => StatusCode::CONFLICT,
            AppError::Panel(PanelError::Transport(_)) => StatusCode::BAD_GATEWAY,
            AppError::Page(_) => StatusCode::BAD_GATEWAY,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        };

        let body = match &self {
            // the panel shows these verbatim in its status line
            AppError::Panel(_) => serde_json::json!({
                "error": self.to_string(),
                "status": { "kind": "error", "message": self.to_string() },
            }),
            _ => serde_json::json!({ "error": self.to_string() }),
        };
        (status, axum::Json(body)).into_response()
    }
}
