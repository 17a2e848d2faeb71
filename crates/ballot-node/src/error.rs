use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ballot_core::LedgerError;
use serde_json::json;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("chain lock poisoned by a panicked writer")]
    Poisoned,
    #[error("chain task failed: {0}")]
    Join(#[from] JoinError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Ledger(LedgerError::InvalidPayload(_)) => StatusCode::BAD_REQUEST,
            ApiError::Ledger(LedgerError::Clock { .. }) | ApiError::Poisoned | ApiError::Join(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("request failed: {self}");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
