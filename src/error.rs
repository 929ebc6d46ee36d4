use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;
use tracing::error;

use crate::models::ApiResponse;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid subject selection")]
    InvalidSelection { details: String },

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Ambiguous combination data")]
    AmbiguousCombination { details: String },

    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::InvalidSelection { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AmbiguousCombination { .. } | AppError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            error!("request failed: {self:?}");
        }

        let details = match &self {
            AppError::InvalidSelection { details }
            | AppError::AmbiguousCombination { details } => Some(details.clone()),
            // Database internals stay in the logs, not on the wire.
            AppError::NotFound(_) | AppError::Database(_) => None,
        };

        let body = ApiResponse::<()>::err(self.to_string(), details);

        (status, Json(body)).into_response()
    }
}
