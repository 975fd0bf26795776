use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use burnbox_core::PasteError;
use thiserror::Error;
use tracing::error;

use crate::model::ErrorResponse;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("paste not found")]
    NotFound,
    /// An extractor refused the request before it reached a handler.
    #[error("{1}")]
    Rejected(StatusCode, String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<PasteError> for AppError {
    fn from(value: PasteError) -> Self {
        match value {
            PasteError::Validation { message, .. } => Self::BadRequest(message),
            PasteError::NotFound => Self::NotFound,
            other @ (PasteError::Storage(_) | PasteError::IdExhausted(_)) => {
                Self::Internal(other.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound => (StatusCode::NOT_FOUND, "Paste not found".to_owned()),
            AppError::Rejected(status, message) => (status, message),
            AppError::Internal(detail) => {
                error!(error = %detail, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to store paste".to_owned(),
                )
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
