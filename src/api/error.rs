use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use crate::api::models::ErrorResponse;
use crate::db::StoreError;
use crate::withdrawal::AmountError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing required fields")]
    MissingFields,

    #[error("Amount must be positive")]
    NonPositiveAmount,

    #[error("Amount out of range: {0}")]
    AmountOutOfRange(AmountError),

    #[error("Invalid status: {0}")]
    InvalidStatus(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingFields
            | ApiError::NonPositiveAmount
            | ApiError::AmountOutOfRange(_)
            | ApiError::InvalidStatus(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::FORBIDDEN,
            ApiError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Store(StoreError::Transition { source, .. }) => match source {
                crate::withdrawal::TransitionError::AlreadyFinal(_) => StatusCode::CONFLICT,
                crate::withdrawal::TransitionError::InvalidTarget(_) => StatusCode::BAD_REQUEST,
            },
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let message = if status.is_server_error() {
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        (
            status,
            Json(ErrorResponse {
                success: false,
                error: message,
            }),
        )
            .into_response()
    }
}
