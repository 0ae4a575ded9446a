use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use ideabox_db::StoreError;
use ideabox_types::api::ErrorResponse;

/// Request-level failure. The message is what the client sees, so internal
/// causes are logged and replaced by a fixed string.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(&'static str),

    #[error("{0}")]
    Unauthorized(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Internal(&'static str),
}

impl ApiError {
    pub fn internal(context: &'static str, cause: impl std::fmt::Display) -> Self {
        error!("{}: {}", context, cause);
        Self::Internal(context)
    }

    /// Map a store failure: validation passes through, everything else is a 500.
    pub fn from_store(context: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |err| match err {
            StoreError::Validation(msg) => Self::Validation(msg),
            other => Self::internal(context, other),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (self.status(), body).into_response()
    }
}
