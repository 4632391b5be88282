//! Custom error types for the relay service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::UpstreamError;
use serde_json::json;
use thiserror::Error;

use crate::pagination::PaginationError;

/// Custom error type for the relay service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Bad request with message
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Requested data does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Upstream provider error
    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    /// Paginated listing never reached its end
    #[error("Pagination limit of {max_pages} pages exceeded")]
    PaginationLimitExceeded { max_pages: usize },

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,
}

impl From<PaginationError> for ApiError {
    fn from(err: PaginationError) -> Self {
        match err {
            PaginationError::Upstream(e) => ApiError::Upstream(e),
            PaginationError::LimitExceeded { max_pages } => {
                ApiError::PaginationLimitExceeded { max_pages }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            ApiError::Upstream(UpstreamError::Status { status, body }) => {
                let status =
                    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                let body = body.unwrap_or_else(|| {
                    json!({ "error": status.canonical_reason().unwrap_or("Upstream error") })
                });
                (status, body)
            }
            ApiError::Upstream(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Internal server error" }),
            ),
            ApiError::PaginationLimitExceeded { max_pages } => (
                StatusCode::BAD_GATEWAY,
                json!({
                    "error": format!("Upstream listing did not end within {} pages", max_pages)
                }),
            ),
            ApiError::InternalServerError => {
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;
