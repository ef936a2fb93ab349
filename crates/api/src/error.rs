//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::{DomainError, OrderError};

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client (malformed ids, payloads).
    BadRequest(String),
    /// Domain logic error.
    Domain(DomainError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Domain(err) => domain_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn domain_error_to_response(err: DomainError) -> (StatusCode, String) {
    match &err {
        DomainError::UserNotFound { .. } | DomainError::OrderNotFound { .. } => {
            (StatusCode::NOT_FOUND, err.to_string())
        }
        DomainError::EmailAlreadyExists { .. } => (StatusCode::CONFLICT, err.to_string()),
        DomainError::User(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        DomainError::Order(order_err) => match order_err {
            OrderError::InvalidQuantity { .. } | OrderError::InvalidPrice { .. } => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            OrderError::AlreadyPaid { .. }
            | OrderError::Cancelled { .. }
            | OrderError::InvalidTransition { .. } => (StatusCode::CONFLICT, err.to_string()),
        },
        DomainError::Repository(repo_err) => {
            tracing::error!(error = %repo_err, "storage failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal storage error".to_string(),
            )
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        ApiError::Domain(err)
    }
}
