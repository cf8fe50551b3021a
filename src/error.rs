use crate::domain::ValidationError;
use crate::engine::{CommissionError, TierSourceError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Internal server error: {0}")]
    Internal(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Upstream error: {0}")]
    Upstream(String),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}

impl From<CommissionError> for AppError {
    fn from(err: CommissionError) -> Self {
        match err {
            CommissionError::Validation(e) => e.into(),
            CommissionError::Lookup(e) => {
                AppError::Upstream(format!("Minimal rate lookup failed: {}", e))
            }
        }
    }
}

impl From<TierSourceError> for AppError {
    fn from(err: TierSourceError) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg),
        };

        if status.is_server_error() {
            error!("Request failed with {}: {}", status, error_message);
        }

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::LookupError;

    #[test]
    fn test_validation_maps_to_bad_request() {
        let err: AppError = ValidationError::NonPositiveInterval(0).into();
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_lookup_failure_maps_to_bad_gateway() {
        let err: AppError = CommissionError::Lookup(LookupError::RateLimited).into();
        assert!(matches!(err, AppError::Upstream(_)));
        assert_eq!(err.into_response().status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_not_found_status() {
        let err = AppError::NotFound("offer".to_string());
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }
}
