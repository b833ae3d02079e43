use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldError {
    pub fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    #[error("Class not found")]
    ClassNotFound,

    #[error("Session not found")]
    SessionNotFound,

    /// A singleton catalog document is absent from the aggregate view,
    /// meaning the back-end was never seeded.
    #[error("No class data found")]
    CatalogMissing,

    /// The live signup catalog is absent on the registration path.
    #[error("No class data found")]
    NoClassData,

    #[error("Already signed up")]
    AlreadySignedUp,

    #[error("Session is full")]
    SessionFull,

    #[error("Internal error: {0}")]
    InternalError(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl AppError {
    pub fn internal<E>(error: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        AppError::InternalError(error.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response()
            }

            AppError::InternalError(source) => {
                error!("request failed: {source}");

                (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response()
            }

            other => {
                let status = match other {
                    AppError::AlreadySignedUp | AppError::SessionFull => StatusCode::BAD_REQUEST,
                    AppError::ClassNotFound
                    | AppError::SessionNotFound
                    | AppError::CatalogMissing => StatusCode::NOT_FOUND,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };

                (status, other.to_string()).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use super::{AppError, FieldError};

    #[test]
    fn test_conflicts_are_bad_request() {
        assert_eq!(
            AppError::AlreadySignedUp.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::SessionFull.into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_missing_targets_are_not_found() {
        assert_eq!(
            AppError::ClassNotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::SessionNotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::CatalogMissing.into_response().status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_internal_faults_stay_generic() {
        let response = AppError::internal("connection reset").into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_is_bad_request() {
        let errors = vec![FieldError::new("day", "must not be empty")];

        assert_eq!(
            AppError::Validation(errors).into_response().status(),
            StatusCode::BAD_REQUEST
        );
    }
}
