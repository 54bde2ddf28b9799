//! Error handling for the bookstore HTTP layer
//!
//! [`AppError`] is the only thing that writes an error response. Every other
//! stage returns it (or something convertible into it) and lets axum render it
//! through [`IntoResponse`], so each failed request gets exactly one body.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bookstore_db::StoreError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub const INTERNAL_MESSAGE: &str = "Internal server error";
pub const BAD_REQUEST_MESSAGE: &str = "One or more supplied fields are invalid";
pub const NOT_FOUND_MESSAGE: &str = "Resource not found";

/// Body of every error response
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub status: u16,
    pub message: String,
}

/// Application error types that map to HTTP responses
#[derive(Error, Debug)]
pub enum AppError {
    #[error("bad request: {message}")]
    BadRequest { message: String },

    #[error("validation error: {}", .violations.join("; "))]
    Validation { violations: Vec<String> },

    #[error("not found: {message}")]
    NotFound { message: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Create a bad request error with a specific message
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest {
            message: message.into(),
        }
    }

    /// Create a validation error from every violated rule
    pub fn validation(violations: Vec<String>) -> Self {
        Self::Validation { violations }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Bad request carrying the default message
    pub fn malformed() -> Self {
        Self::bad_request(BAD_REQUEST_MESSAGE)
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest { .. } | AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the client. Internal details never leave the server.
    pub fn client_message(&self) -> String {
        match self {
            AppError::BadRequest { message } | AppError::NotFound { message } => message.clone(),
            AppError::Validation { violations } => violations.join("; "),
            AppError::Internal(_) => INTERNAL_MESSAGE.to_string(),
        }
    }
}

impl Default for AppError {
    fn default() -> Self {
        AppError::Internal(anyhow::anyhow!(INTERNAL_MESSAGE))
    }
}

/// Classifies storage failures: casts are malformed requests, validation
/// failures keep every violation, the rest is internal.
impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Cast { .. } => {
                tracing::debug!(error = %err, "rejecting malformed value");
                AppError::malformed()
            }
            StoreError::Validation(errors) => AppError::validation(errors.messages()),
            other => AppError::Internal(anyhow::Error::new(other)),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "rejecting request body");
        AppError::malformed()
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "rejecting query string");
        AppError::malformed()
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "rejecting path parameters");
        AppError::malformed()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4();
        let status = self.status();
        let message = self.client_message();

        if status.is_server_error() {
            tracing::error!(
                error_id = %error_id,
                status_code = %status.as_u16(),
                error = ?self,
                "request failed"
            );
        } else {
            tracing::warn!(
                error_id = %error_id,
                status_code = %status.as_u16(),
                error = %self,
                "request rejected"
            );
        }

        let body = ErrorBody {
            status: status.as_u16(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use bookstore_db::schema::{FieldKind, FieldSpec, Mode, Schema};
    use serde_json::json;

    async fn body_of(error: AppError) -> (StatusCode, ErrorBody) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_defaults_per_kind() {
        let (status, body) = body_of(AppError::malformed()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            ErrorBody {
                status: 400,
                message: BAD_REQUEST_MESSAGE.to_string()
            }
        );

        let (status, body) = body_of(AppError::not_found(NOT_FOUND_MESSAGE)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.message, "Resource not found");

        let (status, body) = body_of(AppError::default()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.message, "Internal server error");
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let error = AppError::Internal(anyhow::anyhow!("connection refused at 10.0.0.3:27017"));
        let (status, body) = body_of(error).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.status, 500);
        assert_eq!(body.message, INTERNAL_MESSAGE);
    }

    #[tokio::test]
    async fn test_validation_joins_every_violation() {
        static SCHEMA: Schema = Schema::new(&[
            FieldSpec::new("name", FieldKind::String).required("name is required"),
            FieldSpec::new("editora", FieldKind::String).required("editora is required"),
        ]);
        let store_error = SCHEMA.prepare(&json!({}), Mode::Create).unwrap_err();

        let (status, body) = body_of(store_error.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.message, "name is required; editora is required");
    }

    #[test]
    fn test_store_error_classification() {
        let cast = StoreError::cast("ObjectId", "zzz", "_id");
        assert!(matches!(AppError::from(cast), AppError::BadRequest { .. }));

        let backend = StoreError::Backend("socket closed".into());
        let error = AppError::from(backend);
        assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.client_message(), INTERNAL_MESSAGE);
    }
}
