use std::collections::BTreeMap;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use heck::ToLowerCamelCase;
use serde_json::Value;
use thiserror::Error;
use tracing::{error, warn};
use validator::ValidationErrors;

use crate::repository::RepoError;
use crate::utils::response::error as error_response;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        message: String,
        fields: Option<BTreeMap<String, String>>,
    },

    #[error("Authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        AppError::InvalidArgument {
            message: message.into(),
            fields: None,
        }
    }

    pub fn invalid_fields(fields: BTreeMap<String, String>) -> Self {
        AppError::InvalidArgument {
            message: "Validation failed".to_string(),
            fields: Some(fields),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidArgument { .. } => StatusCode::BAD_REQUEST,
            AppError::AuthenticationRequired(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidArgument { .. } => "INVALID_ARGUMENT",
            AppError::AuthenticationRequired(_) => "AUTHENTICATION_REQUIRED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::Unexpected(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    fn log(&self) {
        match self {
            AppError::InvalidArgument { message, .. } => {
                warn!(code = self.code(), message = %message, "Rejected request");
            }
            AppError::AuthenticationRequired(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => {
                warn!(code = self.code(), message = %msg, "Rejected request");
            }
            AppError::Unexpected(msg) => {
                error!(error = ?self, message = %msg, "Application error");
            }
            AppError::DatabaseError(e) => {
                error!(error = ?e, "Database error");
            }
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::UniqueViolation => AppError::Conflict("Resource already exists".to_string()),
            RepoError::StaleVersion { .. } => {
                AppError::Conflict("Resource was modified concurrently, retry with fresh data".to_string())
            }
            RepoError::Database(e) => AppError::DatabaseError(e),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| {
                let message = errs
                    .first()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .unwrap_or_else(|| "invalid".to_string());
                (field.to_lower_camel_case(), message)
            })
            .collect();
        AppError::invalid_fields(fields)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::invalid_argument(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::invalid_argument(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::invalid_argument(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        // Log internal details
        self.log();

        // Only expose high-level message to the client
        let (public_message, details) = match self {
            AppError::InvalidArgument { message, fields } => (
                message,
                fields.map(|f| Value::Object(f.into_iter().map(|(k, v)| (k, Value::String(v))).collect())),
            ),
            AppError::AuthenticationRequired(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg) => (msg, None),
            AppError::DatabaseError(_) | AppError::Unexpected(_) => {
                ("An unexpected error occurred".to_string(), None)
            }
        };

        error_response(code, public_message, details, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_follow_taxonomy() {
        assert_eq!(AppError::invalid_argument("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::AuthenticationRequired("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::Forbidden("x".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Conflict("x".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::Unexpected("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_repo_errors_become_conflicts() {
        assert!(matches!(AppError::from(RepoError::UniqueViolation), AppError::Conflict(_)));
        let stale = RepoError::StaleVersion {
            id: uuid::Uuid::new_v4(),
            expected: 3,
        };
        assert!(matches!(AppError::from(stale), AppError::Conflict(_)));
    }

    #[test]
    fn test_validation_details_use_wire_field_names() {
        let mut errors = ValidationErrors::new();
        errors.add("contact_email", validator::ValidationError::new("email"));
        errors.add("organization_name", validator::ValidationError::new("blank"));

        match AppError::from(errors) {
            AppError::InvalidArgument { fields: Some(fields), .. } => {
                assert_eq!(fields.get("contactEmail").map(String::as_str), Some("email"));
                assert!(fields.contains_key("organizationName"));
                assert!(!fields.contains_key("contact_email"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unexpected_error_hides_details() {
        let response = AppError::Unexpected("secret stack trace".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(!text.contains("secret"));
        assert!(text.contains("INTERNAL_SERVER_ERROR"));
    }
}
