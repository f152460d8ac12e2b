//! Unified error handling.
//!
//! Provides a single error type that can be converted to:
//! - the `{success:false, ...}` dispatch envelope (see [`crate::ApiResponse`])
//! - Axum HTTP responses for the non-dispatch routes

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::{DomainError, FieldErrors};
use serde::Serialize;
use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication & Authorization
    #[error("Authentication required")]
    Unauthorized,

    #[error("Access denied: {0}")]
    Forbidden(String),

    // Resource errors
    #[error("{0}")]
    NotFound(String),

    #[error("{0} already exists")]
    Conflict(String),

    /// Operation refused because of current state (e.g. active children)
    #[error("{0}")]
    Blocked(String),

    // Validation
    #[error("Validation failed")]
    Invalid(FieldErrors),

    #[error("Invalid input: {0}")]
    BadRequest(String),

    // Dispatch
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Too many requests")]
    TooManyRequests,

    // Storage
    #[error("Store error: {0}")]
    Store(String),

    #[cfg(feature = "database")]
    #[error("Database error")]
    Database(#[from] sea_orm::DbErr),

    #[cfg(feature = "cache")]
    #[error("Cache error")]
    Cache(#[from] redis::RedisError),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

/// Error response body for HTTP
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Blocked(_) => "BLOCKED",
            AppError::Invalid(_) => "VALIDATION_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::UnknownAction(_) => "UNKNOWN_ACTION",
            AppError::TooManyRequests => "TOO_MANY_REQUESTS",
            AppError::Store(_) => "INTERNAL_ERROR",
            #[cfg(feature = "database")]
            AppError::Database(_) => "INTERNAL_ERROR",
            #[cfg(feature = "cache")]
            AppError::Cache(_) => "INTERNAL_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) | AppError::UnknownAction(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) | AppError::Blocked(_) => StatusCode::CONFLICT,
            AppError::Invalid(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            AppError::Unauthorized => {
                "Session is missing or has expired. Please log in again.".to_string()
            }
            AppError::Forbidden(what) => format!("You do not have permission to {}", what),
            AppError::NotFound(msg) | AppError::Blocked(msg) | AppError::BadRequest(msg) => {
                msg.clone()
            }
            AppError::Conflict(msg) => {
                if msg.ends_with("already exists") {
                    msg.clone()
                } else {
                    format!("{} already exists", msg)
                }
            }
            AppError::Invalid(_) => "Please correct the highlighted fields".to_string(),
            AppError::UnknownAction(action) => format!("Unknown action: {}", action),
            AppError::TooManyRequests => {
                "Too many requests. Please try again later.".to_string()
            }

            // Hide details for internal errors
            AppError::Store(msg) => {
                tracing::error!("Store error: {}", msg);
                "An internal error occurred".to_string()
            }
            #[cfg(feature = "database")]
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "An internal error occurred".to_string()
            }
            #[cfg(feature = "cache")]
            AppError::Cache(e) => {
                tracing::error!("Cache error: {:?}", e);
                "An internal error occurred".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
        }
    }

    /// Raw diagnostic text for internal failures.
    pub fn detail(&self) -> Option<String> {
        match self {
            AppError::Store(msg) | AppError::Internal(msg) => Some(msg.clone()),
            #[cfg(feature = "database")]
            AppError::Database(e) => Some(e.to_string()),
            #[cfg(feature = "cache")]
            AppError::Cache(e) => Some(e.to_string()),
            _ => None,
        }
    }

    /// Per-field messages of a validation failure.
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            AppError::Invalid(errors) => Some(errors),
            _ => None,
        }
    }
}

// =============================================================================
// HTTP Response (Axum)
// =============================================================================

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code().to_string(),
                message: self.user_message(),
            },
        };

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// Domain Error Conversion
// =============================================================================

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Invalid(errors) => AppError::Invalid(errors),
            DomainError::NotFound(what) => AppError::NotFound(format!("{} not found", what)),
            DomainError::Conflict(msg) => AppError::Conflict(msg),
            DomainError::Blocked(msg) => AppError::Blocked(msg),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("Serialization error: {}", err))
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    /// `what` names the missing entity, e.g. "Directorate"
    fn ok_or_not_found(self, what: &str) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, what: &str) -> AppResult<T> {
        self.ok_or_else(|| AppError::not_found(what))
    }
}

/// Convenience constructors
impl AppError {
    pub fn not_found(what: &str) -> Self {
        AppError::NotFound(format!("{} not found", what))
    }

    pub fn conflict(entity: impl Into<String>) -> Self {
        AppError::Conflict(entity.into())
    }

    pub fn blocked(msg: impl Into<String>) -> Self {
        AppError::Blocked(msg.into())
    }

    pub fn validation(field: impl Into<String>, msg: impl Into<String>) -> Self {
        DomainError::field(field, msg).into()
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        AppError::BadRequest(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        AppError::Store(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_not_found_message() {
        let err: AppError = DomainError::not_found("Directorate").into();
        assert_eq!(err.user_message(), "Directorate not found");
        assert_eq!(err.code(), "NOT_FOUND");
    }

    #[test]
    fn test_store_error_hides_message_but_keeps_detail() {
        let err = AppError::store("table positions missing column code");
        assert_eq!(err.user_message(), "An internal error occurred");
        assert_eq!(
            err.detail().as_deref(),
            Some("table positions missing column code")
        );
    }

    #[test]
    fn test_auth_errors_are_distinguishable() {
        let unauthorized = AppError::Unauthorized;
        let forbidden = AppError::Forbidden("delete directorates".to_string());
        assert_ne!(unauthorized.code(), forbidden.code());
        assert_eq!(
            forbidden.user_message(),
            "You do not have permission to delete directorates"
        );
    }

    #[test]
    fn test_validation_constructor_keeps_field() {
        let err = AppError::validation("name", "Name is required");
        assert_eq!(err.field_errors().unwrap()["name"], "Name is required");
    }
}
