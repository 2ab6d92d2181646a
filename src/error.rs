//! Error taxonomy shared by the core and the HTTP surface.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

const DUPLICATE_MESSAGE: &str = "The data provided is invalid.";
const DUPLICATE_ACTION: &str = "Use a different email or username for this operation.";

const INTERNAL_MESSAGE: &str = "An unexpected internal error occurred.";
const INTERNAL_ACTION: &str = "Contact support.";
const SERVICE_ACTION: &str = "Check whether the service is available.";

#[derive(Debug, Error)]
pub enum AppError {
    /// A required secret or setting is missing. Fatal, never retried.
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Input breaks a business invariant; the caller may retry with other input.
    #[error("{message}")]
    Validation { message: String, action: String },

    #[error("{message}")]
    NotFound { message: String, action: String },

    /// Unexpected failure of a collaborator (migrations, ...).
    #[error("{message}")]
    Service {
        message: String,
        #[source]
        source: BoxError,
    },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>, action: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            action: action.into(),
        }
    }

    pub fn not_found(message: impl Into<String>, action: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            action: action.into(),
        }
    }

    pub fn service(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Service {
            message: message.into(),
            source: source.into(),
        }
    }

    /// Username or email already taken, whether caught by the pre-check or
    /// by the unique index.
    pub fn duplicate_identity() -> Self {
        Self::validation(DUPLICATE_MESSAGE, DUPLICATE_ACTION)
    }

    pub fn name(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "ValidationError",
            AppError::NotFound { .. } => "NotFoundError",
            AppError::Service { .. } => "ServiceError",
            AppError::Configuration { .. } | AppError::Database(_) | AppError::Internal(_) => {
                "InternalServerError"
            }
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Service { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Configuration { .. } | AppError::Database(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn action(&self) -> &str {
        match self {
            AppError::Validation { action, .. } | AppError::NotFound { action, .. } => action,
            AppError::Service { .. } => SERVICE_ACTION,
            _ => INTERNAL_ACTION,
        }
    }

    /// Message safe to show a client. Server-side failures never leak detail.
    pub fn public_message(&self) -> &str {
        match self {
            AppError::Validation { message, .. }
            | AppError::NotFound { message, .. }
            | AppError::Service { message, .. } => message,
            _ => INTERNAL_MESSAGE,
        }
    }
}

/// JSON body returned for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub name: &'static str,
    pub message: &'a str,
    pub action: &'a str,
    pub status_code: u16,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            match &self {
                AppError::Service { source, .. } => {
                    error!(error = %self, cause = %source, "service failure")
                }
                _ => error!(error = %self, "internal failure"),
            }
        }

        let body = ErrorBody {
            name: self.name(),
            message: self.public_message(),
            action: self.action(),
            status_code: status.as_u16(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_identity_is_a_client_error() {
        let err = AppError::duplicate_identity();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.name(), "ValidationError");
        assert_eq!(err.public_message(), DUPLICATE_MESSAGE);
        assert_eq!(err.action(), DUPLICATE_ACTION);
    }

    #[test]
    fn configuration_detail_is_not_exposed() {
        let err = AppError::configuration("DATABASE_PEPPER is not set");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.public_message(), INTERNAL_MESSAGE);
        assert!(err.to_string().contains("DATABASE_PEPPER"));
    }

    #[test]
    fn service_error_keeps_its_cause() {
        let cause = std::io::Error::new(std::io::ErrorKind::Other, "connection refused");
        let err = AppError::service("Failed to list pending migrations.", cause);
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        let source = std::error::Error::source(&err).expect("source should be kept");
        assert_eq!(source.to_string(), "connection refused");
    }

    #[test]
    fn error_body_serialization() {
        let err = AppError::not_found("missing", "look elsewhere");
        let body = ErrorBody {
            name: err.name(),
            message: err.public_message(),
            action: err.action(),
            status_code: err.status_code().as_u16(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "NotFoundError",
                "message": "missing",
                "action": "look elsewhere",
                "status_code": 404,
            })
        );
    }
}
