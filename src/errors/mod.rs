//! # Error Types
//!
//! Error handling for the unigate service using `thiserror`. Business-rule
//! violations are not represented here: those travel back to callers as
//! [`ServiceResult`](crate::auth::models::ServiceResult) soft failures. This
//! enum covers the failures that do propagate — configuration problems,
//! storage faults, and token/credential plumbing errors.

use std::fmt;

/// Custom result type for unigate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the unigate service
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Configuration errors (fatal at startup)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database and storage errors
    #[error("Database error: {context}")]
    Database {
        #[source]
        source: sqlx::Error,
        context: String,
    },

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String, field: Option<String> },

    /// Authentication and authorization errors
    #[error("Authentication error: {message}")]
    Auth { message: String, error_type: AuthErrorType },

    /// Resource not found errors
    #[error("Resource not found: {resource_type} with ID '{id}'")]
    NotFound { resource_type: String, id: String },

    /// Resource conflict errors (e.g., already exists)
    #[error("Resource conflict: {message}")]
    Conflict { message: String, resource_type: String },

    /// Internal server errors
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Authentication error subtypes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthErrorType {
    InvalidToken,
    ExpiredToken,
    MissingToken,
    InsufficientPermissions,
    InvalidCredentials,
}

impl fmt::Display for AuthErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthErrorType::InvalidToken => write!(f, "invalid_token"),
            AuthErrorType::ExpiredToken => write!(f, "expired_token"),
            AuthErrorType::MissingToken => write!(f, "missing_token"),
            AuthErrorType::InsufficientPermissions => write!(f, "insufficient_permissions"),
            AuthErrorType::InvalidCredentials => write!(f, "invalid_credentials"),
        }
    }
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation { message: message.into(), field: None }
    }

    /// Create a validation error with field information
    pub fn validation_field<S: Into<String>, F: Into<String>>(message: S, field: F) -> Self {
        Self::Validation { message: message.into(), field: Some(field.into()) }
    }

    /// Create an authentication error
    pub fn auth<S: Into<String>>(message: S, error_type: AuthErrorType) -> Self {
        Self::Auth { message: message.into(), error_type }
    }

    /// Create a not found error
    pub fn not_found<R: Into<String>, I: Into<String>>(resource_type: R, id: I) -> Self {
        Self::NotFound { resource_type: resource_type.into(), id: id.into() }
    }

    /// Create a conflict error
    pub fn conflict<M: Into<String>, R: Into<String>>(message: M, resource_type: R) -> Self {
        Self::Conflict { message: message.into(), resource_type: resource_type.into() }
    }

    /// Create an internal server error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal { message: message.into(), source: None }
    }

    /// Get the HTTP status code that should be returned for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Config(_) => 500,
            Error::Database { .. } => 500,
            Error::Validation { .. } => 400,
            Error::Auth { error_type, .. } => match error_type {
                AuthErrorType::InsufficientPermissions => 403,
                _ => 401,
            },
            Error::NotFound { .. } => 404,
            Error::Conflict { .. } => 409,
            Error::Internal { .. } => 500,
        }
    }
}

impl From<sqlx::Error> for Error {
    fn from(error: sqlx::Error) -> Self {
        Self::Database { source: error, context: "Database operation failed".to_string() }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let error_messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string())
                    })
                    .collect();
                format!("{}: {}", field, error_messages.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ");

        Self::validation(format!("Validation failed: {}", message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_creation() {
        let error = Error::config("Signing key must not be empty");
        assert!(matches!(error, Error::Config(_)));
        assert_eq!(error.to_string(), "Configuration error: Signing key must not be empty");
    }

    #[test]
    fn validation_error_with_field() {
        let error = Error::validation_field("Invalid email format", "email");
        assert!(matches!(error, Error::Validation { .. }));
        if let Error::Validation { field, .. } = error {
            assert_eq!(field, Some("email".to_string()));
        }
    }

    #[test]
    fn status_codes() {
        assert_eq!(Error::validation("test").status_code(), 400);
        assert_eq!(Error::auth("test", AuthErrorType::InvalidToken).status_code(), 401);
        assert_eq!(Error::auth("test", AuthErrorType::InsufficientPermissions).status_code(), 403);
        assert_eq!(Error::not_found("User", "u-1").status_code(), 404);
        assert_eq!(Error::conflict("test", "User").status_code(), 409);
        assert_eq!(Error::internal("test").status_code(), 500);
    }

    #[test]
    fn auth_error_type_display() {
        assert_eq!(AuthErrorType::InvalidToken.to_string(), "invalid_token");
        assert_eq!(AuthErrorType::ExpiredToken.to_string(), "expired_token");
        assert_eq!(AuthErrorType::InvalidCredentials.to_string(), "invalid_credentials");
    }
}
