use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::errors::{AuthErrorType, Error};

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Conflict(String),
    NotFound(String),
    Unauthorized(String),
    Forbidden(String),
    Internal(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let error_kind = match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Conflict(_) => "conflict",
            ApiError::NotFound(_) => "not_found",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::Internal(_) => "internal_error",
        };

        let message = match self {
            ApiError::BadRequest(msg)
            | ApiError::Conflict(msg)
            | ApiError::NotFound(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::Internal(msg) => msg,
        };

        (status, Json(ErrorBody { error: error_kind, message })).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation { message, .. } => ApiError::BadRequest(message),
            Error::Auth { message, error_type } => match error_type {
                AuthErrorType::InsufficientPermissions => ApiError::Forbidden(message),
                _ => ApiError::Unauthorized(message),
            },
            Error::NotFound { resource_type, id } => {
                ApiError::NotFound(format!("{} '{}' was not found", resource_type, id))
            }
            Error::Conflict { message, .. } => ApiError::Conflict(message),
            Error::Database { context, .. } => ApiError::Internal(context),
            Error::Config(msg) => ApiError::Internal(msg),
            Error::Internal { message, .. } => ApiError::Internal(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_mapping_preserves_status() {
        assert_eq!(
            ApiError::from(Error::validation("bad input")).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(Error::auth("no", AuthErrorType::InvalidToken)).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(Error::auth("no", AuthErrorType::InsufficientPermissions))
                .status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(Error::conflict("taken", "User")).status_code(),
            StatusCode::CONFLICT
        );
    }
}
