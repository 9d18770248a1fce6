//! Handlers for authentication and credential lifecycle endpoints.
//!
//! Thin plumbing: each handler validates nothing itself — it hands the
//! request to the service and maps the uniform result onto a status code.
//! Soft failures come back as 409 with the result body, matching the
//! service's one-error-per-failure contract.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};

use crate::api::error::ApiError;
use crate::api::routes::ApiState;
use crate::auth::models::{AuthContext, ServiceResult};
use crate::auth::validation::{
    ChangePasswordRequest, GrantUserRolesRequest, LoginRequest, RegisterRequest,
};
use crate::auth::ADMINISTRATOR_ROLE;
use crate::errors::{AuthErrorType, Error};

fn require_administrator(context: &AuthContext) -> Result<(), ApiError> {
    if context.has_role(ADMINISTRATOR_ROLE) {
        Ok(())
    } else {
        Err(ApiError::from(Error::auth(
            "Administrator role required",
            AuthErrorType::InsufficientPermissions,
        )))
    }
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<ApiState>,
    Json(request): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let result = state.auth_service.login(&request).await?;
    if result.is_success() {
        Ok((StatusCode::OK, Json(result)).into_response())
    } else {
        Ok((StatusCode::CONFLICT, Json(result)).into_response())
    }
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<ApiState>,
    Extension(context): Extension<AuthContext>,
    Json(request): Json<RegisterRequest>,
) -> Result<Response, ApiError> {
    require_administrator(&context)?;

    let result = state.auth_service.register(&request).await?;
    if result.is_success() {
        Ok(StatusCode::CREATED.into_response())
    } else {
        Ok((StatusCode::CONFLICT, Json(result)).into_response())
    }
}

/// PATCH /api/auth/grant-roles
pub async fn grant_user_roles(
    State(state): State<ApiState>,
    Extension(context): Extension<AuthContext>,
    Json(request): Json<GrantUserRolesRequest>,
) -> Result<Response, ApiError> {
    require_administrator(&context)?;

    let result = state.auth_service.grant_user_roles(&request).await?;
    respond_no_content(result)
}

/// PATCH /api/auth/change-password
pub async fn change_password(
    State(state): State<ApiState>,
    Extension(context): Extension<AuthContext>,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<Response, ApiError> {
    // Callers change their own password unless they administrate.
    if context.user_id.as_str() != request.user_id {
        require_administrator(&context)?;
    }

    let result = state.auth_service.change_password(&request).await?;
    respond_no_content(result)
}

/// PATCH /api/auth/unlock/{user_id}
pub async fn unlock_user(
    State(state): State<ApiState>,
    Extension(context): Extension<AuthContext>,
    Path(user_id): Path<String>,
) -> Result<Response, ApiError> {
    // Permission is decided by the service so the rejection is a uniform
    // soft failure, like every other business rule.
    let result = state.auth_service.unlock_user(&context.roles, &user_id).await?;
    respond_no_content(result)
}

fn respond_no_content(result: ServiceResult<()>) -> Result<Response, ApiError> {
    if result.is_success() {
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Ok((StatusCode::CONFLICT, Json(result)).into_response())
    }
}
