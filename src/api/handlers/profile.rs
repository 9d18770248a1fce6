//! Handlers for user profile endpoints.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};

use crate::api::error::ApiError;
use crate::api::routes::ApiState;
use crate::auth::models::AuthContext;
use crate::auth::validation::UpdateProfileRequest;

/// GET /api/profiles
pub async fn get_profile(
    State(state): State<ApiState>,
    Extension(context): Extension<AuthContext>,
) -> Result<Response, ApiError> {
    let result = state.profile_service.get_profile(context.user_id.as_str()).await?;
    if result.is_success() {
        Ok((StatusCode::OK, Json(result)).into_response())
    } else {
        Ok((StatusCode::NOT_FOUND, Json(result)).into_response())
    }
}

/// PUT /api/profiles
pub async fn update_profile(
    State(state): State<ApiState>,
    Extension(context): Extension<AuthContext>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Response, ApiError> {
    let result =
        state.profile_service.update_profile(context.user_id.as_str(), &request).await?;
    if result.is_success() {
        Ok(StatusCode::NO_CONTENT.into_response())
    } else {
        Ok((StatusCode::CONFLICT, Json(result)).into_response())
    }
}
