//! Router assembly and shared handler state.

use std::sync::Arc;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::api::handlers;
use crate::api::middleware::authenticate;
use crate::auth::profile_service::ProfileService;
use crate::auth::service::AuthService;
use crate::auth::token::TokenIssuer;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct ApiState {
    pub auth_service: AuthService,
    pub profile_service: ProfileService,
    pub token_issuer: Arc<TokenIssuer>,
}

/// Build the service router.
///
/// Login is the only unauthenticated endpoint; everything else sits behind
/// the bearer-token middleware.
pub fn build_router(state: ApiState, enable_cors: bool) -> Router {
    let public = Router::new().route("/api/auth/login", post(handlers::auth::login));

    let protected = Router::new()
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/grant-roles", patch(handlers::auth::grant_user_roles))
        .route("/api/auth/change-password", patch(handlers::auth::change_password))
        .route("/api/auth/unlock/{user_id}", patch(handlers::auth::unlock_user))
        .route(
            "/api/profiles",
            get(handlers::profile::get_profile).put(handlers::profile::update_profile),
        )
        .layer(from_fn_with_state(state.token_issuer.clone(), authenticate));

    let router = Router::new()
        .merge(public)
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}
