//! Axum middleware for request authentication.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Method, Request},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::api::error::ApiError;
use crate::auth::models::AuthContext;
use crate::auth::token::TokenIssuer;
use crate::domain::UserId;
use crate::errors::{AuthErrorType, Error};

pub type TokenIssuerState = Arc<TokenIssuer>;

/// Middleware entry point that authenticates requests with a bearer token.
///
/// On success the verified claims are exposed to handlers as an
/// [`AuthContext`] request extension.
pub async fn authenticate(
    State(token_issuer): State<TokenIssuerState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    if request.method() == Method::OPTIONS {
        return Ok(next.run(request).await);
    }

    let header =
        request.headers().get(AUTHORIZATION).and_then(|value| value.to_str().ok()).unwrap_or("");

    let token = match header.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => token.trim(),
        _ => {
            return Err(ApiError::from(Error::auth(
                "Missing bearer token",
                AuthErrorType::MissingToken,
            )))
        }
    };

    match token_issuer.verify(token) {
        Ok(claims) => {
            let context = AuthContext {
                user_id: UserId::from_str_unchecked(&claims.sub),
                name: claims.name,
                roles: claims.roles,
            };
            request.extensions_mut().insert(context);
            Ok(next.run(request).await)
        }
        Err(err) => {
            warn!(error = %err, "authentication failed");
            Err(ApiError::from(err))
        }
    }
}
