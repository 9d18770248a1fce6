//! HTTP boundary layer.
//!
//! Thin plumbing over the auth core: routing, bearer-token authentication,
//! and mapping of service results and errors onto responses. No business
//! rule lives here.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;

pub use error::ApiError;
pub use routes::{build_router, ApiState};
