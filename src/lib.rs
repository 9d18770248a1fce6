//! # unigate
//!
//! unigate is an authentication and credential-lifecycle service for
//! institutional applications: password hashing and verification,
//! login-attempt-based account lockout, JWT issuance, role granting, and
//! administrative unlock, fronted by a thin HTTP layer over a SQLite store.
//!
//! ## Architecture
//!
//! ```text
//! HTTP layer (axum) → Auth / Profile services → Repository traits (sqlx)
//!        ↓                     ↓
//! Bearer middleware      Hashing / Lockout / Token issuer
//! ```
//!
//! ## Core Components
//!
//! - **Credential hasher**: salted PBKDF2-HMAC-SHA256, deterministic per
//!   `(password, salt)` pair
//! - **Lockout policy**: pure decision logic; five failed attempts
//!   deactivate an account until an administrator unlocks it
//! - **Token issuer**: stateless HS256 JWTs carrying subject, name, and
//!   role claims
//! - **Auth service**: orchestrates login, registration, role granting,
//!   password change, and unlock over the repository layer

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod errors;
pub mod observability;
pub mod storage;

// Re-export commonly used types and traits
pub use config::AppConfig;
pub use errors::{Error, Result};
pub use observability::init_tracing;

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
