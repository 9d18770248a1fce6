//! # Storage and Persistence
//!
//! Database connectivity and the persistence layer for user and role
//! records. The store is the only shared mutable resource in the service;
//! nothing in the core caches user state across calls.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use migrations::run_migrations;
pub use pool::{create_pool, DbPool};
pub use repositories::{
    RoleRepository, SqlxRoleRepository, SqlxUserRepository, SqlxUserRoleRepository,
    UserRepository, UserRoleRepository,
};

use crate::errors::{Error, Result};

/// Check database connectivity
pub async fn check_connection(pool: &DbPool) -> Result<()> {
    sqlx::query("SELECT 1").fetch_one(pool).await.map_err(|e| Error::Database {
        source: e,
        context: "Database connectivity check failed".to_string(),
    })?;

    Ok(())
}
