//! # Database Migration Management
//!
//! Schema evolution via SQL migrations embedded in the binary and applied
//! automatically on startup. Applied versions are tracked in a
//! `schema_migrations` table so reruns are no-ops.

use crate::errors::{Error, Result};
use crate::storage::DbPool;
use tracing::info;

/// Embedded migrations: (version, description, sql).
const MIGRATIONS: &[(i64, &str, &str)] = &[(
    1,
    "create users, roles and user_roles",
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        email TEXT NOT NULL,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        middle_name TEXT,
        gender TEXT NOT NULL,
        birth_date TEXT NOT NULL,
        phone_number TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        password_salt TEXT NOT NULL,
        active INTEGER NOT NULL DEFAULT 1,
        failed_login_attempts INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE UNIQUE INDEX IF NOT EXISTS idx_users_email ON users (email);

    CREATE TABLE IF NOT EXISTS roles (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL UNIQUE
    );

    CREATE TABLE IF NOT EXISTS user_roles (
        user_id TEXT NOT NULL REFERENCES users (id),
        role_id INTEGER NOT NULL REFERENCES roles (id),
        PRIMARY KEY (user_id, role_id)
    );

    INSERT OR IGNORE INTO roles (id, name) VALUES
        (1, 'Administrator'),
        (2, 'Teacher'),
        (3, 'Student');
    "#,
)];

/// Apply all embedded migrations that have not run yet.
pub async fn run_migrations(pool: &DbPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            description TEXT NOT NULL,
            installed_on TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| Error::Database {
        source: e,
        context: "Failed to create schema_migrations table".to_string(),
    })?;

    for (version, description, sql) in MIGRATIONS {
        let applied: Option<i64> =
            sqlx::query_scalar("SELECT version FROM schema_migrations WHERE version = ?")
                .bind(version)
                .fetch_optional(pool)
                .await
                .map_err(|e| Error::Database {
                    source: e,
                    context: "Failed to read schema_migrations".to_string(),
                })?;

        if applied.is_some() {
            continue;
        }

        sqlx::raw_sql(sql).execute(pool).await.map_err(|e| Error::Database {
            source: e,
            context: format!("Failed to apply migration {} ({})", version, description),
        })?;

        sqlx::query(
            "INSERT INTO schema_migrations (version, description, installed_on) VALUES (?, ?, ?)",
        )
        .bind(version)
        .bind(description)
        .bind(chrono::Utc::now())
        .execute(pool)
        .await
        .map_err(|e| Error::Database {
            source: e,
            context: "Failed to record applied migration".to_string(),
        })?;

        info!(version, description, "Applied database migration");
    }

    Ok(())
}
