//! Role repository
//!
//! Roles are immutable reference data seeded by migration; this repository
//! only reads them, for grant validation and for embedding role claims in
//! tokens.

use crate::auth::user::Role;
use crate::domain::{RoleId, UserId};
use crate::errors::{Error, Result};
use crate::storage::DbPool;
use async_trait::async_trait;
use sqlx::FromRow;
use tracing::instrument;

#[derive(Debug, Clone, FromRow)]
struct RoleRow {
    pub id: i64,
    pub name: String,
}

#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Get all roles matching the given IDs
    async fn list_roles_by_ids(&self, ids: &[RoleId]) -> Result<Vec<Role>>;

    /// Get a user's granted roles, ordered by role id
    async fn list_roles_for_user(&self, user_id: &UserId) -> Result<Vec<Role>>;
}

#[derive(Debug, Clone)]
pub struct SqlxRoleRepository {
    pool: DbPool,
}

impl SqlxRoleRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleRepository for SqlxRoleRepository {
    #[instrument(skip(self, ids), fields(role_count = ids.len()), name = "db_list_roles_by_ids")]
    async fn list_roles_by_ids(&self, ids: &[RoleId]) -> Result<Vec<Role>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql =
            format!("SELECT id, name FROM roles WHERE id IN ({}) ORDER BY id", placeholders);

        let mut query = sqlx::query_as::<_, RoleRow>(&sql);
        for id in ids {
            query = query.bind(id);
        }

        let rows = query.fetch_all(&self.pool).await.map_err(|err| Error::Database {
            source: err,
            context: "Failed to list roles by ids".to_string(),
        })?;

        Ok(rows.into_iter().map(|r| Role { id: r.id, name: r.name }).collect())
    }

    #[instrument(skip(self), fields(user_id = %user_id), name = "db_list_roles_for_user")]
    async fn list_roles_for_user(&self, user_id: &UserId) -> Result<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT r.id, r.name
            FROM roles r
            INNER JOIN user_roles ur ON ur.role_id = r.id
            WHERE ur.user_id = ?
            ORDER BY r.id
            "#,
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to list roles for user".to_string(),
        })?;

        Ok(rows.into_iter().map(|r| Role { id: r.id, name: r.name }).collect())
    }
}
