//! User/role join repository
//!
//! Join rows are created by registration and role granting, never updated,
//! and never deleted by the core. The composite primary key on
//! `(user_id, role_id)` is the backstop against concurrent duplicate grants.

use crate::auth::user::UserRole;
use crate::domain::{RoleId, UserId};
use crate::errors::{Error, Result};
use crate::storage::DbPool;
use async_trait::async_trait;
use tracing::instrument;

#[async_trait]
pub trait UserRoleRepository: Send + Sync {
    /// Insert a single join row. Returns false when the pair already exists
    /// or when either side of the pair does not.
    async fn insert(&self, user_role: UserRole) -> Result<bool>;

    /// Insert a batch of join rows in one transaction; all or nothing.
    /// Returns false when any pair already exists (the whole batch rolls
    /// back).
    async fn insert_batch(&self, user_roles: Vec<UserRole>) -> Result<bool>;

    /// Role ids already granted to a user
    async fn list_role_ids_for_user(&self, user_id: &UserId) -> Result<Vec<RoleId>>;
}

#[derive(Debug, Clone)]
pub struct SqlxUserRoleRepository {
    pool: DbPool,
}

impl SqlxUserRoleRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRoleRepository for SqlxUserRoleRepository {
    #[instrument(skip(self), fields(user_id = %user_role.user_id, role_id = user_role.role_id), name = "db_insert_user_role")]
    async fn insert(&self, user_role: UserRole) -> Result<bool> {
        let result = sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES (?, ?)")
            .bind(user_role.user_id.as_str())
            .bind(user_role.role_id)
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) => Ok(done.rows_affected() > 0),
            Err(sqlx::Error::Database(db))
                if db.is_unique_violation() || db.is_foreign_key_violation() =>
            {
                Ok(false)
            }
            Err(err) => Err(Error::Database {
                source: err,
                context: "Failed to insert user role".to_string(),
            }),
        }
    }

    #[instrument(skip(self, user_roles), fields(row_count = user_roles.len()), name = "db_insert_user_roles_batch")]
    async fn insert_batch(&self, user_roles: Vec<UserRole>) -> Result<bool> {
        if user_roles.is_empty() {
            return Ok(false);
        }

        let mut tx = self.pool.begin().await.map_err(|err| Error::Database {
            source: err,
            context: "Failed to begin role grant transaction".to_string(),
        })?;

        for user_role in &user_roles {
            let result = sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES (?, ?)")
                .bind(user_role.user_id.as_str())
                .bind(user_role.role_id)
                .execute(&mut *tx)
                .await;

            match result {
                Ok(_) => {}
                // Rolled back on drop; a duplicate pair fails the whole batch.
                Err(sqlx::Error::Database(db)) if db.is_unique_violation() => return Ok(false),
                Err(err) => {
                    return Err(Error::Database {
                        source: err,
                        context: "Failed to insert user role batch".to_string(),
                    })
                }
            }
        }

        tx.commit().await.map_err(|err| Error::Database {
            source: err,
            context: "Failed to commit role grant transaction".to_string(),
        })?;

        Ok(true)
    }

    #[instrument(skip(self), fields(user_id = %user_id), name = "db_list_role_ids_for_user")]
    async fn list_role_ids_for_user(&self, user_id: &UserId) -> Result<Vec<RoleId>> {
        let ids: Vec<i64> =
            sqlx::query_scalar("SELECT role_id FROM user_roles WHERE user_id = ? ORDER BY role_id")
                .bind(user_id.as_str())
                .fetch_all(&self.pool)
                .await
                .map_err(|err| Error::Database {
                    source: err,
                    context: "Failed to list role ids for user".to_string(),
                })?;

        Ok(ids)
    }
}
