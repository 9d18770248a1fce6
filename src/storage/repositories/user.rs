//! User repository for account persistence
//!
//! Provides account lookup and the guarded mutations the auth core relies
//! on: the compare-and-swap failed-login update and the locked-row-only
//! unlock.

use crate::auth::user::{Gender, NewUser, User, UserProfile};
use crate::domain::UserId;
use crate::errors::{Error, Result};
use crate::storage::DbPool;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use std::str::FromStr;
use tracing::instrument;

// Database row structure

#[derive(Debug, Clone, FromRow)]
struct UserRow {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub gender: String,
    pub birth_date: NaiveDate,
    pub phone_number: String,
    pub password_hash: String,
    pub password_salt: String,
    pub active: bool,
    pub failed_login_attempts: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const USER_COLUMNS: &str = "id, email, first_name, last_name, middle_name, gender, birth_date, \
                            phone_number, password_hash, password_salt, active, \
                            failed_login_attempts, created_at, updated_at";

// Repository trait

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user. Returns `Error::Conflict` when the email is taken.
    async fn create_user(&self, user: NewUser) -> Result<User>;

    /// Get a user by ID
    async fn get_user(&self, id: &UserId) -> Result<Option<User>>;

    /// Get a user by email (case-sensitive exact match)
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Check whether a user row exists
    async fn user_exists(&self, id: &UserId) -> Result<bool>;

    /// Persist a failed login attempt with compare-and-swap semantics.
    ///
    /// The update only lands when the stored counter still equals
    /// `expected_attempts`; returns false when a concurrent attempt moved it
    /// first, in which case the caller reloads and re-evaluates.
    async fn record_failed_login(
        &self,
        id: &UserId,
        expected_attempts: u32,
        new_attempts: u32,
        active: bool,
    ) -> Result<bool>;

    /// Replace a user's password hash (the salt never changes)
    async fn update_password(&self, id: &UserId, password_hash: String) -> Result<bool>;

    /// Reactivate a locked user and reset the attempt counter.
    ///
    /// Guarded: only flips a row that is currently inactive.
    async fn unlock_user(&self, id: &UserId) -> Result<bool>;

    /// Update a user's profile fields
    async fn update_profile(&self, id: &UserId, profile: &UserProfile) -> Result<bool>;

    /// Delete a user row (compensation path for failed registration)
    async fn remove_user(&self, id: &UserId) -> Result<bool>;
}

// SQLite implementation

#[derive(Debug, Clone)]
pub struct SqlxUserRepository {
    pool: DbPool,
}

impl SqlxUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn row_to_user(&self, row: UserRow) -> Result<User> {
        let gender = Gender::from_str(&row.gender)
            .map_err(|_| Error::internal(format!("Unknown gender value '{}'", row.gender)))?;

        Ok(User {
            id: UserId::from_string(row.id),
            email: row.email,
            first_name: row.first_name,
            last_name: row.last_name,
            middle_name: row.middle_name,
            gender,
            birth_date: row.birth_date,
            phone_number: row.phone_number,
            password_hash: row.password_hash,
            password_salt: row.password_salt,
            active: row.active,
            failed_login_attempts: row.failed_login_attempts.max(0) as u32,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    #[instrument(skip(self, user), fields(user_email = %user.email, user_id = %user.id), name = "db_create_user")]
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO users (id, email, first_name, last_name, middle_name, gender, birth_date,
                               phone_number, password_hash, password_salt, active,
                               failed_login_attempts, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, 0, ?, ?)
            "#,
        )
        .bind(user.id.as_str())
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.middle_name)
        .bind(user.gender.as_str())
        .bind(user.birth_date)
        .bind(&user.phone_number)
        .bind(&user.password_hash)
        .bind(&user.password_salt)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|err| match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                Error::conflict(format!("User with email '{}' already exists", user.email), "User")
            }
            _ => Error::Database { source: err, context: "Failed to create user".to_string() },
        })?;

        self.get_user(&user.id)
            .await?
            .ok_or_else(|| Error::internal("User not found after creation"))
    }

    #[instrument(skip(self), fields(user_id = %id), name = "db_get_user")]
    async fn get_user(&self, id: &UserId) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = ?",
            USER_COLUMNS
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to fetch user".to_string(),
        })?;

        row.map(|r| self.row_to_user(r)).transpose()
    }

    #[instrument(skip(self), fields(user_email = %email), name = "db_get_user_by_email")]
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = ?",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to fetch user by email".to_string(),
        })?;

        row.map(|r| self.row_to_user(r)).transpose()
    }

    #[instrument(skip(self), fields(user_id = %id), name = "db_user_exists")]
    async fn user_exists(&self, id: &UserId) -> Result<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE id = ?")
            .bind(id.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|err| Error::Database {
                source: err,
                context: "Failed to check user existence".to_string(),
            })?;

        Ok(count > 0)
    }

    #[instrument(
        skip(self),
        fields(user_id = %id, expected = expected_attempts, new = new_attempts),
        name = "db_record_failed_login"
    )]
    async fn record_failed_login(
        &self,
        id: &UserId,
        expected_attempts: u32,
        new_attempts: u32,
        active: bool,
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET failed_login_attempts = ?, active = ?, updated_at = ?
            WHERE id = ? AND failed_login_attempts = ? AND active = 1
            "#,
        )
        .bind(new_attempts as i64)
        .bind(active)
        .bind(Utc::now())
        .bind(id.as_str())
        .bind(expected_attempts as i64)
        .execute(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to record login attempt".to_string(),
        })?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, password_hash), fields(user_id = %id), name = "db_update_password")]
    async fn update_password(&self, id: &UserId, password_hash: String) -> Result<bool> {
        let result = sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
            .bind(&password_hash)
            .bind(Utc::now())
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|err| Error::Database {
                source: err,
                context: "Failed to update password".to_string(),
            })?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(user_id = %id), name = "db_unlock_user")]
    async fn unlock_user(&self, id: &UserId) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET active = 1, failed_login_attempts = 0, updated_at = ?
            WHERE id = ? AND active = 0
            "#,
        )
        .bind(Utc::now())
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to unlock user".to_string(),
        })?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, profile), fields(user_id = %id), name = "db_update_profile")]
    async fn update_profile(&self, id: &UserId, profile: &UserProfile) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET email = ?, first_name = ?, last_name = ?, middle_name = ?, gender = ?,
                birth_date = ?, phone_number = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&profile.email)
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.middle_name)
        .bind(profile.gender.as_str())
        .bind(profile.birth_date)
        .bind(&profile.phone_number)
        .bind(Utc::now())
        .bind(id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|err| match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => Error::conflict(
                format!("User with email '{}' already exists", profile.email),
                "User",
            ),
            _ => Error::Database {
                source: err,
                context: "Failed to update user profile".to_string(),
            },
        })?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(user_id = %id), name = "db_remove_user")]
    async fn remove_user(&self, id: &UserId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|err| Error::Database {
                source: err,
                context: "Failed to remove user".to_string(),
            })?;

        Ok(result.rows_affected() > 0)
    }
}
