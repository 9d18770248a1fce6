//! User and role domain models.
//!
//! This module defines the stored user account, the immutable role reference
//! data, and the user/role join record.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

use crate::auth::lockout::MAX_FAILED_LOGIN_ATTEMPTS;
use crate::domain::{RoleId, UserId};

/// Self-reported gender on a user profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl Display for Gender {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Gender {
    type Err = GenderParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            other => Err(GenderParseError(other.to_string())),
        }
    }
}

/// Error returned when gender parsing fails.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid gender: {0}")]
pub struct GenderParseError(pub String);

/// Stored representation of a user account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub gender: Gender,
    pub birth_date: NaiveDate,
    pub phone_number: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    #[serde(skip_serializing)]
    pub password_salt: String,
    pub active: bool,
    pub failed_login_attempts: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether the account may authenticate. Inactive means locked: the
    /// failed-attempt threshold was reached and no unlock has happened yet.
    pub fn is_locked(&self) -> bool {
        !self.active
    }

    /// Attempt counter stays within the policy bounds.
    pub fn attempts_in_bounds(&self) -> bool {
        self.failed_login_attempts <= MAX_FAILED_LOGIN_ATTEMPTS
    }
}

/// New user creation payload.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub gender: Gender,
    pub birth_date: NaiveDate,
    pub phone_number: String,
    pub password_hash: String,
    pub password_salt: String,
}

/// A named permission group. Immutable reference data; the core reads roles
/// to validate grants and to embed role claims in tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: RoleId,
    pub name: String,
}

/// Role name that authorizes administrative operations.
pub const ADMINISTRATOR_ROLE: &str = "Administrator";

/// Join record between a user and a role, unique per pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRole {
    pub user_id: UserId,
    pub role_id: RoleId,
}

/// Profile view of a user, exposed by the profile service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub middle_name: Option<String>,
    pub gender: Gender,
    pub birth_date: NaiveDate,
    pub phone_number: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            middle_name: user.middle_name.clone(),
            gender: user.gender,
            birth_date: user.birth_date,
            phone_number: user.phone_number.clone(),
        }
    }
}
