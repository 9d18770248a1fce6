//! Validation helpers and request DTOs for the auth and profile services.
//!
//! Shape validation runs before any repository access. Failures surface as
//! soft `ServiceResult` failures carrying the first violated rule's message,
//! never as errors.

use std::borrow::Cow;

use chrono::{NaiveDate, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::auth::user::Gender;
use crate::domain::RoleId;

lazy_static! {
    // E.164-style: optional +, no leading zero, 15 digits max
    static ref PHONE_REGEX: Regex =
        Regex::new(r"^\+?[1-9]\d{1,14}$").expect("PHONE_REGEX should be a valid regex pattern");
}

const PASSWORD_MIN: u64 = 8;
const PASSWORD_MAX: u64 = 30;

/// Credentials presented at login.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 256, message = "Login must be between 1 and 256 characters long."))]
    pub login: String,
    #[validate(length(min = 8, max = 30, message = "Password must be between 8 and 30 characters long."))]
    pub password: String,
}

/// Request to register a new user account with one initial role.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(
        email(message = "Email address is not valid."),
        length(max = 256, message = "Email must be at most 256 characters long.")
    )]
    pub email: String,
    #[validate(length(min = 1, max = 100, message = "First name must be between 1 and 100 characters long."))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name must be between 1 and 100 characters long."))]
    pub last_name: String,
    #[validate(length(max = 100, message = "Middle name must be at most 100 characters long."))]
    pub middle_name: Option<String>,
    pub gender: Gender,
    #[validate(custom(function = validate_birth_date))]
    pub birth_date: NaiveDate,
    #[validate(custom(function = validate_phone_number))]
    pub phone_number: String,
    #[validate(length(min = 8, max = 30, message = "Password must be between 8 and 30 characters long."))]
    pub password: String,
    #[validate(range(min = 1, message = "Role ID must be a positive number."))]
    pub role_id: RoleId,
}

/// Request to grant additional roles to an existing user.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GrantUserRolesRequest {
    #[validate(length(min = 1, message = "User ID must not be empty."))]
    pub user_id: String,
    #[validate(length(min = 1, message = "At least one role must be specified."))]
    pub role_ids: Vec<RoleId>,
}

/// Request to change a user's password.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub user_id: String,
    pub old_password: String,
    pub new_password: String,
}

impl Validate for ChangePasswordRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        if self.user_id.is_empty() {
            return Err(single_error("user_id", "User ID must not be empty."));
        }

        for (field, value) in
            [("old_password", &self.old_password), ("new_password", &self.new_password)]
        {
            let len = value.chars().count() as u64;
            if !(PASSWORD_MIN..=PASSWORD_MAX).contains(&len) {
                return Err(single_error(
                    field,
                    "Password must be between 8 and 30 characters long.",
                ));
            }
        }

        if self.new_password == self.old_password {
            return Err(single_error(
                "new_password",
                "New password should differ from the previous one.",
            ));
        }

        Ok(())
    }
}

/// Request to update a user's profile record.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(
        email(message = "Email address is not valid."),
        length(max = 256, message = "Email must be at most 256 characters long.")
    )]
    pub email: String,
    #[validate(length(min = 1, max = 100, message = "First name must be between 1 and 100 characters long."))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name must be between 1 and 100 characters long."))]
    pub last_name: String,
    #[validate(length(max = 100, message = "Middle name must be at most 100 characters long."))]
    pub middle_name: Option<String>,
    pub gender: Gender,
    #[validate(custom(function = validate_birth_date))]
    pub birth_date: NaiveDate,
    #[validate(custom(function = validate_phone_number))]
    pub phone_number: String,
}

fn validate_phone_number(phone_number: &str) -> Result<(), ValidationError> {
    if phone_number.len() <= 20 && PHONE_REGEX.is_match(phone_number) {
        Ok(())
    } else {
        let mut err = ValidationError::new("phone_number");
        err.message = Some(Cow::Borrowed("Phone number is not valid."));
        Err(err)
    }
}

fn validate_birth_date(birth_date: &NaiveDate) -> Result<(), ValidationError> {
    if *birth_date < Utc::now().date_naive() {
        Ok(())
    } else {
        let mut err = ValidationError::new("birth_date");
        err.message = Some(Cow::Borrowed("Please enter an actual birth date."));
        Err(err)
    }
}

fn single_error(field: &'static str, message: &'static str) -> ValidationErrors {
    let mut err = ValidationError::new(field);
    err.message = Some(Cow::Borrowed(message));
    let mut errors = ValidationErrors::new();
    errors.add(field, err);
    errors
}

/// First violated rule's message, for the single error string a soft failure
/// carries.
pub fn first_validation_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|field_errors| field_errors.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Request validation failed.".to_string())
}
