//! Authentication and credential lifecycle service.
//!
//! Orchestrates login, registration, role granting, password change, and
//! administrative unlock over the repository traits. Business-rule failures
//! come back as [`ServiceResult`] soft failures with a single message;
//! only unexpected storage faults propagate as errors.

use std::sync::Arc;

use tracing::{info, instrument, warn};
use validator::Validate;

use crate::auth::hashing;
use crate::auth::lockout;
use crate::auth::models::ServiceResult;
use crate::auth::token::TokenIssuer;
use crate::auth::user::{NewUser, UserRole, ADMINISTRATOR_ROLE};
use crate::auth::validation::{
    first_validation_message, ChangePasswordRequest, GrantUserRolesRequest, LoginRequest,
    RegisterRequest,
};
use crate::domain::UserId;
use crate::errors::{Error, Result};
use crate::storage::repositories::{
    RoleRepository, SqlxRoleRepository, SqlxUserRepository, SqlxUserRoleRepository,
    UserRepository, UserRoleRepository,
};

/// Reload budget for the failed-login compare-and-swap. Sustained misses
/// mean pathological contention on one account and surface as an internal
/// error rather than a business outcome.
const LOCKOUT_CAS_RETRIES: u32 = 3;

/// Service for authentication and credential lifecycle operations.
#[derive(Clone)]
pub struct AuthService {
    user_repository: Arc<dyn UserRepository>,
    role_repository: Arc<dyn RoleRepository>,
    user_role_repository: Arc<dyn UserRoleRepository>,
    token_issuer: Arc<TokenIssuer>,
}

impl AuthService {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        role_repository: Arc<dyn RoleRepository>,
        user_role_repository: Arc<dyn UserRoleRepository>,
        token_issuer: Arc<TokenIssuer>,
    ) -> Self {
        Self { user_repository, role_repository, user_role_repository, token_issuer }
    }

    pub fn with_sqlx(pool: crate::storage::DbPool, token_issuer: Arc<TokenIssuer>) -> Self {
        Self::new(
            Arc::new(SqlxUserRepository::new(pool.clone())),
            Arc::new(SqlxRoleRepository::new(pool.clone())),
            Arc::new(SqlxUserRoleRepository::new(pool)),
            token_issuer,
        )
    }

    /// Authenticate a user by email and password.
    ///
    /// On success returns a signed token carrying the user's id, email, and
    /// current role set. A wrong password increments the failed-attempt
    /// counter through a compare-and-swap so concurrent attempts cannot lose
    /// updates or trigger the lockout twice; crossing the threshold
    /// deactivates the account until an administrator unlocks it.
    #[instrument(skip(self, request), fields(login = %request.login))]
    pub async fn login(&self, request: &LoginRequest) -> Result<ServiceResult<String>> {
        if let Err(errors) = request.validate() {
            return Ok(ServiceResult::failure(first_validation_message(&errors)));
        }

        let mut user = match self.user_repository.get_user_by_email(&request.login).await? {
            Some(user) => user,
            None => {
                warn!(login = %request.login, "login attempt for non-existent user");
                return Ok(ServiceResult::failure("User was not found."));
            }
        };

        for _ in 0..=LOCKOUT_CAS_RETRIES {
            if user.is_locked() {
                warn!(user_id = %user.id, "login attempt for blocked user");
                return Ok(ServiceResult::failure(
                    "User is blocked. Please contact the administrator team.",
                ));
            }

            let password_valid = hashing::verify_password(
                &request.password,
                &user.password_salt,
                &user.password_hash,
            )?;

            if password_valid {
                let roles = self.role_repository.list_roles_for_user(&user.id).await?;
                let role_names: Vec<String> = roles.into_iter().map(|r| r.name).collect();
                let token = self.token_issuer.issue(&user.id, &user.email, &role_names)?;

                info!(user_id = %user.id, email = %user.email, "user logged in successfully");
                return Ok(ServiceResult::ok(token));
            }

            let decision = lockout::evaluate(user.failed_login_attempts, false);
            let persisted = self
                .user_repository
                .record_failed_login(
                    &user.id,
                    user.failed_login_attempts,
                    decision.failed_attempts,
                    !decision.lock_account,
                )
                .await?;

            if persisted {
                if decision.lock_account {
                    warn!(
                        email = %user.email,
                        failed_attempts = decision.failed_attempts,
                        "user was blocked after repeated failed login attempts"
                    );
                }
                return Ok(ServiceResult::failure(format!(
                    "Invalid password. You have {} login attempt(s) left.",
                    lockout::attempts_remaining(decision.failed_attempts)
                )));
            }

            // Counter moved underneath us; reload and re-evaluate.
            user = self
                .user_repository
                .get_user(&user.id)
                .await?
                .ok_or_else(|| Error::not_found("User", user.id.as_str()))?;
        }

        Err(Error::internal("Failed login persistence exceeded its retry budget"))
    }

    /// Register a new user account with exactly one initial role.
    ///
    /// The user insert and the role insert are separate persistence calls;
    /// when the second fails the first is compensated by deleting the user
    /// row, so no account is left without a role.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<ServiceResult<()>> {
        if let Err(errors) = request.validate() {
            return Ok(ServiceResult::failure(first_validation_message(&errors)));
        }

        if self.user_repository.get_user_by_email(&request.email).await?.is_some() {
            return Ok(ServiceResult::failure("User with such email already exists."));
        }

        let credential = hashing::hash_password(&request.password, None)?;
        let new_user = NewUser {
            id: UserId::new(),
            email: request.email.clone(),
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            middle_name: request.middle_name.clone(),
            gender: request.gender,
            birth_date: request.birth_date,
            phone_number: request.phone_number.clone(),
            password_hash: credential.hash,
            password_salt: credential.salt,
        };

        let user = match self.user_repository.create_user(new_user).await {
            Ok(user) => user,
            // A concurrent registration won the email; same outcome as any
            // other rejected insert.
            Err(Error::Conflict { .. }) => {
                return Ok(ServiceResult::failure("User was not created."))
            }
            Err(err) => return Err(err),
        };

        info!(email = %user.email, "a new user account has been created");

        let role_granted = self
            .user_role_repository
            .insert(UserRole { user_id: user.id.clone(), role_id: request.role_id })
            .await;

        match role_granted {
            Ok(true) => {
                info!(user_id = %user.id, role_id = request.role_id, "user was granted its initial role");
                Ok(ServiceResult::ok_empty())
            }
            Ok(false) => {
                self.compensate_failed_registration(&user.id).await;
                Ok(ServiceResult::failure("Failed to create a user and assign it to the role."))
            }
            Err(err) => {
                self.compensate_failed_registration(&user.id).await;
                Err(err)
            }
        }
    }

    async fn compensate_failed_registration(&self, user_id: &UserId) {
        // Best-effort: the registration failure message wins either way.
        match self.user_repository.remove_user(user_id).await {
            Ok(_) => {}
            Err(err) => {
                warn!(user_id = %user_id, error = %err, "failed to compensate partial registration")
            }
        }
    }

    /// Grant additional roles to an existing user, all-or-nothing.
    #[instrument(skip(self, request), fields(user_id = %request.user_id))]
    pub async fn grant_user_roles(
        &self,
        request: &GrantUserRolesRequest,
    ) -> Result<ServiceResult<()>> {
        if let Err(errors) = request.validate() {
            return Ok(ServiceResult::failure(first_validation_message(&errors)));
        }

        let user_id = UserId::from_str_unchecked(&request.user_id);
        if !self.user_repository.user_exists(&user_id).await? {
            return Ok(ServiceResult::failure("User does not exist."));
        }

        let known_roles = self.role_repository.list_roles_by_ids(&request.role_ids).await?;
        if known_roles.len() != request.role_ids.len() {
            return Ok(ServiceResult::failure(
                "You have specified not existing role(s). Please review the list.",
            ));
        }

        let existing = self.user_role_repository.list_role_ids_for_user(&user_id).await?;
        let already_granted =
            request.role_ids.iter().any(|role_id| existing.contains(role_id));
        if already_granted {
            return Ok(ServiceResult::failure("The user already has some of the roles."));
        }

        let rows: Vec<UserRole> = request
            .role_ids
            .iter()
            .map(|&role_id| UserRole { user_id: user_id.clone(), role_id })
            .collect();

        if self.user_role_repository.insert_batch(rows).await? {
            info!(user_id = %user_id, role_ids = ?request.role_ids, "user has been granted roles");
            Ok(ServiceResult::ok_empty())
        } else {
            Ok(ServiceResult::failure("Failed to grant roles."))
        }
    }

    /// Change a user's password after verifying the old one.
    ///
    /// The stored salt is reused, never rotated; this has no interaction
    /// with the login lockout counter.
    #[instrument(skip(self, request), fields(user_id = %request.user_id))]
    pub async fn change_password(
        &self,
        request: &ChangePasswordRequest,
    ) -> Result<ServiceResult<()>> {
        if let Err(errors) = request.validate() {
            return Ok(ServiceResult::failure(first_validation_message(&errors)));
        }

        let user_id = UserId::from_str_unchecked(&request.user_id);
        let user = match self.user_repository.get_user(&user_id).await? {
            Some(user) => user,
            None => return Ok(ServiceResult::failure("User was not found.")),
        };

        let old_password_valid = hashing::verify_password(
            &request.old_password,
            &user.password_salt,
            &user.password_hash,
        )?;
        if !old_password_valid {
            return Ok(ServiceResult::failure("Invalid old password."));
        }

        let credential =
            hashing::hash_password(&request.new_password, Some(&user.password_salt))?;

        if self.user_repository.update_password(&user.id, credential.hash).await? {
            info!(user_id = %user.id, "password has been updated");
            Ok(ServiceResult::ok_empty())
        } else {
            Ok(ServiceResult::failure("Failed to change a password."))
        }
    }

    /// Reactivate a locked account and reset its attempt counter.
    ///
    /// Restricted to callers holding the Administrator role. Unlocking an
    /// account that is already active is rejected, not silently accepted.
    #[instrument(skip(self, caller_roles), fields(user_id = %user_id))]
    pub async fn unlock_user(
        &self,
        caller_roles: &[String],
        user_id: &str,
    ) -> Result<ServiceResult<()>> {
        let is_administrator =
            caller_roles.iter().any(|role| role.eq_ignore_ascii_case(ADMINISTRATOR_ROLE));
        if !is_administrator {
            return Ok(ServiceResult::failure("You do not have permission to unlock users."));
        }

        if user_id.trim().is_empty() {
            return Ok(ServiceResult::failure("User ID is not valid."));
        }

        let user_id = UserId::from_str_unchecked(user_id);
        let user = match self.user_repository.get_user(&user_id).await? {
            Some(user) => user,
            None => return Ok(ServiceResult::failure("User ID is not valid.")),
        };

        if user.active {
            return Ok(ServiceResult::failure("User is already active."));
        }

        if self.user_repository.unlock_user(&user.id).await? {
            info!(email = %user.email, "user has been unlocked");
            Ok(ServiceResult::ok_empty())
        } else {
            Ok(ServiceResult::failure("Failed to unlock the user."))
        }
    }
}
