//! User profile read and update service.

use std::sync::Arc;

use tracing::{info, instrument};
use validator::Validate;

use crate::auth::models::ServiceResult;
use crate::auth::user::UserProfile;
use crate::auth::validation::{first_validation_message, UpdateProfileRequest};
use crate::domain::UserId;
use crate::errors::{Error, Result};
use crate::storage::repositories::{SqlxUserRepository, UserRepository};

/// Service for reading and updating user profile records.
#[derive(Clone)]
pub struct ProfileService {
    user_repository: Arc<dyn UserRepository>,
}

impl ProfileService {
    pub fn new(user_repository: Arc<dyn UserRepository>) -> Self {
        Self { user_repository }
    }

    pub fn with_sqlx(pool: crate::storage::DbPool) -> Self {
        Self::new(Arc::new(SqlxUserRepository::new(pool)))
    }

    /// Fetch the profile view of a user.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_profile(&self, user_id: &str) -> Result<ServiceResult<UserProfile>> {
        let user_id = UserId::from_str_unchecked(user_id);
        match self.user_repository.get_user(&user_id).await? {
            Some(user) => Ok(ServiceResult::ok(UserProfile::from(&user))),
            None => Ok(ServiceResult::failure("User not found.")),
        }
    }

    /// Replace the profile fields of a user.
    #[instrument(skip(self, request), fields(user_id = %user_id))]
    pub async fn update_profile(
        &self,
        user_id: &str,
        request: &UpdateProfileRequest,
    ) -> Result<ServiceResult<()>> {
        let user_id = UserId::from_str_unchecked(user_id);
        if self.user_repository.get_user(&user_id).await?.is_none() {
            return Ok(ServiceResult::failure("User not found."));
        }

        if let Err(errors) = request.validate() {
            return Ok(ServiceResult::failure(first_validation_message(&errors)));
        }

        let profile = UserProfile {
            email: request.email.clone(),
            first_name: request.first_name.clone(),
            last_name: request.last_name.clone(),
            middle_name: request.middle_name.clone(),
            gender: request.gender,
            birth_date: request.birth_date,
            phone_number: request.phone_number.clone(),
        };

        match self.user_repository.update_profile(&user_id, &profile).await {
            Ok(true) => {
                info!(user_id = %user_id, "user profile has been updated");
                Ok(ServiceResult::ok_empty())
            }
            Ok(false) => Ok(ServiceResult::failure("Failed to update a user profile.")),
            Err(Error::Conflict { .. }) => {
                Ok(ServiceResult::failure("User with such email already exists."))
            }
            Err(err) => Err(err),
        }
    }
}
