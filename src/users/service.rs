use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::error::AppError;
use crate::password::PasswordHasher;
use crate::users::guard::{ensure_email_available, ensure_username_available};
use crate::users::model::{NewUser, UpdateUser, User};
use crate::users::store::UserStore;

const USERNAME_NOT_FOUND: &str = "The username was not found in the system.";
const USERNAME_NOT_FOUND_ACTION: &str = "Check that the username is spelled correctly.";
const EMAIL_NOT_FOUND: &str = "The email was not found in the system.";
const EMAIL_NOT_FOUND_ACTION: &str = "Check that the email is spelled correctly.";

/// Create, look up and update users on top of a [`UserStore`].
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    hasher: PasswordHasher,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, hasher: PasswordHasher) -> Self {
        Self { store, hasher }
    }

    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    /// Nothing is written unless every check and the hash succeed.
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn create(&self, input: NewUser) -> Result<User, AppError> {
        ensure_username_available(self.store.as_ref(), &input.username).await?;
        ensure_email_available(self.store.as_ref(), &input.email).await?;

        let password = self.hasher.hash(&input.password).await?;
        let user = self
            .store
            .insert(&NewUser { password, ..input })
            .await?;

        info!(user_id = %user.id, "user created");
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn find_by_username(&self, username: &str) -> Result<User, AppError> {
        self.store
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::not_found(USERNAME_NOT_FOUND, USERNAME_NOT_FOUND_ACTION))
    }

    #[instrument(skip(self))]
    pub async fn find_by_email(&self, email: &str) -> Result<User, AppError> {
        self.store
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::not_found(EMAIL_NOT_FOUND, EMAIL_NOT_FOUND_ACTION))
    }

    /// Partial update. Unlike the username, a supplied email is always
    /// re-checked, so patching a user with its own email is rejected.
    #[instrument(skip(self, patch))]
    pub async fn update(&self, username: &str, patch: UpdateUser) -> Result<User, AppError> {
        let current = self.find_by_username(username).await?;

        if let Some(new_username) = &patch.username {
            if new_username.to_lowercase() != current.username.to_lowercase() {
                ensure_username_available(self.store.as_ref(), new_username).await?;
            } else {
                debug!("case-only rename, skipping username check");
            }
        }

        if let Some(new_email) = &patch.email {
            ensure_email_available(self.store.as_ref(), new_email).await?;
        }

        let password = match &patch.password {
            Some(plain) => Some(self.hasher.hash(plain).await?),
            None => None,
        };

        let merged = current.merged(UpdateUser { password, ..patch });
        let updated = self.store.update(&merged).await?;

        info!(user_id = %updated.id, "user updated");
        Ok(updated)
    }
}
