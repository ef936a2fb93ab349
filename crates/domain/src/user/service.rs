//! User registration and lookup service.

use common::UserId;

use crate::error::DomainError;
use crate::repository::UserRepository;

use super::User;

/// Service for user operations.
pub struct UserService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    /// Creates a new user service backed by the given repository.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Registers a new user.
    ///
    /// Fails with [`DomainError::EmailAlreadyExists`] if the email is
    /// taken and with [`DomainError::User`] if it is malformed.
    #[tracing::instrument(skip(self))]
    pub async fn register(
        &self,
        email: &str,
        name: &str,
    ) -> Result<User, DomainError> {
        if self.repo.find_by_email(email).await?.is_some() {
            return Err(DomainError::EmailAlreadyExists {
                email: email.to_string(),
            });
        }

        let user = User::new(email, name)?;
        self.repo.save(&user).await?;

        metrics::counter!("users_registered_total").increment(1);
        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }

    /// Returns a user by id, failing with [`DomainError::UserNotFound`]
    /// if absent.
    #[tracing::instrument(skip(self))]
    pub async fn get_by_id(&self, user_id: UserId) -> Result<User, DomainError> {
        self.repo
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::UserNotFound { user_id })
    }

    /// Returns a user by email. Absence is not an error.
    #[tracing::instrument(skip(self))]
    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        Ok(self.repo.find_by_email(email).await?)
    }

    /// Returns all users, order unspecified.
    #[tracing::instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>, DomainError> {
        Ok(self.repo.find_all().await?)
    }
}
