//! Service-level error type.

use common::{OrderId, UserId};
use thiserror::Error;

use crate::order::OrderError;
use crate::repository::RepositoryError;
use crate::user::UserError;

/// Errors surfaced by the application services.
///
/// Domain and validation failures propagate unmodified; storage
/// failures are wrapped as [`DomainError::Repository`] and stay
/// distinct from the domain taxonomy.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Referenced user id does not resolve.
    #[error("User not found: {user_id}")]
    UserNotFound { user_id: UserId },

    /// Registration attempted with an email that is already taken.
    #[error("Email already exists: {email}")]
    EmailAlreadyExists { email: String },

    /// Referenced order id does not resolve.
    #[error("Order not found: {order_id}")]
    OrderNotFound { order_id: OrderId },

    /// A user entity validation failed.
    #[error(transparent)]
    User(#[from] UserError),

    /// An order operation failed.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// A storage I/O failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
