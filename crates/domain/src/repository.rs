//! Repository traits consumed by the application services.
//!
//! These are the persistence ports of the system; the storage crate
//! provides in-memory and PostgreSQL implementations. Storage I/O
//! failures surface as the opaque [`RepositoryError`], kept separate
//! from the domain error taxonomy.

use async_trait::async_trait;
use common::{OrderId, UserId};
use thiserror::Error;

use crate::order::Order;
use crate::user::User;

/// Opaque infrastructure error raised by repository implementations.
#[derive(Debug, Error)]
#[error("repository error: {0}")]
pub struct RepositoryError(Box<dyn std::error::Error + Send + Sync>);

impl RepositoryError {
    /// Wraps an arbitrary backend error.
    pub fn new(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Box::new(source))
    }

    /// Wraps a plain message.
    pub fn message(msg: impl Into<String>) -> Self {
        Self(msg.into().into())
    }
}

/// Result type for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Persistence port for users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Upserts a user by id.
    async fn save(&self, user: &User) -> RepositoryResult<()>;

    /// Looks up a user by id.
    async fn find_by_id(&self, id: UserId) -> RepositoryResult<Option<User>>;

    /// Looks up a user by email.
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;

    /// Returns all users, order unspecified.
    async fn find_all(&self) -> RepositoryResult<Vec<User>>;
}

/// Persistence port for order aggregates.
///
/// Implementations must make repeated saves of an aggregate
/// idempotent: the order row is upserted while already-present items
/// and history entries are left untouched (insert-if-absent).
///
/// Concurrent read-modify-write cycles against the same order are not
/// synchronized by the domain core; the implementation (or an external
/// locking layer) must guarantee single-writer-per-order so that e.g.
/// a pay and a cancel cannot both succeed on the same order.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persists the whole aggregate: order row, items, history.
    async fn save(&self, order: &Order) -> RepositoryResult<()>;

    /// Loads the full aggregate, history ascending by timestamp.
    ///
    /// Reconstruction goes through the `from_parts` constructors and
    /// must not re-validate previously stored data.
    async fn find_by_id(&self, id: OrderId) -> RepositoryResult<Option<Order>>;

    /// Returns all orders belonging to a user.
    async fn find_by_user(&self, user_id: UserId) -> RepositoryResult<Vec<Order>>;

    /// Returns all orders.
    async fn find_all(&self) -> RepositoryResult<Vec<Order>>;
}
