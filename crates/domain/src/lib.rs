//! Domain layer for the order management system.
//!
//! This crate provides:
//! - User and Order entities with invariant-enforcing constructors
//! - The order lifecycle state machine (created → paid → shipped →
//!   completed, with cancellation)
//! - Repository traits consumed by the application services
//! - UserService and OrderService orchestrating entities and storage

pub mod error;
pub mod order;
pub mod repository;
pub mod user;

pub use error::DomainError;
pub use order::{
    Money, Order, OrderError, OrderItem, OrderService, OrderStatus, StatusChange,
};
pub use repository::{OrderRepository, RepositoryError, UserRepository};
pub use user::{User, UserError, UserService};
