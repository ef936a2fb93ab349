//! Shared identifier types used across the order management workspace.

pub mod types;

pub use types::{ItemId, OrderId, StatusChangeId, UserId};
