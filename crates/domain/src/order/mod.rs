//! Order aggregate and related types.

mod aggregate;
mod service;
mod status;
mod value_objects;

pub use aggregate::Order;
pub use service::OrderService;
pub use status::OrderStatus;
pub use value_objects::{Money, OrderItem, StatusChange};

use common::OrderId;
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Pay or cancel attempted on an already-paid order.
    #[error("Order {order_id} is already paid")]
    AlreadyPaid { order_id: OrderId },

    /// A mutating operation was attempted on a cancelled order.
    #[error("Order {order_id} is cancelled")]
    Cancelled { order_id: OrderId },

    /// Item quantity must be greater than zero.
    #[error("Invalid quantity: {quantity} (must be greater than 0)")]
    InvalidQuantity { quantity: u32 },

    /// Item unit price must not be negative.
    #[error("Invalid price: {price} cents (must not be negative)")]
    InvalidPrice { price: i64 },

    /// The order is not in the state required for the transition.
    #[error("Invalid transition: {reason} (current status: {current_status})")]
    InvalidTransition {
        current_status: OrderStatus,
        reason: &'static str,
    },
}
