//! Value objects for the order domain.

use chrono::{DateTime, Utc};
use common::{ItemId, OrderId, StatusChangeId};
use serde::{Deserialize, Serialize};

use super::{OrderError, OrderStatus};

/// Money amount represented in cents to avoid floating point issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money {
    /// Amount in cents (e.g., 1000 = $10.00)
    cents: i64,
}

impl Money {
    /// Creates a new Money amount from cents.
    pub fn from_cents(cents: i64) -> Self {
        Self { cents }
    }

    /// Returns zero money.
    pub fn zero() -> Self {
        Self { cents: 0 }
    }

    /// Returns the amount in cents.
    pub fn cents(&self) -> i64 {
        self.cents
    }

    /// Returns the dollar portion (whole number).
    pub fn dollars(&self) -> i64 {
        self.cents / 100
    }

    /// Returns the cents portion (remainder after dollars).
    pub fn cents_part(&self) -> i64 {
        self.cents.abs() % 100
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.cents == 0
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        self.cents < 0
    }

    /// Multiplies by a quantity.
    pub fn multiply(&self, quantity: u32) -> Money {
        Money {
            cents: self.cents * quantity as i64,
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.cents < 0 {
            write!(f, "-${}.{:02}", self.dollars().abs(), self.cents_part())
        } else {
            write!(f, "${}.{:02}", self.dollars(), self.cents_part())
        }
    }
}

impl std::ops::Add for Money {
    type Output = Money;

    fn add(self, rhs: Self) -> Self::Output {
        Money {
            cents: self.cents + rhs.cents,
        }
    }
}

impl std::ops::AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.cents += rhs.cents;
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

/// A line item in an order.
///
/// Items are created exclusively through [`super::Order::add_item`]
/// and are immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Unique item identifier.
    pub id: ItemId,

    /// The order this item belongs to.
    pub order_id: OrderId,

    /// Human-readable product name.
    pub product_name: String,

    /// Price per unit.
    pub price: Money,

    /// Quantity ordered, always greater than zero.
    pub quantity: u32,
}

impl OrderItem {
    /// Creates a new order item, validating quantity and price.
    pub fn new(
        product_name: impl Into<String>,
        price: Money,
        quantity: u32,
        order_id: OrderId,
    ) -> Result<Self, OrderError> {
        if quantity == 0 {
            return Err(OrderError::InvalidQuantity { quantity });
        }
        if price.is_negative() {
            return Err(OrderError::InvalidPrice {
                price: price.cents(),
            });
        }

        Ok(Self {
            id: ItemId::new(),
            order_id,
            product_name: product_name.into(),
            price,
            quantity,
        })
    }

    /// Reconstructs an item from stored state without validation.
    ///
    /// Only for storage adapters: persisted rows were valid under the
    /// rules in force when inserted and must load unconditionally.
    pub fn from_parts(
        id: ItemId,
        order_id: OrderId,
        product_name: String,
        price: Money,
        quantity: u32,
    ) -> Self {
        Self {
            id,
            order_id,
            product_name,
            price,
            quantity,
        }
    }

    /// Returns the subtotal for this item (price * quantity).
    pub fn subtotal(&self) -> Money {
        self.price.multiply(self.quantity)
    }
}

/// Append-only audit record of an order status transition.
///
/// One is created for every successful transition; the initial
/// CREATED status is never recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChange {
    /// Unique record identifier.
    pub id: StatusChangeId,

    /// The order this record belongs to.
    pub order_id: OrderId,

    /// The status the order entered.
    pub status: OrderStatus,

    /// When the transition happened.
    pub changed_at: DateTime<Utc>,
}

impl StatusChange {
    /// Records a transition into `status` at the current time.
    pub fn new(order_id: OrderId, status: OrderStatus) -> Self {
        Self {
            id: StatusChangeId::new(),
            order_id,
            status,
            changed_at: Utc::now(),
        }
    }

    /// Reconstructs a history entry from stored state.
    pub fn from_parts(
        id: StatusChangeId,
        order_id: OrderId,
        status: OrderStatus,
        changed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            order_id,
            status,
            changed_at,
        }
    }
}
