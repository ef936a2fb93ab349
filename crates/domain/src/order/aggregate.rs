//! Order aggregate implementation.

use chrono::{DateTime, Utc};
use common::{OrderId, UserId};
use serde::{Deserialize, Serialize};

use super::{Money, OrderError, OrderItem, OrderStatus, StatusChange};

/// Order aggregate root.
///
/// An order owns its line items and its status history; the three are
/// persisted and loaded together as one consistency unit. All
/// mutation goes through the methods below, which enforce the
/// lifecycle rules and keep `total_amount` equal to the sum of the
/// item subtotals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order identifier.
    pub id: OrderId,

    /// The user who owns this order.
    pub user_id: UserId,

    /// Current lifecycle status.
    status: OrderStatus,

    /// Sum of all item subtotals. Derived, never set by callers.
    total_amount: Money,

    /// When the order was created.
    pub created_at: DateTime<Utc>,

    /// Line items, in insertion order.
    items: Vec<OrderItem>,

    /// Status transitions, in the order they happened. The initial
    /// CREATED status is not recorded.
    status_history: Vec<StatusChange>,
}

impl Order {
    /// Creates a new empty order for a user.
    ///
    /// The caller (service layer) is responsible for checking that the
    /// user exists.
    pub fn new(user_id: UserId) -> Self {
        Self {
            id: OrderId::new(),
            user_id,
            status: OrderStatus::Created,
            total_amount: Money::zero(),
            created_at: Utc::now(),
            items: Vec::new(),
            status_history: Vec::new(),
        }
    }

    /// Reconstructs an order from stored state without validation.
    ///
    /// Only for storage adapters. Persisted aggregates were valid when
    /// written and must load even if construction rules have since
    /// tightened; no invariant is re-checked here.
    pub fn from_parts(
        id: OrderId,
        user_id: UserId,
        status: OrderStatus,
        total_amount: Money,
        created_at: DateTime<Utc>,
        items: Vec<OrderItem>,
        status_history: Vec<StatusChange>,
    ) -> Self {
        Self {
            id,
            user_id,
            status,
            total_amount,
            created_at,
            items,
            status_history,
        }
    }
}

// Query methods
impl Order {
    /// Returns the current status.
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Returns the total amount, always the sum of item subtotals.
    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    /// Returns the line items in insertion order.
    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    /// Returns the status history in transition order.
    pub fn status_history(&self) -> &[StatusChange] {
        &self.status_history
    }

    /// Returns true if the order is in a terminal status.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

// Mutation methods
impl Order {
    /// Adds a line item and recalculates the total.
    ///
    /// Fails with [`OrderError::Cancelled`] on a cancelled order and
    /// with [`OrderError::InvalidQuantity`] / [`OrderError::InvalidPrice`]
    /// if the item fails validation; in every failure case the item
    /// list and total are left untouched. No history entry is written.
    pub fn add_item(
        &mut self,
        product_name: impl Into<String>,
        price: Money,
        quantity: u32,
    ) -> Result<OrderItem, OrderError> {
        if self.status == OrderStatus::Cancelled {
            return Err(OrderError::Cancelled { order_id: self.id });
        }

        let item = OrderItem::new(product_name, price, quantity, self.id)?;
        self.items.push(item.clone());
        self.recalculate_total();
        Ok(item)
    }

    /// Marks the order as paid.
    ///
    /// Paying twice fails with [`OrderError::AlreadyPaid`]; paying a
    /// cancelled order fails with [`OrderError::Cancelled`].
    pub fn pay(&mut self) -> Result<(), OrderError> {
        if self.status == OrderStatus::Paid {
            return Err(OrderError::AlreadyPaid { order_id: self.id });
        }
        if self.status == OrderStatus::Cancelled {
            return Err(OrderError::Cancelled { order_id: self.id });
        }

        self.transition_to(OrderStatus::Paid);
        Ok(())
    }

    /// Cancels the order.
    ///
    /// Payment freezes cancellation: a paid order fails with
    /// [`OrderError::AlreadyPaid`]. Refund-based cancellation after
    /// payment is a compensation flow outside this core.
    pub fn cancel(&mut self) -> Result<(), OrderError> {
        if self.status == OrderStatus::Paid {
            return Err(OrderError::AlreadyPaid { order_id: self.id });
        }

        self.transition_to(OrderStatus::Cancelled);
        Ok(())
    }

    /// Marks the order as shipped. Requires PAID status.
    pub fn ship(&mut self) -> Result<(), OrderError> {
        if self.status != OrderStatus::Paid {
            return Err(OrderError::InvalidTransition {
                current_status: self.status,
                reason: "order must be paid before shipping",
            });
        }

        self.transition_to(OrderStatus::Shipped);
        Ok(())
    }

    /// Marks the order as completed. Requires SHIPPED status.
    pub fn complete(&mut self) -> Result<(), OrderError> {
        if self.status != OrderStatus::Shipped {
            return Err(OrderError::InvalidTransition {
                current_status: self.status,
                reason: "order must be shipped before completion",
            });
        }

        self.transition_to(OrderStatus::Completed);
        Ok(())
    }

    fn transition_to(&mut self, status: OrderStatus) {
        self.status = status;
        self.status_history.push(StatusChange::new(self.id, status));
    }

    fn recalculate_total(&mut self) {
        self.total_amount = self.items.iter().map(OrderItem::subtotal).sum();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order() -> Order {
        Order::new(UserId::new())
    }

    #[test]
    fn test_new_order_starts_empty() {
        let order = order();
        assert_eq!(order.status(), OrderStatus::Created);
        assert_eq!(order.total_amount(), Money::zero());
        assert!(order.items().is_empty());
        assert!(order.status_history().is_empty());
    }

    #[test]
    fn test_add_item_recalculates_total() {
        let mut order = order();
        let item = order
            .add_item("Widget", Money::from_cents(999), 3)
            .unwrap();

        assert_eq!(item.order_id, order.id);
        assert_eq!(item.subtotal().cents(), 2997);
        assert_eq!(order.total_amount().cents(), 2997);

        order.add_item("Gadget", Money::from_cents(500), 2).unwrap();
        assert_eq!(order.total_amount().cents(), 3997);
        assert_eq!(order.items().len(), 2);
    }

    #[test]
    fn test_add_item_appends_no_history() {
        let mut order = order();
        order.add_item("Widget", Money::from_cents(100), 1).unwrap();
        assert!(order.status_history().is_empty());
    }

    #[test]
    fn test_add_invalid_item_leaves_order_unchanged() {
        let mut order = order();
        let result = order.add_item("Widget", Money::from_cents(100), 0);
        assert!(matches!(result, Err(OrderError::InvalidQuantity { .. })));
        assert!(order.items().is_empty());
        assert_eq!(order.total_amount(), Money::zero());

        let result = order.add_item("Widget", Money::from_cents(-100), 1);
        assert!(matches!(result, Err(OrderError::InvalidPrice { .. })));
        assert!(order.items().is_empty());
    }

    #[test]
    fn test_add_item_to_cancelled_order_fails() {
        let mut order = order();
        order.add_item("Widget", Money::from_cents(100), 1).unwrap();
        order.cancel().unwrap();

        let result = order.add_item("Gadget", Money::from_cents(50), 1);
        assert!(matches!(result, Err(OrderError::Cancelled { .. })));
        assert_eq!(order.items().len(), 1);
        assert_eq!(order.total_amount().cents(), 100);
    }

    #[test]
    fn test_pay_transitions_and_records_history() {
        let mut order = order();
        order.pay().unwrap();

        assert_eq!(order.status(), OrderStatus::Paid);
        assert_eq!(order.status_history().len(), 1);
        assert_eq!(order.status_history()[0].status, OrderStatus::Paid);
        assert_eq!(order.status_history()[0].order_id, order.id);
    }

    #[test]
    fn test_pay_twice_fails_without_history_entry() {
        let mut order = order();
        order.pay().unwrap();

        let result = order.pay();
        assert!(matches!(result, Err(OrderError::AlreadyPaid { .. })));
        assert_eq!(order.status(), OrderStatus::Paid);
        assert_eq!(order.status_history().len(), 1);
    }

    #[test]
    fn test_pay_cancelled_order_fails() {
        let mut order = order();
        order.cancel().unwrap();
        assert!(matches!(order.pay(), Err(OrderError::Cancelled { .. })));
    }

    #[test]
    fn test_cancel_created_order() {
        let mut order = order();
        order.cancel().unwrap();
        assert_eq!(order.status(), OrderStatus::Cancelled);
        assert!(order.is_terminal());
        assert_eq!(order.status_history().len(), 1);
    }

    #[test]
    fn test_cancel_paid_order_fails() {
        let mut order = order();
        order.pay().unwrap();

        let result = order.cancel();
        assert!(matches!(result, Err(OrderError::AlreadyPaid { .. })));
        assert_eq!(order.status(), OrderStatus::Paid);
    }

    #[test]
    fn test_ship_requires_paid() {
        let mut order = order();
        let result = order.ship();
        assert!(matches!(
            result,
            Err(OrderError::InvalidTransition {
                current_status: OrderStatus::Created,
                ..
            })
        ));
        assert_eq!(order.status(), OrderStatus::Created);
        assert!(order.status_history().is_empty());
    }

    #[test]
    fn test_complete_requires_shipped() {
        let mut order = order();
        order.pay().unwrap();

        let result = order.complete();
        assert!(matches!(result, Err(OrderError::InvalidTransition { .. })));
        assert_eq!(order.status(), OrderStatus::Paid);
    }

    #[test]
    fn test_full_lifecycle() {
        let mut order = order();
        order.add_item("Widget", Money::from_cents(999), 3).unwrap();
        assert_eq!(order.total_amount().cents(), 2997);

        order.pay().unwrap();
        order.ship().unwrap();
        order.complete().unwrap();

        assert_eq!(order.status(), OrderStatus::Completed);
        assert!(order.is_terminal());

        let history: Vec<_> = order.status_history().iter().map(|h| h.status).collect();
        assert_eq!(
            history,
            vec![OrderStatus::Paid, OrderStatus::Shipped, OrderStatus::Completed]
        );
    }

    #[test]
    fn test_history_timestamps_ascend() {
        let mut order = order();
        order.pay().unwrap();
        order.ship().unwrap();
        order.complete().unwrap();

        let history = order.status_history();
        assert!(history.windows(2).all(|w| w[0].changed_at <= w[1].changed_at));
    }

    #[test]
    fn test_from_parts_preserves_stored_state() {
        let original = {
            let mut o = order();
            o.add_item("Widget", Money::from_cents(100), 2).unwrap();
            o.pay().unwrap();
            o
        };

        let rebuilt = Order::from_parts(
            original.id,
            original.user_id,
            original.status(),
            original.total_amount(),
            original.created_at,
            original.items().to_vec(),
            original.status_history().to_vec(),
        );

        assert_eq!(rebuilt, original);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let mut order = order();
        order.add_item("Widget", Money::from_cents(999), 3).unwrap();
        order.pay().unwrap();

        let json = serde_json::to_string(&order).unwrap();
        let deserialized: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, order);
    }
}
