//! Order orchestration service.
//!
//! Each call is one logical unit of work: load the aggregate, apply a
//! single in-memory mutation through a domain method, persist the
//! whole aggregate back. Domain failures propagate unmodified.

use common::{OrderId, UserId};

use crate::error::DomainError;
use crate::repository::{OrderRepository, UserRepository};

use super::{Money, Order, OrderItem, StatusChange};

/// Service for order operations.
pub struct OrderService<O: OrderRepository, U: UserRepository> {
    orders: O,
    users: U,
}

impl<O: OrderRepository, U: UserRepository> OrderService<O, U> {
    /// Creates a new order service backed by the given repositories.
    pub fn new(orders: O, users: U) -> Self {
        Self { orders, users }
    }

    /// Creates and persists a new empty order for a user.
    ///
    /// Fails with [`DomainError::UserNotFound`] if the user id does
    /// not resolve.
    #[tracing::instrument(skip(self))]
    pub async fn create_order(&self, user_id: UserId) -> Result<Order, DomainError> {
        self.require_user(user_id).await?;

        let order = Order::new(user_id);
        self.orders.save(&order).await?;

        metrics::counter!("orders_created_total").increment(1);
        tracing::info!(order_id = %order.id, %user_id, "order created");
        Ok(order)
    }

    /// Loads an order, failing with [`DomainError::OrderNotFound`] if
    /// absent.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, order_id: OrderId) -> Result<Order, DomainError> {
        self.orders
            .find_by_id(order_id)
            .await?
            .ok_or(DomainError::OrderNotFound { order_id })
    }

    /// Adds a line item to an order and persists the updated aggregate.
    #[tracing::instrument(skip(self, product_name))]
    pub async fn add_item(
        &self,
        order_id: OrderId,
        product_name: &str,
        price: Money,
        quantity: u32,
    ) -> Result<OrderItem, DomainError> {
        let mut order = self.get_order(order_id).await?;
        let item = order.add_item(product_name, price, quantity)?;
        self.orders.save(&order).await?;
        Ok(item)
    }

    /// Pays an order. Paying twice fails with `OrderAlreadyPaid`.
    #[tracing::instrument(skip(self))]
    pub async fn pay_order(&self, order_id: OrderId) -> Result<Order, DomainError> {
        let mut order = self.get_order(order_id).await?;
        order.pay()?;
        self.orders.save(&order).await?;

        metrics::counter!("orders_paid_total").increment(1);
        tracing::info!(%order_id, total = %order.total_amount(), "order paid");
        Ok(order)
    }

    /// Cancels an order. A paid order cannot be cancelled.
    #[tracing::instrument(skip(self))]
    pub async fn cancel_order(&self, order_id: OrderId) -> Result<Order, DomainError> {
        let mut order = self.get_order(order_id).await?;
        order.cancel()?;
        self.orders.save(&order).await?;

        metrics::counter!("orders_cancelled_total").increment(1);
        Ok(order)
    }

    /// Ships a paid order.
    #[tracing::instrument(skip(self))]
    pub async fn ship_order(&self, order_id: OrderId) -> Result<Order, DomainError> {
        let mut order = self.get_order(order_id).await?;
        order.ship()?;
        self.orders.save(&order).await?;
        Ok(order)
    }

    /// Completes a shipped order.
    #[tracing::instrument(skip(self))]
    pub async fn complete_order(&self, order_id: OrderId) -> Result<Order, DomainError> {
        let mut order = self.get_order(order_id).await?;
        order.complete()?;
        self.orders.save(&order).await?;
        Ok(order)
    }

    /// Lists orders, optionally filtered by user.
    ///
    /// When a user id is given it must resolve, otherwise the call
    /// fails with [`DomainError::UserNotFound`].
    #[tracing::instrument(skip(self))]
    pub async fn list_orders(&self, user_id: Option<UserId>) -> Result<Vec<Order>, DomainError> {
        match user_id {
            Some(user_id) => {
                self.require_user(user_id).await?;
                Ok(self.orders.find_by_user(user_id).await?)
            }
            None => Ok(self.orders.find_all().await?),
        }
    }

    /// Returns an order's status-change history in chronological order.
    #[tracing::instrument(skip(self))]
    pub async fn get_order_history(
        &self,
        order_id: OrderId,
    ) -> Result<Vec<StatusChange>, DomainError> {
        let order = self.get_order(order_id).await?;
        Ok(order.status_history().to_vec())
    }

    async fn require_user(&self, user_id: UserId) -> Result<(), DomainError> {
        match self.users.find_by_id(user_id).await? {
            Some(_) => Ok(()),
            None => Err(DomainError::UserNotFound { user_id }),
        }
    }
}
