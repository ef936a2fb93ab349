//! Service-level integration tests over the in-memory repositories.
//!
//! These exercise the full read-mutate-persist cycle of both services,
//! including the cross-entity checks and the persisted history.

use domain::{DomainError, Money, OrderError, OrderService, OrderStatus, UserService};
use storage::{InMemoryOrderRepository, InMemoryUserRepository};

fn services() -> (
    UserService<InMemoryUserRepository>,
    OrderService<InMemoryOrderRepository, InMemoryUserRepository>,
) {
    let users = InMemoryUserRepository::new();
    let orders = InMemoryOrderRepository::new();
    (
        UserService::new(users.clone()),
        OrderService::new(orders, users),
    )
}

mod users {
    use super::*;

    #[tokio::test]
    async fn register_and_look_up() {
        let (users, _) = services();

        let alice = users.register("alice@example.com", "Alice").await.unwrap();
        assert_eq!(alice.email, "alice@example.com");

        let by_id = users.get_by_id(alice.id).await.unwrap();
        assert_eq!(by_id, alice);

        let by_email = users.get_by_email("alice@example.com").await.unwrap();
        assert_eq!(by_email, Some(alice));

        // Absence by email is not an error.
        assert!(users.get_by_email("bob@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let (users, _) = services();

        users.register("alice@example.com", "Alice").await.unwrap();
        let result = users.register("alice@example.com", "Impostor").await;

        assert!(matches!(
            result,
            Err(DomainError::EmailAlreadyExists { .. })
        ));
        assert_eq!(users.list_users().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn invalid_email_is_rejected_and_not_stored() {
        let (users, _) = services();

        let result = users.register("not-an-email", "Eve").await;
        assert!(matches!(result, Err(DomainError::User(_))));
        assert!(users.list_users().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_by_id_fails_for_unknown_user() {
        let (users, _) = services();
        let result = users.get_by_id(common::UserId::new()).await;
        assert!(matches!(result, Err(DomainError::UserNotFound { .. })));
    }
}

mod orders {
    use super::*;

    #[tokio::test]
    async fn create_order_requires_existing_user() {
        let (_, orders) = services();

        let result = orders.create_order(common::UserId::new()).await;
        assert!(matches!(result, Err(DomainError::UserNotFound { .. })));
    }

    #[tokio::test]
    async fn full_lifecycle_scenario() {
        let (users, orders) = services();

        let alice = users.register("alice@example.com", "Alice").await.unwrap();
        let order = orders.create_order(alice.id).await.unwrap();
        assert_eq!(order.status(), OrderStatus::Created);

        // Widget at $9.99, quantity 3 → $29.97.
        let item = orders
            .add_item(order.id, "Widget", Money::from_cents(999), 3)
            .await
            .unwrap();
        assert_eq!(item.subtotal().cents(), 2997);

        let paid = orders.pay_order(order.id).await.unwrap();
        assert_eq!(paid.status(), OrderStatus::Paid);
        assert_eq!(paid.total_amount().cents(), 2997);

        let shipped = orders.ship_order(order.id).await.unwrap();
        assert_eq!(shipped.status(), OrderStatus::Shipped);

        let completed = orders.complete_order(order.id).await.unwrap();
        assert_eq!(completed.status(), OrderStatus::Completed);

        let history = orders.get_order_history(order.id).await.unwrap();
        let statuses: Vec<_> = history.iter().map(|h| h.status).collect();
        assert_eq!(
            statuses,
            vec![OrderStatus::Paid, OrderStatus::Shipped, OrderStatus::Completed]
        );
        assert!(history.windows(2).all(|w| w[0].changed_at <= w[1].changed_at));
    }

    #[tokio::test]
    async fn pay_twice_fails_and_persists_single_history_entry() {
        let (users, orders) = services();
        let alice = users.register("alice@example.com", "").await.unwrap();
        let order = orders.create_order(alice.id).await.unwrap();

        orders.pay_order(order.id).await.unwrap();
        let result = orders.pay_order(order.id).await;
        assert!(matches!(
            result,
            Err(DomainError::Order(OrderError::AlreadyPaid { .. }))
        ));

        let history = orders.get_order_history(order.id).await.unwrap();
        assert_eq!(history.len(), 1);

        // The stored order is still PAID, untouched by the failed call.
        let stored = orders.get_order(order.id).await.unwrap();
        assert_eq!(stored.status(), OrderStatus::Paid);
    }

    #[tokio::test]
    async fn cancel_paid_order_fails() {
        let (users, orders) = services();
        let alice = users.register("alice@example.com", "").await.unwrap();
        let order = orders.create_order(alice.id).await.unwrap();

        orders.pay_order(order.id).await.unwrap();
        let result = orders.cancel_order(order.id).await;
        assert!(matches!(
            result,
            Err(DomainError::Order(OrderError::AlreadyPaid { .. }))
        ));
    }

    #[tokio::test]
    async fn ship_unpaid_order_fails_and_order_stays_created() {
        let (users, orders) = services();
        let alice = users.register("alice@example.com", "").await.unwrap();
        let order = orders.create_order(alice.id).await.unwrap();

        let result = orders.ship_order(order.id).await;
        assert!(matches!(
            result,
            Err(DomainError::Order(OrderError::InvalidTransition { .. }))
        ));

        let stored = orders.get_order(order.id).await.unwrap();
        assert_eq!(stored.status(), OrderStatus::Created);
        assert!(stored.status_history().is_empty());
    }

    #[tokio::test]
    async fn add_item_to_cancelled_order_fails_and_nothing_is_persisted() {
        let (users, orders) = services();
        let alice = users.register("alice@example.com", "").await.unwrap();
        let order = orders.create_order(alice.id).await.unwrap();

        orders.cancel_order(order.id).await.unwrap();
        let result = orders
            .add_item(order.id, "Widget", Money::from_cents(100), 1)
            .await;
        assert!(matches!(
            result,
            Err(DomainError::Order(OrderError::Cancelled { .. }))
        ));

        let stored = orders.get_order(order.id).await.unwrap();
        assert!(stored.items().is_empty());
        assert_eq!(stored.total_amount(), Money::zero());
    }

    #[tokio::test]
    async fn invalid_item_is_never_persisted() {
        let (users, orders) = services();
        let alice = users.register("alice@example.com", "").await.unwrap();
        let order = orders.create_order(alice.id).await.unwrap();

        let result = orders
            .add_item(order.id, "Widget", Money::from_cents(100), 0)
            .await;
        assert!(matches!(
            result,
            Err(DomainError::Order(OrderError::InvalidQuantity { .. }))
        ));

        let stored = orders.get_order(order.id).await.unwrap();
        assert!(stored.items().is_empty());
        assert!(stored.total_amount().is_zero());
    }

    #[tokio::test]
    async fn list_orders_filters_by_user() {
        let (users, orders) = services();
        let alice = users.register("alice@example.com", "").await.unwrap();
        let bob = users.register("bob@example.com", "").await.unwrap();

        orders.create_order(alice.id).await.unwrap();
        orders.create_order(alice.id).await.unwrap();
        orders.create_order(bob.id).await.unwrap();

        assert_eq!(orders.list_orders(Some(alice.id)).await.unwrap().len(), 2);
        assert_eq!(orders.list_orders(Some(bob.id)).await.unwrap().len(), 1);
        assert_eq!(orders.list_orders(None).await.unwrap().len(), 3);

        let result = orders.list_orders(Some(common::UserId::new())).await;
        assert!(matches!(result, Err(DomainError::UserNotFound { .. })));
    }

    #[tokio::test]
    async fn get_unknown_order_fails() {
        let (_, orders) = services();
        let result = orders.get_order(common::OrderId::new()).await;
        assert!(matches!(result, Err(DomainError::OrderNotFound { .. })));
    }
}
