//! HTTP API server for the order management system.
//!
//! Exposes the user and order services over REST, with structured
//! logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use domain::{OrderRepository, OrderService, UserRepository, UserService};
use metrics_exporter_prometheus::PrometheusHandle;
use storage::{InMemoryOrderRepository, InMemoryUserRepository};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::Config;

/// Shared application state accessible from all handlers.
pub struct AppState<U: UserRepository, O: OrderRepository> {
    pub user_service: UserService<U>,
    pub order_service: OrderService<O, U>,
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<U, O>(state: Arc<AppState<U, O>>, metrics_handle: PrometheusHandle) -> Router
where
    U: UserRepository + 'static,
    O: OrderRepository + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/users", post(routes::users::register::<U, O>))
        .route("/users", get(routes::users::list::<U, O>))
        .route("/users/{id}", get(routes::users::get::<U, O>))
        .route("/orders", post(routes::orders::create::<U, O>))
        .route("/orders", get(routes::orders::list::<U, O>))
        .route("/orders/{id}", get(routes::orders::get::<U, O>))
        .route("/orders/{id}/items", post(routes::orders::add_item::<U, O>))
        .route("/orders/{id}/pay", post(routes::orders::pay::<U, O>))
        .route("/orders/{id}/cancel", post(routes::orders::cancel::<U, O>))
        .route("/orders/{id}/ship", post(routes::orders::ship::<U, O>))
        .route(
            "/orders/{id}/complete",
            post(routes::orders::complete::<U, O>),
        )
        .route("/orders/{id}/history", get(routes::orders::history::<U, O>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates application state backed by in-memory repositories.
pub fn create_default_state() -> Arc<AppState<InMemoryUserRepository, InMemoryOrderRepository>> {
    let users = InMemoryUserRepository::new();
    let orders = InMemoryOrderRepository::new();

    Arc::new(AppState {
        user_service: UserService::new(users.clone()),
        order_service: OrderService::new(orders, users),
    })
}

/// Creates application state backed by PostgreSQL repositories.
pub fn create_postgres_state(
    pool: sqlx::PgPool,
) -> Arc<AppState<storage::PostgresUserRepository, storage::PostgresOrderRepository>> {
    let users = storage::PostgresUserRepository::new(pool.clone());
    let orders = storage::PostgresOrderRepository::new(pool);

    Arc::new(AppState {
        user_service: UserService::new(users.clone()),
        order_service: OrderService::new(orders, users),
    })
}
