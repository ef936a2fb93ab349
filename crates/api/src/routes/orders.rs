//! Order lifecycle endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::OrderId;
use domain::{Money, Order, OrderItem, OrderRepository, StatusChange, UserRepository};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;

use super::users::parse_user_id;

// -- Request types --

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub user_id: String,
}

#[derive(Deserialize)]
pub struct AddItemRequest {
    pub product_name: String,
    pub price_cents: i64,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct ListOrdersParams {
    pub user_id: Option<String>,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub id: String,
    pub user_id: String,
    pub status: String,
    pub total_cents: i64,
    pub created_at: DateTime<Utc>,
    pub items: Vec<ItemResponse>,
}

#[derive(Serialize)]
pub struct ItemResponse {
    pub id: String,
    pub product_name: String,
    pub price_cents: i64,
    pub quantity: u32,
    pub subtotal_cents: i64,
}

#[derive(Serialize)]
pub struct StatusChangeResponse {
    pub id: String,
    pub status: String,
    pub changed_at: DateTime<Utc>,
}

impl From<&OrderItem> for ItemResponse {
    fn from(item: &OrderItem) -> Self {
        Self {
            id: item.id.to_string(),
            product_name: item.product_name.clone(),
            price_cents: item.price.cents(),
            quantity: item.quantity,
            subtotal_cents: item.subtotal().cents(),
        }
    }
}

impl From<&Order> for OrderResponse {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            user_id: order.user_id.to_string(),
            status: order.status().to_string(),
            total_cents: order.total_amount().cents(),
            created_at: order.created_at,
            items: order.items().iter().map(Into::into).collect(),
        }
    }
}

impl From<&StatusChange> for StatusChangeResponse {
    fn from(change: &StatusChange) -> Self {
        Self {
            id: change.id.to_string(),
            status: change.status.to_string(),
            changed_at: change.changed_at,
        }
    }
}

// -- Handlers --

/// POST /orders — create a new empty order for a user.
#[tracing::instrument(skip(state, req))]
pub async fn create<U, O>(
    State(state): State<Arc<AppState<U, O>>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError>
where
    U: UserRepository + 'static,
    O: OrderRepository + 'static,
{
    let user_id = parse_user_id(&req.user_id)?;
    let order = state.order_service.create_order(user_id).await?;
    Ok((StatusCode::CREATED, Json((&order).into())))
}

/// GET /orders/{id} — load an order with items.
#[tracing::instrument(skip(state))]
pub async fn get<U, O>(
    State(state): State<Arc<AppState<U, O>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError>
where
    U: UserRepository + 'static,
    O: OrderRepository + 'static,
{
    let order_id = parse_order_id(&id)?;
    let order = state.order_service.get_order(order_id).await?;
    Ok(Json((&order).into()))
}

/// GET /orders — list orders, optionally filtered by `user_id`.
#[tracing::instrument(skip(state))]
pub async fn list<U, O>(
    State(state): State<Arc<AppState<U, O>>>,
    Query(params): Query<ListOrdersParams>,
) -> Result<Json<Vec<OrderResponse>>, ApiError>
where
    U: UserRepository + 'static,
    O: OrderRepository + 'static,
{
    let user_id = params
        .user_id
        .as_deref()
        .map(parse_user_id)
        .transpose()?;
    let orders = state.order_service.list_orders(user_id).await?;
    Ok(Json(orders.iter().map(Into::into).collect()))
}

/// POST /orders/{id}/items — add a line item.
#[tracing::instrument(skip(state, req))]
pub async fn add_item<U, O>(
    State(state): State<Arc<AppState<U, O>>>,
    Path(id): Path<String>,
    Json(req): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<ItemResponse>), ApiError>
where
    U: UserRepository + 'static,
    O: OrderRepository + 'static,
{
    let order_id = parse_order_id(&id)?;

    // The domain models quantity as u32; non-positive values are
    // rejected here so the client still sees the validation failure.
    let quantity = u32::try_from(req.quantity)
        .ok()
        .filter(|q| *q > 0)
        .ok_or_else(|| {
            ApiError::BadRequest(format!(
                "Invalid quantity: {} (must be greater than 0)",
                req.quantity
            ))
        })?;

    let item = state
        .order_service
        .add_item(
            order_id,
            &req.product_name,
            Money::from_cents(req.price_cents),
            quantity,
        )
        .await?;
    Ok((StatusCode::CREATED, Json((&item).into())))
}

/// POST /orders/{id}/pay — pay the order.
#[tracing::instrument(skip(state))]
pub async fn pay<U, O>(
    State(state): State<Arc<AppState<U, O>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError>
where
    U: UserRepository + 'static,
    O: OrderRepository + 'static,
{
    let order_id = parse_order_id(&id)?;
    let order = state.order_service.pay_order(order_id).await?;
    Ok(Json((&order).into()))
}

/// POST /orders/{id}/cancel — cancel the order.
#[tracing::instrument(skip(state))]
pub async fn cancel<U, O>(
    State(state): State<Arc<AppState<U, O>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError>
where
    U: UserRepository + 'static,
    O: OrderRepository + 'static,
{
    let order_id = parse_order_id(&id)?;
    let order = state.order_service.cancel_order(order_id).await?;
    Ok(Json((&order).into()))
}

/// POST /orders/{id}/ship — ship a paid order.
#[tracing::instrument(skip(state))]
pub async fn ship<U, O>(
    State(state): State<Arc<AppState<U, O>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError>
where
    U: UserRepository + 'static,
    O: OrderRepository + 'static,
{
    let order_id = parse_order_id(&id)?;
    let order = state.order_service.ship_order(order_id).await?;
    Ok(Json((&order).into()))
}

/// POST /orders/{id}/complete — complete a shipped order.
#[tracing::instrument(skip(state))]
pub async fn complete<U, O>(
    State(state): State<Arc<AppState<U, O>>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError>
where
    U: UserRepository + 'static,
    O: OrderRepository + 'static,
{
    let order_id = parse_order_id(&id)?;
    let order = state.order_service.complete_order(order_id).await?;
    Ok(Json((&order).into()))
}

/// GET /orders/{id}/history — status-change history, chronological.
#[tracing::instrument(skip(state))]
pub async fn history<U, O>(
    State(state): State<Arc<AppState<U, O>>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<StatusChangeResponse>>, ApiError>
where
    U: UserRepository + 'static,
    O: OrderRepository + 'static,
{
    let order_id = parse_order_id(&id)?;
    let history = state.order_service.get_order_history(order_id).await?;
    Ok(Json(history.iter().map(Into::into).collect()))
}

fn parse_order_id(id: &str) -> Result<OrderId, ApiError> {
    uuid::Uuid::parse_str(id)
        .map(OrderId::from_uuid)
        .map_err(|e| ApiError::BadRequest(format!("Invalid order id: {e}")))
}
