//! User registration and lookup endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::UserId;
use domain::{OrderRepository, User, UserRepository};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct RegisterUserRequest {
    pub email: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email,
            name: user.name,
            created_at: user.created_at,
        }
    }
}

/// POST /users — register a new user.
#[tracing::instrument(skip(state, req))]
pub async fn register<U, O>(
    State(state): State<Arc<AppState<U, O>>>,
    Json(req): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError>
where
    U: UserRepository + 'static,
    O: OrderRepository + 'static,
{
    let user = state.user_service.register(&req.email, &req.name).await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// GET /users/{id} — load a user by id.
#[tracing::instrument(skip(state))]
pub async fn get<U, O>(
    State(state): State<Arc<AppState<U, O>>>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError>
where
    U: UserRepository + 'static,
    O: OrderRepository + 'static,
{
    let user_id = parse_user_id(&id)?;
    let user = state.user_service.get_by_id(user_id).await?;
    Ok(Json(user.into()))
}

/// GET /users — list all users.
#[tracing::instrument(skip(state))]
pub async fn list<U, O>(
    State(state): State<Arc<AppState<U, O>>>,
) -> Result<Json<Vec<UserResponse>>, ApiError>
where
    U: UserRepository + 'static,
    O: OrderRepository + 'static,
{
    let users = state.user_service.list_users().await?;
    Ok(Json(users.into_iter().map(Into::into).collect()))
}

pub(crate) fn parse_user_id(id: &str) -> Result<UserId, ApiError> {
    uuid::Uuid::parse_str(id)
        .map(UserId::from_uuid)
        .map_err(|e| ApiError::BadRequest(format!("Invalid user id: {e}")))
}
