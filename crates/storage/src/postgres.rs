//! PostgreSQL repository implementations.
//!
//! Aggregate saves run in one transaction: the order row is upserted
//! while item and history rows use `ON CONFLICT DO NOTHING`, so
//! re-saving an aggregate with already-present children never
//! duplicates rows or rewrites history. Loads rebuild entities through
//! the trusted `from_parts` constructors, bypassing validation.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{ItemId, OrderId, StatusChangeId, UserId};
use domain::repository::{
    OrderRepository, RepositoryError, RepositoryResult, UserRepository,
};
use domain::{Money, Order, OrderItem, OrderStatus, StatusChange, User};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

/// Runs the schema migrations against the given pool.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}

/// PostgreSQL-backed user repository.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a new repository over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: PgRow) -> RepositoryResult<User> {
        Ok(User::from_parts(
            UserId::from_uuid(get(&row, "id")?),
            get(&row, "email")?,
            get(&row, "name")?,
            get::<DateTime<Utc>>(&row, "created_at")?,
        ))
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn save(&self, user: &User) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET
                email = EXCLUDED.email,
                name = EXCLUDED.name
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.email)
        .bind(&user.name)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(RepositoryError::new)?;

        Ok(())
    }

    async fn find_by_id(&self, id: UserId) -> RepositoryResult<Option<User>> {
        let row = sqlx::query("SELECT id, email, name, created_at FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::new)?;

        row.map(Self::row_to_user).transpose()
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let row = sqlx::query("SELECT id, email, name, created_at FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(RepositoryError::new)?;

        row.map(Self::row_to_user).transpose()
    }

    async fn find_all(&self) -> RepositoryResult<Vec<User>> {
        let rows = sqlx::query("SELECT id, email, name, created_at FROM users")
            .fetch_all(&self.pool)
            .await
            .map_err(RepositoryError::new)?;

        rows.into_iter().map(Self::row_to_user).collect()
    }
}

/// PostgreSQL-backed order repository.
///
/// Does not implement compare-and-swap: single-writer-per-order must
/// be guaranteed by the deployment (see the trait docs).
#[derive(Clone)]
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    /// Creates a new repository over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_aggregate(&self, row: PgRow) -> RepositoryResult<Order> {
        let order_id = OrderId::from_uuid(get(&row, "id")?);

        let item_rows = sqlx::query(
            r#"
            SELECT id, order_id, product_name, price_cents, quantity
            FROM order_items
            WHERE order_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(order_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::new)?;

        let items = item_rows
            .into_iter()
            .map(|row| {
                Ok(OrderItem::from_parts(
                    ItemId::from_uuid(get(&row, "id")?),
                    OrderId::from_uuid(get(&row, "order_id")?),
                    get(&row, "product_name")?,
                    Money::from_cents(get(&row, "price_cents")?),
                    get::<i64>(&row, "quantity")? as u32,
                ))
            })
            .collect::<RepositoryResult<Vec<_>>>()?;

        let history_rows = sqlx::query(
            r#"
            SELECT id, order_id, status, changed_at
            FROM order_status_history
            WHERE order_id = $1
            ORDER BY changed_at ASC
            "#,
        )
        .bind(order_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::new)?;

        let status_history = history_rows
            .into_iter()
            .map(|row| {
                Ok(StatusChange::from_parts(
                    StatusChangeId::from_uuid(get(&row, "id")?),
                    OrderId::from_uuid(get(&row, "order_id")?),
                    parse_status(&get::<String>(&row, "status")?)?,
                    get(&row, "changed_at")?,
                ))
            })
            .collect::<RepositoryResult<Vec<_>>>()?;

        Ok(Order::from_parts(
            order_id,
            UserId::from_uuid(get(&row, "user_id")?),
            parse_status(&get::<String>(&row, "status")?)?,
            Money::from_cents(get(&row, "total_amount_cents")?),
            get(&row, "created_at")?,
            items,
            status_history,
        ))
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn save(&self, order: &Order) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await.map_err(RepositoryError::new)?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, user_id, status, total_amount_cents, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                status = EXCLUDED.status,
                total_amount_cents = EXCLUDED.total_amount_cents
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.user_id.as_uuid())
        .bind(order.status().as_str())
        .bind(order.total_amount().cents())
        .bind(order.created_at)
        .execute(&mut *tx)
        .await
        .map_err(RepositoryError::new)?;

        for (position, item) in order.items().iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_items (id, order_id, product_name, price_cents, quantity, position)
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(item.id.as_uuid())
            .bind(order.id.as_uuid())
            .bind(&item.product_name)
            .bind(item.price.cents())
            .bind(item.quantity as i64)
            .bind(position as i64)
            .execute(&mut *tx)
            .await
            .map_err(RepositoryError::new)?;
        }

        for change in order.status_history() {
            sqlx::query(
                r#"
                INSERT INTO order_status_history (id, order_id, status, changed_at)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (id) DO NOTHING
                "#,
            )
            .bind(change.id.as_uuid())
            .bind(order.id.as_uuid())
            .bind(change.status.as_str())
            .bind(change.changed_at)
            .execute(&mut *tx)
            .await
            .map_err(RepositoryError::new)?;
        }

        tx.commit().await.map_err(RepositoryError::new)?;
        Ok(())
    }

    async fn find_by_id(&self, id: OrderId) -> RepositoryResult<Option<Order>> {
        let row = sqlx::query(
            "SELECT id, user_id, status, total_amount_cents, created_at FROM orders WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(RepositoryError::new)?;

        match row {
            Some(row) => Ok(Some(self.load_aggregate(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_by_user(&self, user_id: UserId) -> RepositoryResult<Vec<Order>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, status, total_amount_cents, created_at
            FROM orders
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::new)?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            orders.push(self.load_aggregate(row).await?);
        }
        Ok(orders)
    }

    async fn find_all(&self) -> RepositoryResult<Vec<Order>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, status, total_amount_cents, created_at
            FROM orders
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(RepositoryError::new)?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            orders.push(self.load_aggregate(row).await?);
        }
        Ok(orders)
    }
}

fn get<'r, T>(row: &'r PgRow, column: &str) -> RepositoryResult<T>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(column).map_err(RepositoryError::new)
}

fn parse_status(s: &str) -> RepositoryResult<OrderStatus> {
    OrderStatus::from_str(s).map_err(RepositoryError::message)
}
