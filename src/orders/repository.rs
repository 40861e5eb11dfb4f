use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::catalog::PriceTier;
use crate::db::PersistenceError;
use crate::orders::{Customer, Order, OrderLine, OrderStatus, PaymentStatus};

/// Storage contract for placed orders
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Store a new order with its lines
    async fn insert(&self, order: &Order) -> Result<(), PersistenceError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Order>, PersistenceError>;

    /// Orders newest first, optionally restricted to one status
    async fn list(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, PersistenceError>;

    /// Persist the mutable parts of an order (status, payment status, notes,
    /// version, updated_at) if the stored version still equals
    /// `expected_version`
    async fn update(&self, order: &Order, expected_version: i32) -> Result<(), PersistenceError>;
}

/// Database row for the orders table
#[derive(Debug, FromRow)]
struct OrderRow {
    id: String,
    customer_name: String,
    customer_email: String,
    customer_phone: String,
    customer_address: String,
    customer_city: String,
    customer_state: String,
    sub_total: Decimal,
    tax: Decimal,
    shipping_fee: Decimal,
    discount: Option<Decimal>,
    total: Decimal,
    currency: String,
    status: OrderStatus,
    payment_method: String,
    payment_status: PaymentStatus,
    notes: Option<String>,
    version: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Database row for the order_lines table
#[derive(Debug, FromRow)]
struct OrderLineRow {
    order_id: String,
    product_id: String,
    product_name: String,
    category: String,
    tier: PriceTier,
    quantity: i32,
    unit_price: Decimal,
    line_total: Decimal,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderLine>) -> Order {
        Order {
            id: self.id,
            customer: Customer {
                name: self.customer_name,
                email: self.customer_email,
                phone: self.customer_phone,
                address: self.customer_address,
                city: self.customer_city,
                state: self.customer_state,
            },
            items,
            sub_total: self.sub_total,
            tax: self.tax,
            shipping_fee: self.shipping_fee,
            discount: self.discount,
            total: self.total,
            currency: self.currency,
            status: self.status,
            payment_method: self.payment_method,
            payment_status: self.payment_status,
            notes: self.notes,
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl From<OrderLineRow> for OrderLine {
    fn from(row: OrderLineRow) -> Self {
        Self {
            product_id: row.product_id,
            product_name: row.product_name,
            category: row.category,
            tier: row.tier,
            quantity: row.quantity,
            unit_price: row.unit_price,
            line_total: row.line_total,
        }
    }
}

const ORDER_COLUMNS: &str = "id, customer_name, customer_email, customer_phone, customer_address, \
     customer_city, customer_state, sub_total, tax, shipping_fee, discount, total, currency, status, \
     payment_method, payment_status, notes, version, created_at, updated_at";

const LINE_COLUMNS: &str =
    "order_id, product_id, product_name, category, tier, quantity, unit_price, line_total";

/// PostgreSQL-backed order repository
#[derive(Clone)]
pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    /// Create a new PgOrderRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Attach lines to a batch of order rows, keeping row order
    async fn hydrate(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, PersistenceError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<String> = rows.iter().map(|row| row.id.clone()).collect();
        let line_rows = sqlx::query_as::<_, OrderLineRow>(&format!(
            "SELECT {} FROM order_lines WHERE order_id = ANY($1) ORDER BY order_id, position",
            LINE_COLUMNS
        ))
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut lines: HashMap<String, Vec<OrderLine>> = HashMap::new();
        for row in line_rows {
            lines.entry(row.order_id.clone()).or_default().push(row.into());
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let items = lines.remove(&row.id).unwrap_or_default();
                row.into_order(items)
            })
            .collect())
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn insert(&self, order: &Order) -> Result<(), PersistenceError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (id, customer_name, customer_email, customer_phone, customer_address,
                customer_city, customer_state, sub_total, tax, shipping_fee, discount, total, currency,
                status, payment_method, payment_status, notes, version, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
            "#,
        )
        .bind(&order.id)
        .bind(&order.customer.name)
        .bind(&order.customer.email)
        .bind(&order.customer.phone)
        .bind(&order.customer.address)
        .bind(&order.customer.city)
        .bind(&order.customer.state)
        .bind(order.sub_total)
        .bind(order.tax)
        .bind(order.shipping_fee)
        .bind(order.discount)
        .bind(order.total)
        .bind(&order.currency)
        .bind(order.status)
        .bind(&order.payment_method)
        .bind(order.payment_status)
        .bind(&order.notes)
        .bind(order.version)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => PersistenceError::Duplicate {
                entity: "order",
                id: order.id.clone(),
            },
            other => other.into(),
        })?;

        for (position, line) in order.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_lines (order_id, position, product_id, product_name, category,
                    tier, quantity, unit_price, line_total)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                "#,
            )
            .bind(&order.id)
            .bind(position as i32)
            .bind(&line.product_id)
            .bind(&line.product_name)
            .bind(&line.category)
            .bind(line.tier)
            .bind(line.quantity)
            .bind(line.unit_price)
            .bind(line.line_total)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Order>, PersistenceError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders WHERE id = $1",
            ORDER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, PersistenceError> {
        let rows = match status {
            Some(status_filter) => {
                sqlx::query_as::<_, OrderRow>(&format!(
                    "SELECT {} FROM orders WHERE status = $1 ORDER BY created_at DESC, id DESC",
                    ORDER_COLUMNS
                ))
                .bind(status_filter)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, OrderRow>(&format!(
                    "SELECT {} FROM orders ORDER BY created_at DESC, id DESC",
                    ORDER_COLUMNS
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        self.hydrate(rows).await
    }

    async fn update(&self, order: &Order, expected_version: i32) -> Result<(), PersistenceError> {
        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = $2, payment_status = $3, notes = $4, version = $5, updated_at = $6
            WHERE id = $1 AND version = $7
            "#,
        )
        .bind(&order.id)
        .bind(order.status)
        .bind(order.payment_status)
        .bind(&order.notes)
        .bind(order.version)
        .bind(order.updated_at)
        .bind(expected_version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::VersionConflict {
                entity: "order",
                id: order.id.clone(),
            });
        }
        Ok(())
    }
}

/// Process-local order repository, used without a database and in tests
#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<Vec<Order>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn insert(&self, order: &Order) -> Result<(), PersistenceError> {
        let mut orders = self.orders.write().await;
        if orders.iter().any(|o| o.id == order.id) {
            return Err(PersistenceError::Duplicate {
                entity: "order",
                id: order.id.clone(),
            });
        }
        orders.push(order.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Order>, PersistenceError> {
        Ok(self.orders.read().await.iter().find(|o| o.id == id).cloned())
    }

    async fn list(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, PersistenceError> {
        let mut orders: Vec<Order> = self
            .orders
            .read()
            .await
            .iter()
            .filter(|o| status.map_or(true, |s| o.status == s))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(orders)
    }

    async fn update(&self, order: &Order, expected_version: i32) -> Result<(), PersistenceError> {
        let mut orders = self.orders.write().await;
        match orders.iter_mut().find(|o| o.id == order.id) {
            Some(existing) if existing.version == expected_version => {
                existing.status = order.status;
                existing.payment_status = order.payment_status;
                existing.notes = order.notes.clone();
                existing.version = order.version;
                existing.updated_at = order.updated_at;
                Ok(())
            }
            _ => Err(PersistenceError::VersionConflict {
                entity: "order",
                id: order.id.clone(),
            }),
        }
    }
}
