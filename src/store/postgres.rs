use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use sqlx::{PgConnection, PgExecutor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{OrderMutation, OrderRepository, StoreError};
use crate::domain::order::{
    Customer, DeliveryDetails, LineItem, NewOrder, Order, OrderError, OrderStatus, Payment, Totals,
};

// ============================================================================
// Postgres Order Repository
// ============================================================================
//
// Tables (see migrations/):
// - sales:      one row per order, sub-documents as JSON text columns
// - sale_items: line items, ON DELETE CASCADE from sales
//
// Order numbers come from `sales_order_number_seq` via the column default,
// so allocation is atomic in the database. The unique index
// `sales_order_number_key` backs it up; a violation surfaces as
// `OrderError::Conflict` for the caller to retry.
//
// ============================================================================

const ORDER_NUMBER_CONSTRAINT: &str = "sales_order_number_key";

const SELECT_SALE: &str = "SELECT id, order_number, customer_json, delivery_json, payment_json, status,
        subtotal, delivery_fee, discount, total, created_at
 FROM sales
 WHERE id = $1";

#[derive(sqlx::FromRow)]
struct SaleRow {
    id: Uuid,
    order_number: i64,
    customer_json: String,
    delivery_json: String,
    payment_json: String,
    status: String,
    subtotal: Decimal,
    delivery_fee: Decimal,
    discount: Decimal,
    total: Decimal,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct SaleItemRow {
    sku: String,
    name: String,
    unit_price: Decimal,
    qty: i32,
    color: Option<String>,
}

impl From<SaleItemRow> for LineItem {
    fn from(row: SaleItemRow) -> Self {
        LineItem {
            sku: row.sku,
            name: row.name,
            unit_price: row.unit_price,
            quantity: row.qty,
            color: row.color,
        }
    }
}

fn decode_column<T: DeserializeOwned>(order_id: Uuid, column: &'static str, json: &str) -> Result<T, StoreError> {
    serde_json::from_str(json).map_err(|source| StoreError::Corrupt {
        order_id,
        column,
        source,
    })
}

fn encode_column<T: serde::Serialize>(order_id: Uuid, column: &'static str, value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|source| StoreError::Corrupt {
        order_id,
        column,
        source,
    })
}

impl SaleRow {
    fn into_order(self, items: Vec<LineItem>) -> Result<Order, StoreError> {
        Ok(Order {
            id: self.id,
            order_number: self.order_number,
            customer: decode_column(self.id, "customer_json", &self.customer_json)?,
            delivery: decode_column(self.id, "delivery_json", &self.delivery_json)?,
            payment: decode_column(self.id, "payment_json", &self.payment_json)?,
            items,
            status: OrderStatus::from(self.status),
            totals: Totals {
                subtotal: self.subtotal,
                delivery_fee: self.delivery_fee,
                discount: self.discount,
                total: self.total,
            },
            created_at: self.created_at,
        })
    }
}

/// Sub-documents serialized for the three JSON columns
struct EncodedDocuments {
    customer: String,
    delivery: String,
    payment: String,
}

impl EncodedDocuments {
    fn encode(
        order_id: Uuid,
        customer: &Customer,
        delivery: &DeliveryDetails,
        payment: &Payment,
    ) -> Result<Self, StoreError> {
        Ok(Self {
            customer: encode_column(order_id, "customer_json", customer)?,
            delivery: encode_column(order_id, "delivery_json", delivery)?,
            payment: encode_column(order_id, "payment_json", payment)?,
        })
    }
}

fn map_insert_error(err: sqlx::Error) -> OrderError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() && db_err.constraint() == Some(ORDER_NUMBER_CONSTRAINT) {
            return OrderError::Conflict;
        }
    }
    OrderError::from(err)
}

async fn load_items<'e, E: PgExecutor<'e>>(executor: E, order_id: Uuid) -> Result<Vec<LineItem>, sqlx::Error> {
    let rows: Vec<SaleItemRow> = sqlx::query_as(
        "SELECT sku, name, unit_price, qty, color
         FROM sale_items
         WHERE sale_id = $1
         ORDER BY position ASC",
    )
    .bind(order_id)
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(LineItem::from).collect())
}

async fn insert_items(conn: &mut PgConnection, order_id: Uuid, items: &[LineItem]) -> Result<(), sqlx::Error> {
    if items.is_empty() {
        return Ok(());
    }

    let mut builder: QueryBuilder<Postgres> =
        QueryBuilder::new("INSERT INTO sale_items (sale_id, position, sku, name, unit_price, qty, color) ");
    builder.push_values(items.iter().enumerate(), |mut row, (position, item)| {
        row.push_bind(order_id)
            .push_bind(position as i32)
            .push_bind(item.sku.as_str())
            .push_bind(item.name.as_str())
            .push_bind(item.unit_price)
            .push_bind(item.quantity)
            .push_bind(item.color.as_deref());
    });
    builder.build().execute(conn).await?;

    Ok(())
}

#[derive(Clone)]
pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the bundled migrations
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn insert(&self, order: NewOrder) -> Result<Order, OrderError> {
        let id = Uuid::now_v7();
        let docs = EncodedDocuments::encode(id, &order.customer, &order.delivery, &order.payment)?;

        let mut tx = self.pool.begin().await?;

        let (order_number, created_at): (i64, DateTime<Utc>) = sqlx::query_as(
            "INSERT INTO sales (id, customer_json, delivery_json, payment_json, status,
                                subtotal, delivery_fee, discount, total)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING order_number, created_at",
        )
        .bind(id)
        .bind(&docs.customer)
        .bind(&docs.delivery)
        .bind(&docs.payment)
        .bind(order.status.as_str())
        .bind(order.totals.subtotal)
        .bind(order.totals.delivery_fee)
        .bind(order.totals.discount)
        .bind(order.totals.total)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_insert_error)?;

        insert_items(&mut tx, id, &order.items).await?;

        tx.commit().await?;

        tracing::info!(
            order_id = %id,
            order_number = order_number,
            item_count = order.items.len(),
            "✅ Inserted order"
        );

        Ok(order.into_order(id, order_number, created_at))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, OrderError> {
        // One snapshot for the row and its items, so totals always match items
        let mut tx = self.pool.begin().await?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;

        let row: Option<SaleRow> = sqlx::query_as(SELECT_SALE)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = row else {
            tx.commit().await?;
            return Ok(None);
        };

        let items = load_items(&mut *tx, id).await?;
        tx.commit().await?;

        Ok(Some(row.into_order(items)?))
    }

    async fn update(&self, id: Uuid, mutation: OrderMutation) -> Result<Order, OrderError> {
        let mut tx = self.pool.begin().await?;

        // Row lock serializes concurrent updates of the same order
        let row: Option<SaleRow> = sqlx::query_as(&format!("{SELECT_SALE} FOR UPDATE"))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(row) = row else {
            return Err(OrderError::NotFound(id));
        };

        let items = load_items(&mut *tx, id).await?;
        let before = row.into_order(items)?;

        let mut order = before.clone();
        mutation(&mut order)?;

        if order == before {
            tx.rollback().await?;
            tracing::debug!(order_id = %id, "Update left order unchanged, nothing written");
            return Ok(order);
        }

        let docs = EncodedDocuments::encode(id, &order.customer, &order.delivery, &order.payment)?;

        sqlx::query(
            "UPDATE sales
             SET customer_json = $2, delivery_json = $3, payment_json = $4, status = $5,
                 subtotal = $6, delivery_fee = $7, discount = $8, total = $9
             WHERE id = $1",
        )
        .bind(id)
        .bind(&docs.customer)
        .bind(&docs.delivery)
        .bind(&docs.payment)
        .bind(order.status.as_str())
        .bind(order.totals.subtotal)
        .bind(order.totals.delivery_fee)
        .bind(order.totals.discount)
        .bind(order.totals.total)
        .execute(&mut *tx)
        .await?;

        if order.items != before.items {
            sqlx::query("DELETE FROM sale_items WHERE sale_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            insert_items(&mut tx, id, &order.items).await?;
        }

        tx.commit().await?;

        tracing::info!(
            order_id = %id,
            order_number = order.order_number,
            status = %order.status,
            "✅ Updated order"
        );

        Ok(order)
    }
}

// ============================================================================
// Integration Tests
// ============================================================================
//
// These need a Postgres instance:
//   DATABASE_URL=postgres://... cargo test -- --ignored
//
// ============================================================================
