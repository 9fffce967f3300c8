// ============================================================================
// Order Store - Persistence for the Order aggregate
// ============================================================================
//
// Implementations:
// - `PgOrderRepository`: sqlx/Postgres, sequence-backed order numbers
// - `InMemoryOrderRepository`: single mutex, used for tests and local runs
//
// Both guarantee that an order and its line items are written together and
// that an order number is handed out at most once.
//
// ============================================================================

mod memory;
mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::order::{NewOrder, Order, OrderError};

pub use memory::InMemoryOrderRepository;
pub use postgres::PgOrderRepository;

/// A change applied to a loaded order inside the store's critical section.
/// Returning an error aborts the whole update.
pub type OrderMutation = Box<dyn FnOnce(&mut Order) -> Result<(), OrderError> + Send>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Order store unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),

    #[error("Stored {column} of order {order_id} could not be decoded: {source}")]
    Corrupt {
        order_id: Uuid,
        column: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl From<sqlx::Error> for OrderError {
    fn from(err: sqlx::Error) -> Self {
        OrderError::Store(StoreError::Unavailable(err))
    }
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist a new order, allocating its id, order number and creation time.
    /// Fails with `OrderError::Conflict` if the allocated number is taken.
    async fn insert(&self, order: NewOrder) -> Result<Order, OrderError>;

    /// Load an order with its line items in creation order
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, OrderError>;

    /// Load, mutate and write back an order atomically.
    /// Fails with `OrderError::NotFound` if the id is unknown.
    async fn update(&self, id: Uuid, mutation: OrderMutation) -> Result<Order, OrderError>;
}
