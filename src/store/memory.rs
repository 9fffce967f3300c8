use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{OrderMutation, OrderRepository};
use crate::domain::order::{NewOrder, Order, OrderError};

// ============================================================================
// In-Memory Order Repository
// ============================================================================
//
// One mutex guards every order and the order-number counter, which makes it
// the single-writer serialization point for allocation and updates.
//
// ============================================================================

#[derive(Default)]
struct MemoryState {
    orders: HashMap<Uuid, Order>,
    last_order_number: i64,
}

#[derive(Default)]
pub struct InMemoryOrderRepository {
    state: Mutex<MemoryState>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.orders.len()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn insert(&self, order: NewOrder) -> Result<Order, OrderError> {
        let mut state = self.state.lock().await;

        let order_number = state.last_order_number + 1;
        let order = order.into_order(Uuid::now_v7(), order_number, Utc::now());
        state.last_order_number = order_number;
        state.orders.insert(order.id, order.clone());

        tracing::debug!(
            order_id = %order.id,
            order_number = order.order_number,
            "Stored order in memory"
        );

        Ok(order)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, OrderError> {
        Ok(self.state.lock().await.orders.get(&id).cloned())
    }

    async fn update(&self, id: Uuid, mutation: OrderMutation) -> Result<Order, OrderError> {
        let mut state = self.state.lock().await;

        let stored = state.orders.get_mut(&id).ok_or(OrderError::NotFound(id))?;

        // Work on a copy so a failed mutation leaves the stored order intact
        let mut working = stored.clone();
        mutation(&mut working)?;
        *stored = working.clone();

        Ok(working)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::test_fixtures::sample_create_order;
    use crate::domain::order::OrderStatus;
    use std::sync::Arc;

    fn new_order() -> NewOrder {
        NewOrder::from_command(sample_create_order()).unwrap()
    }

    #[tokio::test]
    async fn test_insert_assigns_sequential_numbers() {
        let repo = InMemoryOrderRepository::new();

        let first = repo.insert(new_order()).await.unwrap();
        let second = repo.insert(new_order()).await.unwrap();

        assert_eq!(first.order_number, 1);
        assert_eq!(second.order_number, 2);
        assert_ne!(first.id, second.id);
        assert_eq!(repo.len().await, 2);
    }

    #[tokio::test]
    async fn test_find_returns_stored_order() {
        let repo = InMemoryOrderRepository::new();
        let created = repo.insert(new_order()).await.unwrap();

        let found = repo.find_by_id(created.id).await.unwrap();

        assert_eq!(found, Some(created));
        assert!(repo.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_unknown_order_is_not_found() {
        let repo = InMemoryOrderRepository::new();
        let id = Uuid::new_v4();

        let result = repo.update(id, Box::new(|_| Ok(()))).await;

        assert!(matches!(result, Err(OrderError::NotFound(missing)) if missing == id));
    }

    #[tokio::test]
    async fn test_failed_mutation_leaves_order_untouched() {
        let repo = InMemoryOrderRepository::new();
        let created = repo.insert(new_order()).await.unwrap();

        let result = repo
            .update(
                created.id,
                Box::new(|order| {
                    order.status = OrderStatus::Placed;
                    order.items.clear();
                    Err(OrderError::validation("rejected"))
                }),
            )
            .await;

        assert!(result.is_err());
        assert_eq!(repo.find_by_id(created.id).await.unwrap(), Some(created));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_inserts_never_share_a_number() {
        let repo = Arc::new(InMemoryOrderRepository::new());

        let handles: Vec<_> = (0..50)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.insert(new_order()).await.unwrap().order_number })
            })
            .collect();

        let mut numbers = Vec::new();
        for handle in handles {
            numbers.push(handle.await.unwrap());
        }
        numbers.sort_unstable();

        assert_eq!(numbers, (1..=50).collect::<Vec<i64>>());
    }
}
