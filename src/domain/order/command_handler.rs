use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use uuid::Uuid;

use super::aggregate::{NewOrder, Order, StatusPolicy};
use super::commands::{CreateOrder, UpdateOrder};
use super::errors::OrderError;
use super::validation::Validate;
use crate::metrics::Metrics;
use crate::store::OrderRepository;
use crate::utils::{retry_on_transient, RetryConfig};

// ============================================================================
// Order Command Handler
// ============================================================================
//
// Orchestrates: Command → Validation → Aggregate → Repository
//
// ============================================================================

pub struct OrderCommandHandler {
    repository: Arc<dyn OrderRepository>,
    metrics: Arc<Metrics>,
    status_policy: StatusPolicy,
    retry: RetryConfig,
}

impl OrderCommandHandler {
    pub fn new(
        repository: Arc<dyn OrderRepository>,
        metrics: Arc<Metrics>,
        status_policy: StatusPolicy,
        retry: RetryConfig,
    ) -> Self {
        Self {
            repository,
            metrics,
            status_policy,
            retry,
        }
    }

    pub fn status_policy(&self) -> StatusPolicy {
        self.status_policy
    }

    /// Validate and persist a new order with server-computed totals.
    /// Order-number conflicts are retried; nothing is allocated for an
    /// invalid command.
    pub async fn create(&self, command: CreateOrder) -> Result<Order, OrderError> {
        let started = Instant::now();
        let result = self.create_order(command).await;
        self.observe("create", started, &result);

        if let Ok(order) = &result {
            self.metrics.orders_created.inc();
            tracing::info!(
                order_id = %order.id,
                order_number = order.order_number,
                items = order.items.len(),
                total = %order.totals.total,
                "Order created"
            );
        }

        result
    }

    async fn create_order(&self, command: CreateOrder) -> Result<Order, OrderError> {
        command.validate()?;
        let draft = NewOrder::from_command(command)?;

        retry_on_transient(self.retry.clone(), |attempt| {
            let repository = self.repository.clone();
            let metrics = self.metrics.clone();
            let draft = draft.clone();

            async move {
                let result = repository.insert(draft).await;
                if matches!(result, Err(OrderError::Conflict)) {
                    metrics.record_order_number_conflict();
                    tracing::debug!(attempt, "Order number already taken");
                }
                result
            }
        })
        .await
        .into_result()
    }

    pub async fn get(&self, id: Uuid) -> Result<Order, OrderError> {
        let started = Instant::now();
        let result = match self.repository.find_by_id(id).await {
            Ok(Some(order)) => Ok(order),
            Ok(None) => Err(OrderError::NotFound(id)),
            Err(e) => Err(e),
        };
        self.observe("get", started, &result);
        result
    }

    /// Apply a sparse update atomically and return the refreshed order
    pub async fn update(&self, id: Uuid, update: UpdateOrder) -> Result<Order, OrderError> {
        let started = Instant::now();
        let touched = update.touched_fields();

        let result = match update.validate() {
            Ok(()) => {
                let policy = self.status_policy;
                self.repository
                    .update(id, Box::new(move |order| order.apply_update(update, policy)))
                    .await
            }
            Err(e) => Err(e),
        };
        self.observe("update", started, &result);

        if let Ok(order) = &result {
            self.metrics.order_updates.inc();
            tracing::info!(
                order_id = %id,
                fields = ?touched,
                status = %order.status,
                total = %order.totals.total,
                "Order updated"
            );
        }

        result
    }

    /// Mark an order cancelled. Cancelling twice is a no-op.
    pub async fn cancel(&self, id: Uuid) -> Result<(), OrderError> {
        let started = Instant::now();
        let changed = Arc::new(AtomicBool::new(false));
        let flag = changed.clone();

        let result = self
            .repository
            .update(
                id,
                Box::new(move |order| {
                    flag.store(order.cancel(), Ordering::SeqCst);
                    Ok(())
                }),
            )
            .await;
        self.observe("cancel", started, &result);

        result.map(|_| {
            let changed = changed.load(Ordering::SeqCst);
            self.metrics.record_cancel(changed);
            if changed {
                tracing::info!(order_id = %id, "Order cancelled");
            } else {
                tracing::debug!(order_id = %id, "Order already cancelled");
            }
        })
    }

    fn observe<T>(&self, operation: &str, started: Instant, result: &Result<T, OrderError>) {
        self.metrics
            .observe_duration(operation, started.elapsed().as_secs_f64());

        if let Err(e) = result {
            self.metrics.record_failure(operation, e.kind());
            match e {
                OrderError::Store(_) => {
                    tracing::error!(operation, error = %e, "Order operation failed")
                }
                _ => tracing::warn!(operation, error = %e, "Order operation rejected"),
            }
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
