use uuid::Uuid;

use super::value_objects::OrderStatus;
use crate::store::StoreError;
use crate::utils::IsTransient;

// ============================================================================
// Order Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(Uuid),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Cannot change order status from {from} to {to}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },

    #[error("Order number allocation conflicted with a concurrent writer")]
    Conflict,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl OrderError {
    pub fn validation(message: impl Into<String>) -> Self {
        OrderError::Validation(message.into())
    }

    /// Short label used for metrics and logs
    pub fn kind(&self) -> &'static str {
        match self {
            OrderError::NotFound(_) => "not_found",
            OrderError::Validation(_) => "validation",
            OrderError::InvalidStatusTransition { .. } => "invalid_status_transition",
            OrderError::Conflict => "conflict",
            OrderError::Store(StoreError::Unavailable(_)) => "store_unavailable",
            OrderError::Store(StoreError::Corrupt { .. }) => "store_corrupt",
        }
    }
}

/// Only order-number conflicts are retried. Store outages are left to the
/// deployment.
impl IsTransient for OrderError {
    fn is_transient(&self) -> bool {
        matches!(self, OrderError::Conflict)
    }
}
