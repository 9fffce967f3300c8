use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::commands::{CreateOrder, UpdateOrder};
use super::errors::OrderError;
use super::totals::{compute_totals, round_money};
use super::value_objects::{Customer, DeliveryDetails, LineItem, OrderStatus, Payment, Totals};

// ============================================================================
// Order Aggregate - Domain Logic
// ============================================================================
//
// An order and its line items form one unit of consistency. Totals are never
// set directly; every mutation goes through `compute_totals`.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    // Identity
    pub id: Uuid,
    pub order_number: i64,

    // Sub-documents
    pub customer: Customer,
    pub delivery: DeliveryDetails,
    pub payment: Payment,

    pub items: Vec<LineItem>,
    pub status: OrderStatus,
    pub totals: Totals,

    pub created_at: DateTime<Utc>,
}

/// An order that has not been stored yet. The repository assigns `id`,
/// `order_number` and `created_at` when it persists one.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub customer: Customer,
    pub delivery: DeliveryDetails,
    pub payment: Payment,
    pub items: Vec<LineItem>,
    pub status: OrderStatus,
    pub totals: Totals,
}

impl NewOrder {
    /// Build from a create command; the delivery fee comes from the client
    /// hint or defaults to zero. Fails if the totals would not fit storage.
    pub fn from_command(command: CreateOrder) -> Result<Self, OrderError> {
        let delivery_fee = command.delivery_fee().unwrap_or(Decimal::ZERO);
        let items = with_money_scale(command.items);
        let totals = compute_totals(&items, command.payment.discount_percent, delivery_fee)?;

        Ok(Self {
            customer: command.customer,
            delivery: command.delivery,
            payment: command.payment,
            items,
            status: command.status.unwrap_or_default(),
            totals,
        })
    }

    pub fn into_order(self, id: Uuid, order_number: i64, created_at: DateTime<Utc>) -> Order {
        Order {
            id,
            order_number,
            customer: self.customer,
            delivery: self.delivery,
            payment: self.payment,
            items: self.items,
            status: self.status,
            totals: self.totals,
            created_at,
        }
    }
}

/// Pin unit prices to cents so an order reads back from storage exactly as
/// it was written
fn with_money_scale(items: Vec<LineItem>) -> Vec<LineItem> {
    items
        .into_iter()
        .map(|item| LineItem {
            unit_price: round_money(item.unit_price),
            ..item
        })
        .collect()
}

/// How strictly status changes made through `update` are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusPolicy {
    /// Any supplied status is stored verbatim
    Permissive,
    /// Cancelled orders stay cancelled and placed orders cannot go back to draft
    #[default]
    Strict,
}

impl StatusPolicy {
    pub fn check(&self, from: &OrderStatus, to: &OrderStatus) -> Result<(), OrderError> {
        if *self == StatusPolicy::Permissive || from == to {
            return Ok(());
        }

        let allowed = match (from, to) {
            (OrderStatus::Cancelled, _) => false,
            (OrderStatus::Placed, OrderStatus::Draft) => false,
            _ => true,
        };

        if allowed {
            Ok(())
        } else {
            Err(OrderError::InvalidStatusTransition {
                from: from.clone(),
                to: to.clone(),
            })
        }
    }
}

impl FromStr for StatusPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(StatusPolicy::Strict),
            "permissive" => Ok(StatusPolicy::Permissive),
            other => Err(format!("unknown status policy '{other}', expected strict or permissive")),
        }
    }
}

impl fmt::Display for StatusPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusPolicy::Permissive => f.write_str("permissive"),
            StatusPolicy::Strict => f.write_str("strict"),
        }
    }
}

impl Order {
    /// Apply a sparse update in place.
    ///
    /// Status and totals are checked before anything is touched, so a
    /// rejected update leaves the order unchanged. Totals are recomputed
    /// whatever was supplied; the stored delivery fee is kept unless
    /// overridden.
    pub fn apply_update(&mut self, update: UpdateOrder, policy: StatusPolicy) -> Result<(), OrderError> {
        if let Some(status) = &update.status {
            policy.check(&self.status, status)?;
        }

        let delivery_fee = update.delivery_fee().unwrap_or(self.totals.delivery_fee);
        let items = update.items.map(with_money_scale);
        let discount_percent = update
            .payment
            .as_ref()
            .map_or(self.payment.discount_percent, |p| p.discount_percent);
        let totals = compute_totals(items.as_deref().unwrap_or(&self.items), discount_percent, delivery_fee)?;

        if let Some(customer) = update.customer {
            self.customer = customer;
        }
        if let Some(delivery) = update.delivery {
            self.delivery = delivery;
        }
        if let Some(payment) = update.payment {
            self.payment = payment;
        }
        if let Some(items) = items {
            self.items = items;
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        self.totals = totals;

        Ok(())
    }

    /// Mark the order cancelled. Returns false when it already was.
    pub fn cancel(&mut self) -> bool {
        if self.status.is_cancelled() {
            return false;
        }
        self.status = OrderStatus::Cancelled;
        true
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::test_fixtures::{sample_create_order, sample_item, sample_order};
    use crate::domain::order::value_objects::{PaymentMethod, TotalsOverride};
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_order_defaults() {
        let mut command = sample_create_order();
        command.totals = None;
        command.status = None;

        let new_order = NewOrder::from_command(command).unwrap();

        assert_eq!(new_order.status, OrderStatus::Draft);
        assert_eq!(new_order.totals.delivery_fee, dec!(0.00));
        assert_eq!(new_order.totals.total.to_string(), "22.50");
    }

    #[test]
    fn test_new_order_uses_delivery_fee_hint() {
        let new_order = NewOrder::from_command(sample_create_order()).unwrap();

        assert_eq!(new_order.totals.subtotal.to_string(), "25.00");
        assert_eq!(new_order.totals.delivery_fee.to_string(), "49.00");
        assert_eq!(new_order.totals.discount.to_string(), "2.50");
        assert_eq!(new_order.totals.total.to_string(), "71.50");
    }

    #[test]
    fn test_payment_update_replaces_only_payment() {
        let mut order = sample_order();
        let before = order.clone();

        let update = UpdateOrder {
            payment: Some(Payment {
                method: PaymentMethod::Card,
                deposit_amount: dec!(0),
                discount_percent: dec!(20),
            }),
            ..Default::default()
        };
        order.apply_update(update, StatusPolicy::Strict).unwrap();

        assert_eq!(order.customer, before.customer);
        assert_eq!(order.delivery, before.delivery);
        assert_eq!(order.items, before.items);
        assert_eq!(order.payment.method, PaymentMethod::Card);
        assert_eq!(order.totals.discount.to_string(), "5.00");
        assert_eq!(order.totals.total.to_string(), "69.00");
    }

    #[test]
    fn test_items_update_keeps_stored_delivery_fee() {
        let mut order = sample_order();

        let update = UpdateOrder {
            items: Some(vec![sample_item("C", dec!(100.00), 1)]),
            ..Default::default()
        };
        order.apply_update(update, StatusPolicy::Strict).unwrap();

        assert_eq!(order.items.len(), 1);
        assert_eq!(order.totals.subtotal.to_string(), "100.00");
        assert_eq!(order.totals.delivery_fee.to_string(), "49.00");
        assert_eq!(order.totals.discount.to_string(), "10.00");
        assert_eq!(order.totals.total.to_string(), "139.00");
    }

    #[test]
    fn test_delivery_fee_override() {
        let mut order = sample_order();

        let update = UpdateOrder {
            totals: Some(TotalsOverride {
                delivery_fee: Some(dec!(0)),
            }),
            ..Default::default()
        };
        order.apply_update(update, StatusPolicy::Strict).unwrap();

        assert_eq!(order.totals.delivery_fee.to_string(), "0.00");
        assert_eq!(order.totals.total.to_string(), "22.50");
    }

    #[test]
    fn test_strict_policy_rejects_leaving_cancelled() {
        let mut order = sample_order();
        order.status = OrderStatus::Cancelled;
        let before = order.clone();

        let update = UpdateOrder {
            status: Some(OrderStatus::Draft),
            items: Some(vec![]),
            ..Default::default()
        };
        let err = order.apply_update(update, StatusPolicy::Strict).unwrap_err();

        assert!(matches!(err, OrderError::InvalidStatusTransition { .. }));
        assert_eq!(order, before);
    }

    #[test]
    fn test_permissive_policy_allows_any_status() {
        let mut order = sample_order();
        order.status = OrderStatus::Cancelled;

        let update = UpdateOrder {
            status: Some(OrderStatus::Draft),
            ..Default::default()
        };
        order.apply_update(update, StatusPolicy::Permissive).unwrap();

        assert_eq!(order.status, OrderStatus::Draft);
    }

    #[test]
    fn test_strict_policy_transitions() {
        let policy = StatusPolicy::Strict;

        assert!(policy.check(&OrderStatus::Draft, &OrderStatus::Placed).is_ok());
        assert!(policy.check(&OrderStatus::Placed, &OrderStatus::Cancelled).is_ok());
        assert!(policy.check(&OrderStatus::Cancelled, &OrderStatus::Cancelled).is_ok());
        assert!(policy.check(&OrderStatus::Draft, &OrderStatus::from("pending")).is_ok());
        assert!(policy.check(&OrderStatus::Placed, &OrderStatus::Draft).is_err());
        assert!(policy.check(&OrderStatus::Cancelled, &OrderStatus::Placed).is_err());
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut order = sample_order();

        assert!(order.cancel());
        let after_first = order.clone();
        assert!(!order.cancel());

        assert_eq!(order, after_first);
        assert_eq!(order.status, OrderStatus::Cancelled);
    }

    #[test]
    fn test_status_policy_parsing() {
        assert_eq!("strict".parse::<StatusPolicy>().unwrap(), StatusPolicy::Strict);
        assert_eq!(" Permissive ".parse::<StatusPolicy>().unwrap(), StatusPolicy::Permissive);
        assert!("lenient".parse::<StatusPolicy>().is_err());
    }

    #[test]
    fn test_update_with_unstorable_totals_leaves_order_unchanged() {
        let mut order = sample_order();
        let before = order.clone();

        let update = UpdateOrder {
            items: Some(vec![sample_item("C", dec!(9999999999.99), 1000)]),
            status: Some(OrderStatus::Placed),
            ..Default::default()
        };
        let err = order.apply_update(update, StatusPolicy::Strict).unwrap_err();

        assert!(matches!(err, OrderError::Validation(_)));
        assert_eq!(order, before);
    }

    #[test]
    fn test_new_order_with_unstorable_totals_is_rejected() {
        let mut command = sample_create_order();
        command.items = vec![sample_item("A", dec!(9999999999.99), 2)];

        assert!(matches!(NewOrder::from_command(command), Err(OrderError::Validation(_))));
    }
}
