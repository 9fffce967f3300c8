use serde::Deserialize;

use super::value_objects::{Customer, DeliveryDetails, LineItem, OrderStatus, Payment, TotalsOverride};

// ============================================================================
// Order Commands - Represent user intent
// ============================================================================

/// Create a new order.
///
/// `totals` is a hint: only its `deliveryFee` is honoured, everything else is
/// computed server side.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrder {
    pub customer: Customer,
    pub items: Vec<LineItem>,
    pub delivery: DeliveryDetails,
    pub payment: Payment,
    #[serde(default)]
    pub totals: Option<TotalsOverride>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
}

impl CreateOrder {
    pub fn delivery_fee(&self) -> Option<rust_decimal::Decimal> {
        self.totals.and_then(|t| t.delivery_fee)
    }
}

/// Sparse update. Every supplied field replaces the stored value as a whole;
/// absent fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrder {
    #[serde(default)]
    pub customer: Option<Customer>,
    #[serde(default)]
    pub delivery: Option<DeliveryDetails>,
    #[serde(default)]
    pub payment: Option<Payment>,
    #[serde(default)]
    pub items: Option<Vec<LineItem>>,
    #[serde(default)]
    pub status: Option<OrderStatus>,
    #[serde(default)]
    pub totals: Option<TotalsOverride>,
}

impl UpdateOrder {
    pub fn delivery_fee(&self) -> Option<rust_decimal::Decimal> {
        self.totals.and_then(|t| t.delivery_fee)
    }

    /// Names of the fields this update touches, for logging
    pub fn touched_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.customer.is_some() {
            fields.push("customer");
        }
        if self.delivery.is_some() {
            fields.push("delivery");
        }
        if self.payment.is_some() {
            fields.push("payment");
        }
        if self.items.is_some() {
            fields.push("items");
        }
        if self.status.is_some() {
            fields.push("status");
        }
        if self.delivery_fee().is_some() {
            fields.push("totals.deliveryFee");
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_update_from_sparse_json() {
        let update: UpdateOrder = serde_json::from_str(
            r#"{"payment": {"method": "card", "discountPercent": 5}, "totals": {"deliveryFee": 0}}"#,
        )
        .unwrap();

        assert!(update.customer.is_none());
        assert!(update.items.is_none());
        assert_eq!(update.payment.as_ref().unwrap().discount_percent, dec!(5));
        assert_eq!(update.delivery_fee(), Some(dec!(0)));
        assert_eq!(update.touched_fields(), vec!["payment", "totals.deliveryFee"]);
    }

    #[test]
    fn test_update_with_null_fields_touches_nothing() {
        let update: UpdateOrder =
            serde_json::from_str(r#"{"customer": null, "items": null, "totals": {}}"#).unwrap();

        assert!(update.touched_fields().is_empty());
    }
}
