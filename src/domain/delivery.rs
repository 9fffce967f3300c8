use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::domain::order::round_money;

/// Flat-rate delivery pricing: one fee per order, waived for larger orders.
///
/// The quote counts item lines, not units. Orders never call this on their
/// own; clients quote first and send the fee back as `totals.deliveryFee`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeliveryFeeSchedule {
    pub flat_fee: Decimal,
    pub free_from_items: usize,
}

impl Default for DeliveryFeeSchedule {
    fn default() -> Self {
        Self {
            flat_fee: dec!(49.00),
            free_from_items: 3,
        }
    }
}

impl DeliveryFeeSchedule {
    pub fn new(flat_fee: Decimal, free_from_items: usize) -> Self {
        Self {
            flat_fee: round_money(flat_fee),
            free_from_items,
        }
    }

    pub fn quote(&self, item_count: usize) -> Decimal {
        if item_count >= self.free_from_items {
            round_money(Decimal::ZERO)
        } else {
            round_money(self.flat_fee)
        }
    }
}
