use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use super::errors::OrderError;
use super::value_objects::{LineItem, Totals};

// ============================================================================
// Totals Calculator
// ============================================================================
//
// Pure function of (items, discount percent, delivery fee). All arithmetic is
// exact, checked decimal; rounding to cents happens once, on output.
//
// ============================================================================

/// Number of decimal places carried by every stored amount
pub const MONEY_SCALE: u32 = 2;

/// Largest amount a NUMERIC(12,2) column holds
pub const MAX_AMOUNT: Decimal = dec!(9999999999.99);

/// Round an amount to cents (midpoint away from zero) and pin the scale so
/// that `25` is reported as `25.00`.
pub fn round_money(amount: Decimal) -> Decimal {
    let mut rounded = amount.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}

fn overflow() -> OrderError {
    OrderError::validation(format!("order totals exceed the maximum amount of {MAX_AMOUNT}"))
}

fn require_storable(field: &str, amount: Decimal) -> Result<(), OrderError> {
    if amount.abs() > MAX_AMOUNT {
        return Err(OrderError::validation(format!(
            "{field} {amount} exceeds the maximum amount of {MAX_AMOUNT}"
        )));
    }
    Ok(())
}

/// Compute order totals.
///
/// `total` is derived from the already rounded components, so
/// `total == subtotal + delivery_fee - discount` holds exactly on the output.
/// A discount larger than subtotal plus fee yields a negative total; it is
/// not clamped.
///
/// Fails with `OrderError::Validation` when any amount would not fit the
/// totals columns, including arithmetic overflow.
pub fn compute_totals(items: &[LineItem], discount_percent: Decimal, delivery_fee: Decimal) -> Result<Totals, OrderError> {
    let exact_subtotal = items.iter().try_fold(Decimal::ZERO, |acc, item| {
        item.line_total().and_then(|line| acc.checked_add(line))
    });
    let exact_subtotal = exact_subtotal.ok_or_else(overflow)?;
    let exact_discount = exact_subtotal
        .checked_mul(discount_percent)
        .and_then(|amount| amount.checked_div(dec!(100)))
        .ok_or_else(overflow)?;

    let subtotal = round_money(exact_subtotal);
    let delivery_fee = round_money(delivery_fee);
    let discount = round_money(exact_discount);
    require_storable("subtotal", subtotal)?;
    require_storable("deliveryFee", delivery_fee)?;
    require_storable("discount", discount)?;

    // Each operand is below MAX_AMOUNT, so this cannot overflow
    let total = round_money(subtotal + delivery_fee - discount);
    require_storable("total", total)?;

    Ok(Totals {
        subtotal,
        delivery_fee,
        discount,
        total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(sku: &str, unit_price: Decimal, quantity: i32) -> LineItem {
        LineItem {
            sku: sku.to_string(),
            name: format!("{sku} product"),
            unit_price,
            quantity,
            color: None,
        }
    }

    #[test]
    fn test_reference_order_totals() {
        let items = vec![item("A", dec!(10.00), 2), item("B", dec!(5.00), 1)];

        let totals = compute_totals(&items, dec!(10), dec!(49.00)).unwrap();

        assert_eq!(totals.subtotal.to_string(), "25.00");
        assert_eq!(totals.discount.to_string(), "2.50");
        assert_eq!(totals.delivery_fee.to_string(), "49.00");
        assert_eq!(totals.total.to_string(), "71.50");
    }

    #[test]
    fn test_empty_items_with_fee() {
        let totals = compute_totals(&[], dec!(0), dec!(49)).unwrap();

        assert_eq!(totals.subtotal.to_string(), "0.00");
        assert_eq!(totals.discount.to_string(), "0.00");
        assert_eq!(totals.total.to_string(), "49.00");
    }

    #[test]
    fn test_discount_rounds_half_away_from_zero() {
        // 19.99 * 15% = 2.9985
        let totals = compute_totals(&[item("A", dec!(19.99), 1)], dec!(15), Decimal::ZERO).unwrap();
        assert_eq!(totals.discount.to_string(), "3.00");
        assert_eq!(totals.total.to_string(), "16.99");

        // 0.10 * 25% = 0.025
        let totals = compute_totals(&[item("B", dec!(0.10), 1)], dec!(25), Decimal::ZERO).unwrap();
        assert_eq!(totals.discount.to_string(), "0.03");
        assert_eq!(totals.total.to_string(), "0.07");
    }

    #[test]
    fn test_multi_line_discount_rounds_once() {
        let items = vec![
            item("A", dec!(1.11), 3),
            item("B", dec!(2.22), 7),
            item("C", dec!(0.01), 999),
        ];

        let totals = compute_totals(&items, dec!(12.5), dec!(0)).unwrap();

        // 3.33 + 15.54 + 9.99 = 28.86; 28.86 * 0.125 = 3.6075
        assert_eq!(totals.subtotal, dec!(28.86));
        assert_eq!(totals.discount, dec!(3.61));
        assert_eq!(totals.total, dec!(25.25));
    }

    #[test]
    fn test_total_identity_holds_exactly() {
        let prices = [dec!(0.00), dec!(0.01), dec!(9.99), dec!(1234.56), dec!(333.33)];
        let percents = [dec!(0), dec!(7.5), dec!(33.333), dec!(100), dec!(150)];
        let fees = [dec!(0), dec!(49.00), dec!(12.345)];

        for price in prices {
            for qty in [1, 3, 17] {
                for pct in percents {
                    for fee in fees {
                        let totals = compute_totals(&[item("X", price, qty)], pct, fee).unwrap();

                        assert_eq!(totals.total, totals.subtotal + totals.delivery_fee - totals.discount);
                        for amount in [totals.subtotal, totals.delivery_fee, totals.discount, totals.total] {
                            assert_eq!(amount.scale(), MONEY_SCALE);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_negative_total_is_not_clamped() {
        let totals = compute_totals(&[item("A", dec!(10.00), 1)], dec!(150), dec!(0)).unwrap();

        assert_eq!(totals.discount.to_string(), "15.00");
        assert_eq!(totals.total.to_string(), "-5.00");
    }

    #[test]
    fn test_compute_totals_is_deterministic() {
        let items = vec![item("A", dec!(19.99), 4), item("B", dec!(0.05), 3)];

        let first = compute_totals(&items, dec!(12), dec!(49)).unwrap();
        let second = compute_totals(&items, dec!(12), dec!(49)).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_subtotal_beyond_column_range_is_rejected() {
        let items = vec![item("A", MAX_AMOUNT, 1000)];

        let err = compute_totals(&items, dec!(0), dec!(0)).unwrap_err();

        assert!(matches!(err, OrderError::Validation(ref msg) if msg.contains("subtotal")));
    }

    #[test]
    fn test_largest_storable_order_is_accepted() {
        let totals = compute_totals(&[item("A", MAX_AMOUNT, 1)], dec!(0), dec!(0)).unwrap();

        assert_eq!(totals.total, MAX_AMOUNT);
    }

    #[test]
    fn test_arithmetic_overflow_is_an_error() {
        let items = vec![item("A", Decimal::MAX, 2)];
        assert!(matches!(
            compute_totals(&items, dec!(0), dec!(0)),
            Err(OrderError::Validation(_))
        ));

        let items = vec![item("A", dec!(1000.00), 1)];
        assert!(matches!(
            compute_totals(&items, Decimal::MAX, dec!(0)),
            Err(OrderError::Validation(_))
        ));
    }
}
