use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::commands::{CreateOrder, UpdateOrder};
use super::errors::OrderError;
use super::totals::{MAX_AMOUNT, MONEY_SCALE};
use super::value_objects::{Address, Customer, LineItem, OrderStatus, Payment, SecondPerson, TotalsOverride};

// ============================================================================
// Boundary Validation
// ============================================================================
//
// Structural shape is enforced by serde when a request is decoded. The rules
// here cover ranges and lengths, and mirror the column limits of the sales
// tables so nothing is silently truncated on write.
//
// ============================================================================

/// Discounts above 100% are allowed and produce a negative total
pub const MAX_DISCOUNT_PERCENT: Decimal = dec!(1000);
pub const MAX_DISCOUNT_SCALE: u32 = 4;

pub const MAX_SKU_LEN: usize = 100;
pub const MAX_NAME_LEN: usize = 255;
pub const MAX_COLOR_LEN: usize = 50;
pub const MAX_STATUS_LEN: usize = 32;

pub trait Validate {
    fn validate(&self) -> Result<(), OrderError>;
}

fn require_text(field: &str, value: &str) -> Result<(), OrderError> {
    if value.trim().is_empty() {
        return Err(OrderError::validation(format!("{field} is required")));
    }
    Ok(())
}

fn require_max_len(field: &str, value: &str, max: usize) -> Result<(), OrderError> {
    if value.chars().count() > max {
        return Err(OrderError::validation(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

/// Non-negative, at most two decimal places, fits the amount columns
pub fn require_amount(field: &str, value: Decimal) -> Result<(), OrderError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(OrderError::validation(format!("{field} must not be negative")));
    }
    if value.normalize().scale() > MONEY_SCALE {
        return Err(OrderError::validation(format!(
            "{field} must have at most {MONEY_SCALE} decimal places"
        )));
    }
    if value > MAX_AMOUNT {
        return Err(OrderError::validation(format!("{field} exceeds {MAX_AMOUNT}")));
    }
    Ok(())
}

impl Validate for LineItem {
    fn validate(&self) -> Result<(), OrderError> {
        require_text("sku", &self.sku)?;
        require_max_len("sku", &self.sku, MAX_SKU_LEN)?;
        require_text("name", &self.name)?;
        require_max_len("name", &self.name, MAX_NAME_LEN)?;
        if let Some(color) = &self.color {
            require_max_len("color", color, MAX_COLOR_LEN)?;
        }
        require_amount("price", self.unit_price)?;
        if self.quantity < 1 {
            return Err(OrderError::validation(format!(
                "qty must be at least 1, got {}",
                self.quantity
            )));
        }
        Ok(())
    }
}

impl Validate for Address {
    fn validate(&self) -> Result<(), OrderError> {
        require_text("street", &self.street)?;
        require_text("city", &self.city)?;
        require_text("state", &self.state)?;
        require_text("zip", &self.zip)
    }
}

impl Validate for SecondPerson {
    fn validate(&self) -> Result<(), OrderError> {
        require_text("secondPerson.firstName", &self.first_name)?;
        require_text("secondPerson.lastName", &self.last_name)
    }
}

impl Validate for Customer {
    fn validate(&self) -> Result<(), OrderError> {
        require_text("customer.firstName", &self.first_name)?;
        require_text("customer.lastName", &self.last_name)?;
        require_text("customer.phone", &self.phone)?;
        require_text("customer.email", &self.email)?;
        if !self.email.contains('@') {
            return Err(OrderError::validation(format!(
                "customer.email is not an email address: {}",
                self.email
            )));
        }
        if let Some(person) = &self.second_person {
            person.validate()?;
        }
        for address in [&self.billing_address, &self.delivery_address].into_iter().flatten() {
            address.validate()?;
        }
        Ok(())
    }
}

impl Validate for Payment {
    fn validate(&self) -> Result<(), OrderError> {
        require_amount("payment.depositAmount", self.deposit_amount)?;
        if self.discount_percent.is_sign_negative() && !self.discount_percent.is_zero() {
            return Err(OrderError::validation("payment.discountPercent must not be negative"));
        }
        if self.discount_percent > MAX_DISCOUNT_PERCENT {
            return Err(OrderError::validation(format!(
                "payment.discountPercent must be at most {MAX_DISCOUNT_PERCENT}"
            )));
        }
        if self.discount_percent.normalize().scale() > MAX_DISCOUNT_SCALE {
            return Err(OrderError::validation(format!(
                "payment.discountPercent must have at most {MAX_DISCOUNT_SCALE} decimal places"
            )));
        }
        Ok(())
    }
}

impl Validate for OrderStatus {
    fn validate(&self) -> Result<(), OrderError> {
        require_text("status", self.as_str())?;
        require_max_len("status", self.as_str(), MAX_STATUS_LEN)
    }
}

impl Validate for TotalsOverride {
    fn validate(&self) -> Result<(), OrderError> {
        match self.delivery_fee {
            Some(fee) => require_amount("totals.deliveryFee", fee),
            None => Ok(()),
        }
    }
}

fn validate_items(items: &[LineItem]) -> Result<(), OrderError> {
    for (index, item) in items.iter().enumerate() {
        item.validate()
            .map_err(|e| match e {
                OrderError::Validation(msg) => OrderError::validation(format!("items[{index}].{msg}")),
                other => other,
            })?;
    }
    Ok(())
}

impl Validate for CreateOrder {
    fn validate(&self) -> Result<(), OrderError> {
        self.customer.validate()?;
        self.payment.validate()?;
        validate_items(&self.items)?;
        if let Some(status) = &self.status {
            status.validate()?;
        }
        if let Some(totals) = &self.totals {
            totals.validate()?;
        }
        Ok(())
    }
}

impl Validate for UpdateOrder {
    fn validate(&self) -> Result<(), OrderError> {
        if let Some(customer) = &self.customer {
            customer.validate()?;
        }
        if let Some(payment) = &self.payment {
            payment.validate()?;
        }
        if let Some(items) = &self.items {
            validate_items(items)?;
        }
        if let Some(status) = &self.status {
            status.validate()?;
        }
        if let Some(totals) = &self.totals {
            totals.validate()?;
        }
        Ok(())
    }
}
