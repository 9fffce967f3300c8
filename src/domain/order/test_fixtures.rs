use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use super::aggregate::{NewOrder, Order};
use super::commands::CreateOrder;
use super::value_objects::{
    Customer, DeliveryDetails, LineItem, Payment, PaymentMethod, TotalsOverride,
};

pub fn sample_item(sku: &str, unit_price: Decimal, quantity: i32) -> LineItem {
    LineItem {
        sku: sku.to_string(),
        name: format!("Product {sku}"),
        unit_price,
        quantity,
        color: None,
    }
}

pub fn sample_customer() -> Customer {
    Customer {
        first_name: "Ada".to_string(),
        last_name: "Lovelace".to_string(),
        name: None,
        phone: "0400 000 000".to_string(),
        email: "ada@example.com".to_string(),
        additional_phone: None,
        second_person: None,
        billing_address: None,
        delivery_address: None,
        same_as_delivery: Some(true),
    }
}

pub fn sample_delivery() -> DeliveryDetails {
    DeliveryDetails {
        preferred_date: "2026-11-02".to_string(),
        time_slot: "morning".to_string(),
        special_instructions: "Side gate".to_string(),
        white_glove_service: false,
        old_mattress_removal: true,
        setup_service: false,
    }
}

/// Items A(10.00 x 2) and B(5.00 x 1), 10% discount, 49.00 delivery
pub fn sample_create_order() -> CreateOrder {
    CreateOrder {
        customer: sample_customer(),
        items: vec![sample_item("A", dec!(10.00), 2), sample_item("B", dec!(5.00), 1)],
        delivery: sample_delivery(),
        payment: Payment {
            method: PaymentMethod::Cash,
            deposit_amount: dec!(100.00),
            discount_percent: dec!(10),
        },
        totals: Some(TotalsOverride {
            delivery_fee: Some(dec!(49.00)),
        }),
        status: None,
    }
}

pub fn sample_order() -> Order {
    NewOrder::from_command(sample_create_order())
        .unwrap()
        .into_order(Uuid::now_v7(), 1, Utc::now())
}
