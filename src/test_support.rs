// Shared fixtures for unit tests

use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;

use crate::catalog::PriceTier;
use crate::orders::{Customer, Order, OrderLine, OrderStatus, PaymentStatus};

pub fn customer() -> Customer {
    Customer {
        name: "Amaka Obi".to_string(),
        email: "amaka@example.com".to_string(),
        phone: "+234 803 000 0000".to_string(),
        address: "12 Admiralty Way".to_string(),
        city: "Lekki".to_string(),
        state: "Lagos".to_string(),
    }
}

pub fn order_line(name: &str, tier: PriceTier, quantity: i32, unit_price: rust_decimal::Decimal) -> OrderLine {
    OrderLine {
        product_id: format!("prod_{}", name.len()),
        product_name: name.to_string(),
        category: "Serums".to_string(),
        tier,
        quantity,
        unit_price,
        line_total: unit_price * rust_decimal::Decimal::from(quantity),
    }
}

/// One wholesale serum line, placed 19 Oct 2026 14:05 UTC
pub fn sample_order() -> Order {
    let created = Utc.with_ymd_and_hms(2026, 10, 19, 14, 5, 0).unwrap();
    Order {
        id: "GB1760882700000X7K".to_string(),
        customer: customer(),
        items: vec![OrderLine {
            product_id: "prod_1".to_string(),
            product_name: "Brightening Vitamin C Serum".to_string(),
            category: "Serums".to_string(),
            tier: PriceTier::Wholesale,
            quantity: 6,
            unit_price: dec!(10000),
            line_total: dec!(60000),
        }],
        sub_total: dec!(60000),
        tax: dec!(0),
        shipping_fee: dec!(2000),
        discount: None,
        total: dec!(62000),
        currency: "NGN".to_string(),
        status: OrderStatus::Pending,
        payment_method: "Bank Transfer".to_string(),
        payment_status: PaymentStatus::Pending,
        notes: None,
        version: 1,
        created_at: created,
        updated_at: created,
    }
}
