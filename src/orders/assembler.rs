use chrono::{DateTime, Utc};
use rand::{distributions::Alphanumeric, Rng};
use rust_decimal::Decimal;

use crate::cart::{Cart, CartLine};
use crate::orders::{Customer, Order, OrderError, OrderLine, OrderStatus, PaymentStatus, PriceCalculator};
use crate::settings::AdminSettings;

/// Generate an order id: `GB` + epoch millis + 3 random uppercase alphanumerics
pub fn generate_order_id(now: DateTime<Utc>) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(3)
        .map(|c| char::from(c).to_ascii_uppercase())
        .collect();
    format!("GB{}{}", now.timestamp_millis(), suffix)
}

/// Builds immutable order records from a priced cart
pub struct OrderAssembler;

impl OrderAssembler {
    /// Assemble an order with no discount
    pub fn assemble(
        cart: &Cart,
        customer: Customer,
        payment_method: &str,
        settings: &AdminSettings,
        now: DateTime<Utc>,
    ) -> Result<Order, OrderError> {
        Self::assemble_with_discount(cart, customer, payment_method, settings, None, now)
    }

    /// Assemble an order
    ///
    /// Fails on an empty cart, blank customer fields, a blank payment method,
    /// a subtotal under the store minimum, or a discount that is negative or
    /// larger than the pre-discount total.
    pub fn assemble_with_discount(
        cart: &Cart,
        customer: Customer,
        payment_method: &str,
        settings: &AdminSettings,
        discount: Option<Decimal>,
        now: DateTime<Utc>,
    ) -> Result<Order, OrderError> {
        if cart.is_empty() {
            return Err(OrderError::ValidationError("Cart is empty".to_string()));
        }

        let blank = customer.blank_fields();
        if !blank.is_empty() {
            return Err(OrderError::ValidationError(format!(
                "Customer fields must not be blank: {}",
                blank.join(", ")
            )));
        }

        if payment_method.trim().is_empty() {
            return Err(OrderError::ValidationError(
                "Payment method must not be blank".to_string(),
            ));
        }

        let items: Vec<OrderLine> = cart.lines().iter().map(snapshot_line).collect();
        let line_totals: Vec<Decimal> = items.iter().map(|line| line.line_total).collect();
        let sub_total = PriceCalculator::calculate_subtotal(&line_totals);

        if settings.minimum_order_amount > Decimal::ZERO && sub_total < settings.minimum_order_amount {
            return Err(OrderError::ValidationError(format!(
                "Order subtotal {} is below the minimum order amount {}",
                sub_total, settings.minimum_order_amount
            )));
        }

        let tax = PriceCalculator::calculate_tax(sub_total, settings.tax_rate);
        let shipping_fee = settings.shipping_fee;
        let discount_amount = discount.unwrap_or(Decimal::ZERO);

        if discount_amount < Decimal::ZERO {
            return Err(OrderError::ValidationError(
                "Discount must not be negative".to_string(),
            ));
        }

        let total = PriceCalculator::calculate_total(sub_total, tax, shipping_fee, discount_amount);
        if total < Decimal::ZERO {
            return Err(OrderError::ValidationError(
                "Discount exceeds the order total".to_string(),
            ));
        }

        Ok(Order {
            id: generate_order_id(now),
            customer,
            items,
            sub_total,
            tax,
            shipping_fee,
            discount,
            total,
            currency: settings.currency.clone(),
            status: OrderStatus::Pending,
            payment_method: payment_method.trim().to_string(),
            payment_status: PaymentStatus::Pending,
            notes: None,
            version: 1,
            created_at: now,
            updated_at: now,
        })
    }
}

fn snapshot_line(line: &CartLine) -> OrderLine {
    let unit_price = line.unit_price();
    OrderLine {
        product_id: line.product.id.clone(),
        product_name: line.product.name.clone(),
        category: line.product.category.clone(),
        tier: line.tier,
        quantity: line.quantity,
        unit_price,
        line_total: PriceCalculator::calculate_line_total(line.quantity, unit_price),
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::catalog::seed::default_products;
    use crate::catalog::PriceTier;
    use proptest::prelude::*;
    use std::sync::Arc;

    fn customer() -> Customer {
        Customer {
            name: "Tunde".to_string(),
            email: "tunde@example.com".to_string(),
            phone: "0803".to_string(),
            address: "1 Marina".to_string(),
            city: "Lagos".to_string(),
            state: "Lagos".to_string(),
        }
    }

    /// total = sub_total + tax + shipping_fee and sub_total matches the cart
    #[test]
    fn prop_assembled_totals_match_cart() {
        proptest!(|(
            quantities in prop::collection::vec(1i32..=30, 1..=3),
            rate_tenths in 0u32..=1000,
            shipping in 0u32..=10_000
        )| {
            let products: Vec<Arc<_>> = default_products(Utc::now()).into_iter().map(Arc::new).collect();
            let mut cart = Cart::new();
            for (index, quantity) in quantities.iter().enumerate() {
                cart.add_item(products[index].clone(), *quantity, PriceTier::Retail).unwrap();
            }
            let settings = AdminSettings {
                tax_rate: Decimal::from(rate_tenths) / Decimal::from(10),
                shipping_fee: Decimal::from(shipping),
                minimum_order_amount: Decimal::ZERO,
                ..AdminSettings::default()
            };

            let order = OrderAssembler::assemble(&cart, customer(), "Cash", &settings, Utc::now()).unwrap();
            prop_assert_eq!(order.sub_total, cart.compute_subtotal());
            prop_assert_eq!(order.tax, order.sub_total * settings.tax_rate / Decimal::ONE_HUNDRED);
            prop_assert_eq!(order.total, order.sub_total + order.tax + order.shipping_fee);
        });
    }
}
