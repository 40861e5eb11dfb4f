use rust_decimal::Decimal;

/// Service for calculating order amounts
pub struct PriceCalculator;

impl PriceCalculator {
    /// Calculate the total of one line
    ///
    /// # Arguments
    /// * `quantity` - Number of units ordered
    /// * `unit_price` - Price per unit at time of order
    pub fn calculate_line_total(quantity: i32, unit_price: Decimal) -> Decimal {
        Decimal::from(quantity) * unit_price
    }

    /// Sum of line totals
    pub fn calculate_subtotal(line_totals: &[Decimal]) -> Decimal {
        line_totals.iter().sum()
    }

    /// Tax charged on the subtotal only, unrounded
    ///
    /// # Arguments
    /// * `sub_total` - Order subtotal
    /// * `tax_rate` - Percentage in 0..=100
    pub fn calculate_tax(sub_total: Decimal, tax_rate: Decimal) -> Decimal {
        sub_total * tax_rate / Decimal::ONE_HUNDRED
    }

    /// sub_total + tax + shipping_fee - discount
    pub fn calculate_total(sub_total: Decimal, tax: Decimal, shipping_fee: Decimal, discount: Decimal) -> Decimal {
        sub_total + tax + shipping_fee - discount
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn cents(value: u32) -> Decimal {
        Decimal::from(value) / Decimal::from(100)
    }

    /// total = sub_total + tax + shipping - discount
    #[test]
    fn prop_total_identity() {
        proptest!(|(
            sub in 0u32..=10_000_000,
            rate_bp in 0u32..=10_000,
            ship in 0u32..=500_000,
            disc in 0u32..=100_000
        )| {
            let sub_total = cents(sub);
            let rate = cents(rate_bp);
            let tax = PriceCalculator::calculate_tax(sub_total, rate);
            let total = PriceCalculator::calculate_total(sub_total, tax, cents(ship), cents(disc));
            prop_assert_eq!(total - tax - cents(ship) + cents(disc), sub_total);
            prop_assert_eq!(tax, sub_total * rate / Decimal::ONE_HUNDRED);
        });
    }

    /// Tax never exceeds the subtotal for rates up to 100%
    #[test]
    fn prop_tax_is_bounded_by_subtotal() {
        proptest!(|(sub in 0u32..=10_000_000, rate_bp in 0u32..=10_000)| {
            let sub_total = cents(sub);
            let tax = PriceCalculator::calculate_tax(sub_total, cents(rate_bp));
            prop_assert!(tax >= Decimal::ZERO);
            prop_assert!(tax <= sub_total);
        });
    }

    /// Order of lines doesn't affect the subtotal
    #[test]
    fn prop_subtotal_is_commutative() {
        proptest!(|(values in prop::collection::vec(1u32..=100_000u32, 2..=10))| {
            let totals: Vec<Decimal> = values.iter().map(|&v| cents(v)).collect();
            let mut reversed = totals.clone();
            reversed.reverse();
            prop_assert_eq!(
                PriceCalculator::calculate_subtotal(&totals),
                PriceCalculator::calculate_subtotal(&reversed)
            );
        });
    }
}
