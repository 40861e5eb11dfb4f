use rust_decimal::Decimal;

use crate::cart::CartError;
use crate::catalog::{PriceTier, Product};

/// Largest quantity a single cart line may hold
pub const MAX_LINE_QUANTITY: i32 = 10_000;

/// Resolves tier prices and quantity gates for a product
pub struct PricingResolver;

impl PricingResolver {
    /// Unit price of `product` under `tier`
    pub fn resolve_unit_price(product: &Product, tier: PriceTier) -> Decimal {
        match tier {
            PriceTier::Retail => product.retail_price,
            PriceTier::Wholesale => product.wholesale_price,
        }
    }

    /// Smallest quantity a line of this tier may hold
    pub fn minimum_quantity(product: &Product, tier: PriceTier) -> i32 {
        match tier {
            PriceTier::Retail => 1,
            PriceTier::Wholesale => product.minimum_wholesale_quantity.max(1),
        }
    }

    /// Reject quantities below the tier minimum or above [`MAX_LINE_QUANTITY`]
    ///
    /// Quantities are never clamped here; adjusting user input is the
    /// caller's concern.
    pub fn check_quantity(product: &Product, tier: PriceTier, quantity: i32) -> Result<(), CartError> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity {
                product_id: product.id.clone(),
                quantity,
            });
        }

        if quantity > MAX_LINE_QUANTITY {
            return Err(CartError::QuantityTooLarge {
                product_id: product.id.clone(),
                limit: MAX_LINE_QUANTITY,
                requested: i64::from(quantity),
            });
        }

        let minimum = Self::minimum_quantity(product, tier);
        if quantity < minimum {
            return Err(CartError::BelowWholesaleMinimum {
                product_id: product.id.clone(),
                minimum,
                requested: quantity,
            });
        }

        Ok(())
    }
}
