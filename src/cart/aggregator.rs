use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::cart::CartError;
use crate::catalog::{PriceTier, PricingResolver, Product, MAX_LINE_QUANTITY};

/// One cart entry; identified by (product id, tier)
#[derive(Debug, Clone)]
pub struct CartLine {
    pub product: Arc<Product>,
    pub tier: PriceTier,
    pub quantity: i32,
}

impl CartLine {
    pub fn unit_price(&self) -> Decimal {
        PricingResolver::resolve_unit_price(&self.product, self.tier)
    }

    pub fn line_total(&self) -> Decimal {
        self.unit_price() * Decimal::from(self.quantity)
    }

    fn is(&self, product_id: &str, tier: PriceTier) -> bool {
        self.product.id == product_id && self.tier == tier
    }
}

/// Priced view of a cart line for API responses
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CartLineView {
    pub product_id: String,
    pub product_name: String,
    pub tier: PriceTier,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product.id.clone(),
            product_name: line.product.name.clone(),
            tier: line.tier,
            quantity: line.quantity,
            unit_price: line.unit_price(),
            line_total: line.line_total(),
        }
    }
}

/// Shopping cart holding at most one line per (product id, tier)
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` units of `product` at `tier`
    ///
    /// An existing line with the same key is incremented; otherwise a new
    /// line is appended, in which case the tier minimum applies. No line may
    /// exceed [`MAX_LINE_QUANTITY`]. The cart is left untouched on error.
    pub fn add_item(&mut self, product: Arc<Product>, quantity: i32, tier: PriceTier) -> Result<(), CartError> {
        if let Some(line) = self.lines.iter_mut().find(|l| l.is(&product.id, tier)) {
            if quantity < 1 {
                return Err(CartError::InvalidQuantity {
                    product_id: product.id.clone(),
                    quantity,
                });
            }
            let merged = i64::from(line.quantity) + i64::from(quantity);
            line.quantity = i32::try_from(merged)
                .ok()
                .filter(|total| *total <= MAX_LINE_QUANTITY)
                .ok_or_else(|| CartError::QuantityTooLarge {
                    product_id: product.id.clone(),
                    limit: MAX_LINE_QUANTITY,
                    requested: merged,
                })?;
            return Ok(());
        }

        PricingResolver::check_quantity(&product, tier, quantity)?;
        self.lines.push(CartLine {
            product,
            tier,
            quantity,
        });
        Ok(())
    }

    /// Set the quantity of an existing line
    ///
    /// A quantity of zero or less removes the line. Absent lines are ignored.
    pub fn update_quantity(&mut self, product_id: &str, tier: PriceTier, quantity: i32) -> Result<(), CartError> {
        if quantity <= 0 {
            self.remove_item(product_id, tier);
            return Ok(());
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.is(product_id, tier)) {
            PricingResolver::check_quantity(&line.product, tier, quantity)?;
            line.quantity = quantity;
        }
        Ok(())
    }

    pub fn remove_item(&mut self, product_id: &str, tier: PriceTier) {
        self.lines.retain(|l| !l.is(product_id, tier));
    }

    /// Sum of unit price × quantity over all lines
    pub fn compute_subtotal(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn views(&self) -> Vec<CartLineView> {
        self.lines.iter().map(CartLineView::from).collect()
    }
}
