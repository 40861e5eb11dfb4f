use thiserror::Error;

/// Input errors raised while building a cart
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("Quantity for product {product_id} must be at least 1, got {quantity}")]
    InvalidQuantity { product_id: String, quantity: i32 },

    #[error("Wholesale orders of product {product_id} need at least {minimum} units, got {requested}")]
    BelowWholesaleMinimum {
        product_id: String,
        minimum: i32,
        requested: i32,
    },

    #[error("Quantity for product {product_id} may not exceed {limit}, got {requested}")]
    QuantityTooLarge {
        product_id: String,
        limit: i32,
        requested: i64,
    },

    #[error("Product {0} is out of stock")]
    OutOfStock(String),
}
