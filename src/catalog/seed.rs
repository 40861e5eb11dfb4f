// Default catalog used when the store starts with no products

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::catalog::{Product, ProductRepository};
use crate::db::PersistenceError;

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// The three starter products of the storefront
pub fn default_products(now: DateTime<Utc>) -> Vec<Product> {
    let placeholder = "/api/placeholder/300/300";
    vec![
        Product {
            id: "prod_1".to_string(),
            name: "Brightening Vitamin C Serum".to_string(),
            description: "A powerful brightening serum with 20% Vitamin C to reduce dark spots and even skin tone.".to_string(),
            category: "Serums".to_string(),
            retail_price: Decimal::from(15000),
            wholesale_price: Decimal::from(10000),
            minimum_wholesale_quantity: 6,
            stock_quantity: 50,
            in_stock: true,
            featured: true,
            image: placeholder.to_string(),
            images: strings(&[placeholder, placeholder]),
            benefits: strings(&["Brightens skin", "Reduces dark spots", "Anti-aging", "Evens skin tone"]),
            ingredients: strings(&["Vitamin C", "Hyaluronic Acid", "Vitamin E", "Niacinamide"]),
            created_at: now,
            updated_at: now,
        },
        Product {
            id: "prod_2".to_string(),
            name: "Hydrating Hyaluronic Acid Moisturizer".to_string(),
            description: "Deep hydrating moisturizer with hyaluronic acid for all skin types.".to_string(),
            category: "Moisturizers".to_string(),
            retail_price: Decimal::from(12000),
            wholesale_price: Decimal::from(8000),
            minimum_wholesale_quantity: 6,
            stock_quantity: 30,
            in_stock: true,
            featured: false,
            image: placeholder.to_string(),
            images: strings(&[placeholder, placeholder]),
            benefits: strings(&["Deep hydration", "Plumps skin", "Reduces fine lines", "Non-greasy"]),
            ingredients: strings(&["Hyaluronic Acid", "Ceramides", "Glycerin", "Peptides"]),
            created_at: now,
            updated_at: now,
        },
        Product {
            id: "prod_3".to_string(),
            name: "Gentle Cleansing Foam".to_string(),
            description: "Gentle yet effective cleansing foam that removes impurities without stripping the skin.".to_string(),
            category: "Cleansers".to_string(),
            retail_price: Decimal::from(8000),
            wholesale_price: Decimal::from(5500),
            minimum_wholesale_quantity: 8,
            stock_quantity: 45,
            in_stock: true,
            featured: false,
            image: placeholder.to_string(),
            images: strings(&[placeholder, placeholder]),
            benefits: strings(&["Gentle cleansing", "Maintains pH balance", "Removes makeup", "Suitable for sensitive skin"]),
            ingredients: strings(&["Coconut Oil", "Aloe Vera", "Chamomile Extract", "Green Tea"]),
            created_at: now,
            updated_at: now,
        },
    ]
}

/// Insert the default products when the catalog is empty
///
/// Returns the number of products inserted.
pub async fn seed_if_empty(repo: &dyn ProductRepository) -> Result<usize, PersistenceError> {
    if !repo.list().await?.is_empty() {
        tracing::debug!("Catalog already populated, skipping seed");
        return Ok(0);
    }

    let products = default_products(Utc::now());
    for product in &products {
        repo.insert(product).await?;
    }

    tracing::info!("Seeded catalog with {} default products", products.len());
    Ok(products.len())
}
