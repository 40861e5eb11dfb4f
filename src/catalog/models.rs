use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::validation::{validate_non_negative_amount, validate_not_blank};

/// Pricing mode for a cart or order line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PriceTier {
    Retail,
    Wholesale,
}

impl PriceTier {
    /// Convert tier to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceTier::Retail => "retail",
            PriceTier::Wholesale => "wholesale",
        }
    }
}

impl std::fmt::Display for PriceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A skincare product in the catalog
///
/// `wholesale_price <= retail_price` is expected but not enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Product {
    #[schema(example = "prod_1")]
    pub id: String,
    #[schema(example = "Brightening Vitamin C Serum")]
    pub name: String,
    pub description: String,
    #[schema(example = "Serums")]
    pub category: String,
    #[schema(example = "15000")]
    pub retail_price: Decimal,
    #[schema(example = "10000")]
    pub wholesale_price: Decimal,
    #[schema(example = 6, minimum = 1)]
    pub minimum_wholesale_quantity: i32,
    #[schema(example = 50, minimum = 0)]
    pub stock_quantity: i32,
    pub in_stock: bool,
    pub featured: bool,
    pub image: String,
    pub images: Vec<String>,
    pub benefits: Vec<String>,
    pub ingredients: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data needed to create a new product
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateProduct {
    #[validate(custom = "validate_not_blank")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(custom = "validate_not_blank")]
    pub category: String,
    #[validate(custom = "validate_non_negative_amount")]
    pub retail_price: Decimal,
    #[validate(custom = "validate_non_negative_amount")]
    pub wholesale_price: Decimal,
    #[validate(range(min = 1, message = "Minimum wholesale quantity must be at least 1"))]
    pub minimum_wholesale_quantity: i32,
    #[validate(range(min = 0, message = "Stock quantity cannot be negative"))]
    pub stock_quantity: i32,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub benefits: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
}

fn default_in_stock() -> bool {
    true
}

impl CreateProduct {
    /// Build a new product with a fresh id and timestamps
    pub fn into_product(self, now: DateTime<Utc>) -> Product {
        Product {
            id: generate_product_id(),
            name: self.name.trim().to_string(),
            description: self.description,
            category: self.category.trim().to_string(),
            retail_price: self.retail_price,
            wholesale_price: self.wholesale_price,
            minimum_wholesale_quantity: self.minimum_wholesale_quantity,
            stock_quantity: self.stock_quantity,
            in_stock: self.in_stock,
            featured: self.featured,
            image: self.image,
            images: self.images,
            benefits: self.benefits,
            ingredients: self.ingredients,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial product update; omitted fields keep their current value
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProduct {
    #[validate(custom = "validate_not_blank")]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(custom = "validate_not_blank")]
    pub category: Option<String>,
    #[validate(custom = "validate_non_negative_amount")]
    pub retail_price: Option<Decimal>,
    #[validate(custom = "validate_non_negative_amount")]
    pub wholesale_price: Option<Decimal>,
    #[validate(range(min = 1, message = "Minimum wholesale quantity must be at least 1"))]
    pub minimum_wholesale_quantity: Option<i32>,
    #[validate(range(min = 0, message = "Stock quantity cannot be negative"))]
    pub stock_quantity: Option<i32>,
    pub in_stock: Option<bool>,
    pub featured: Option<bool>,
    pub image: Option<String>,
    pub images: Option<Vec<String>>,
    pub benefits: Option<Vec<String>>,
    pub ingredients: Option<Vec<String>>,
}

impl UpdateProduct {
    /// Apply the provided fields onto an existing product and bump `updated_at`
    pub fn apply(self, mut product: Product, now: DateTime<Utc>) -> Product {
        if let Some(name) = self.name {
            product.name = name.trim().to_string();
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(category) = self.category {
            product.category = category.trim().to_string();
        }
        if let Some(price) = self.retail_price {
            product.retail_price = price;
        }
        if let Some(price) = self.wholesale_price {
            product.wholesale_price = price;
        }
        if let Some(minimum) = self.minimum_wholesale_quantity {
            product.minimum_wholesale_quantity = minimum;
        }
        if let Some(stock) = self.stock_quantity {
            product.stock_quantity = stock;
        }
        if let Some(in_stock) = self.in_stock {
            product.in_stock = in_stock;
        }
        if let Some(featured) = self.featured {
            product.featured = featured;
        }
        if let Some(image) = self.image {
            product.image = image;
        }
        if let Some(images) = self.images {
            product.images = images;
        }
        if let Some(benefits) = self.benefits {
            product.benefits = benefits;
        }
        if let Some(ingredients) = self.ingredients {
            product.ingredients = ingredients;
        }
        product.updated_at = now;
        product
    }
}

/// Catalog listing filters
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ProductQuery {
    /// Case-insensitive match on name, description or category
    pub search: Option<String>,
    /// Exact category match
    pub category: Option<String>,
    pub featured: Option<bool>,
}

impl ProductQuery {
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(ref search) = self.search {
            let needle = search.trim().to_lowercase();
            if !needle.is_empty()
                && !product.name.to_lowercase().contains(&needle)
                && !product.description.to_lowercase().contains(&needle)
                && !product.category.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        if let Some(ref category) = self.category {
            if !product.category.eq_ignore_ascii_case(category.trim()) {
                return false;
            }
        }
        if let Some(featured) = self.featured {
            if product.featured != featured {
                return false;
            }
        }
        true
    }
}

/// `prod_<uuid>` identifier for new products
pub fn generate_product_id() -> String {
    format!("prod_{}", Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn serum() -> Product {
        let now = Utc::now();
        Product {
            id: "prod_1".to_string(),
            name: "Brightening Vitamin C Serum".to_string(),
            description: "Reduces dark spots".to_string(),
            category: "Serums".to_string(),
            retail_price: dec!(15000),
            wholesale_price: dec!(10000),
            minimum_wholesale_quantity: 6,
            stock_quantity: 50,
            in_stock: true,
            featured: true,
            image: String::new(),
            images: vec![],
            benefits: vec!["Brightens skin".to_string()],
            ingredients: vec!["Vitamin C".to_string()],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_price_tier_serialization() {
        assert_eq!(serde_json::to_string(&PriceTier::Wholesale).unwrap(), "\"wholesale\"");
        let tier: PriceTier = serde_json::from_str("\"retail\"").unwrap();
        assert_eq!(tier, PriceTier::Retail);
    }

    #[test]
    fn test_create_product_validation() {
        let json = r#"{
            "name": "  ",
            "category": "Serums",
            "retail_price": "15000",
            "wholesale_price": "10000",
            "minimum_wholesale_quantity": 0,
            "stock_quantity": 5
        }"#;
        let request: CreateProduct = serde_json::from_str(json).unwrap();
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("minimum_wholesale_quantity"));
        assert!(!fields.contains_key("category"));
    }

    #[test]
    fn test_create_product_defaults() {
        let json = r#"{
            "name": "Gentle Cleansing Foam",
            "category": "Cleansers",
            "retail_price": 8000,
            "wholesale_price": 5500,
            "minimum_wholesale_quantity": 8,
            "stock_quantity": 45
        }"#;
        let request: CreateProduct = serde_json::from_str(json).unwrap();
        assert!(request.validate().is_ok());
        let product = request.into_product(Utc::now());
        assert!(product.id.starts_with("prod_"));
        assert!(product.in_stock);
        assert!(!product.featured);
        assert_eq!(product.retail_price, dec!(8000));
    }

    #[test]
    fn test_update_product_partial_apply() {
        let original = serum();
        let update = UpdateProduct {
            retail_price: Some(dec!(16000)),
            in_stock: Some(false),
            ..Default::default()
        };
        let later = original.created_at + chrono::Duration::minutes(5);
        let updated = update.apply(original.clone(), later);

        assert_eq!(updated.retail_price, dec!(16000));
        assert!(!updated.in_stock);
        assert_eq!(updated.wholesale_price, original.wholesale_price);
        assert_eq!(updated.name, original.name);
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(updated.updated_at, later);
    }

    #[test]
    fn test_product_query_filters() {
        let product = serum();
        assert!(ProductQuery::default().matches(&product));
        assert!(ProductQuery { search: Some("vitamin".into()), ..Default::default() }.matches(&product));
        assert!(ProductQuery { search: Some("dark spots".into()), ..Default::default() }.matches(&product));
        assert!(!ProductQuery { search: Some("cleanser".into()), ..Default::default() }.matches(&product));
        assert!(ProductQuery { category: Some("serums".into()), ..Default::default() }.matches(&product));
        assert!(!ProductQuery { featured: Some(false), ..Default::default() }.matches(&product));
    }
}
