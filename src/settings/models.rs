use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::validation::{
    validate_non_negative_amount, validate_not_blank, validate_optional_email, validate_percentage,
    validate_whatsapp_number,
};

/// Opening hours shown on the storefront
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StoreHours {
    #[schema(example = "09:00")]
    pub open: String,
    #[schema(example = "18:00")]
    pub close: String,
    pub days: Vec<String>,
}

/// Store-wide configuration edited from the admin dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct AdminSettings {
    #[validate(custom = "validate_not_blank")]
    pub business_name: String,
    #[serde(default)]
    pub business_phone: String,
    #[validate(custom = "validate_optional_email")]
    #[serde(default)]
    pub business_email: String,
    #[serde(default)]
    pub business_address: String,
    /// WhatsApp number orders are announced to, digits only
    #[validate(custom = "validate_whatsapp_number")]
    pub whatsapp_number: String,
    /// ISO currency code
    #[validate(length(equal = 3, message = "Currency must be a 3-letter code"))]
    pub currency: String,
    /// Percentage applied to the subtotal
    #[validate(custom = "validate_percentage")]
    pub tax_rate: Decimal,
    /// Flat shipping fee per order
    #[validate(custom = "validate_non_negative_amount")]
    pub shipping_fee: Decimal,
    #[validate(custom = "validate_non_negative_amount")]
    pub minimum_order_amount: Decimal,
    #[serde(default)]
    pub store_hours: Option<StoreHours>,
    #[serde(default)]
    pub privacy_policy: String,
    #[serde(default)]
    pub shipping_policy: String,
    #[serde(default)]
    pub return_policy: String,
    /// Footer note printed on invoices
    #[serde(default)]
    pub invoice_notes: String,
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            business_name: "GreatBliss SkincareNG".to_string(),
            business_phone: "+234 902 550 0817".to_string(),
            business_email: "blisssiraoya@yahoo.com".to_string(),
            business_address: "Lugbe, Abuja, Nigeria".to_string(),
            whatsapp_number: "2349025500817".to_string(),
            currency: "NGN".to_string(),
            tax_rate: Decimal::ZERO,
            shipping_fee: Decimal::from(2000),
            minimum_order_amount: Decimal::from(5000),
            store_hours: None,
            privacy_policy: String::new(),
            shipping_policy: String::new(),
            return_policy: String::new(),
            invoice_notes: String::new(),
        }
    }
}
