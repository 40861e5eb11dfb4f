use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::cart::CartLineView;
use crate::catalog::PriceTier;
use crate::validation::validate_not_blank;

/// Order status enum representing the lifecycle of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Convert status to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Position along the fulfilment path; `None` for cancelled
    pub fn rank(&self) -> Option<u8> {
        match self {
            OrderStatus::Pending => Some(0),
            OrderStatus::Confirmed => Some(1),
            OrderStatus::Processing => Some(2),
            OrderStatus::Shipped => Some(3),
            OrderStatus::Delivered => Some(4),
            OrderStatus::Cancelled => None,
        }
    }

    /// Delivered and cancelled orders accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Payment status enum representing the payment state of an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    /// Convert payment status to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
        }
    }
}

impl Default for PaymentStatus {
    fn default() -> Self {
        PaymentStatus::Pending
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Buyer details captured at checkout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct Customer {
    #[validate(custom = "validate_not_blank")]
    #[schema(example = "Amaka Obi")]
    pub name: String,
    #[validate(email(message = "Customer email must be a valid address"))]
    #[schema(example = "amaka@example.com")]
    pub email: String,
    #[validate(custom = "validate_not_blank")]
    #[schema(example = "+234 803 000 0000")]
    pub phone: String,
    #[validate(custom = "validate_not_blank")]
    pub address: String,
    #[validate(custom = "validate_not_blank")]
    pub city: String,
    #[validate(custom = "validate_not_blank")]
    pub state: String,
}

impl Customer {
    /// Names of fields that are empty or whitespace only
    pub fn blank_fields(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("address", &self.address),
            ("city", &self.city),
            ("state", &self.state),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }
}

/// Snapshot of one purchased line; prices never follow later catalog edits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderLine {
    pub product_id: String,
    pub product_name: String,
    pub category: String,
    pub tier: PriceTier,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// A placed order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Order {
    #[schema(example = "GB1760882700000X7K")]
    pub id: String,
    pub customer: Customer,
    pub items: Vec<OrderLine>,
    pub sub_total: Decimal,
    pub tax: Decimal,
    pub shipping_fee: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<Decimal>,
    pub total: Decimal,
    /// Currency code in force when the order was placed
    #[schema(example = "NGN")]
    pub currency: String,
    pub status: OrderStatus,
    pub payment_method: String,
    pub payment_status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Optimistic concurrency counter, bumped on every update
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One requested line at checkout
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckoutLine {
    #[schema(example = "prod_1")]
    pub product_id: String,
    pub tier: PriceTier,
    #[schema(example = 1)]
    pub quantity: i32,
}

/// Request DTO for placing an order
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CheckoutRequest {
    #[validate]
    pub customer: Customer,
    #[validate(custom = "validate_not_blank")]
    #[schema(example = "Bank Transfer")]
    pub payment_method: String,
    pub lines: Vec<CheckoutLine>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Request DTO for pricing a cart without placing an order
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct QuoteRequest {
    pub lines: Vec<CheckoutLine>,
}

/// Priced cart under the current settings
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CartQuote {
    pub lines: Vec<CartLineView>,
    pub sub_total: Decimal,
    pub tax: Decimal,
    pub shipping_fee: Decimal,
    pub total: Decimal,
    pub currency: String,
    /// Whether the subtotal clears the store's minimum order amount
    pub meets_minimum: bool,
}

/// Response DTO for a newly placed order
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlacedOrderResponse {
    pub order: Order,
    /// Pre-filled WhatsApp chat announcing the order to the store
    pub whatsapp_link: String,
}

/// Response DTO carrying a WhatsApp deep link
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WhatsAppLinkResponse {
    pub order_id: String,
    pub whatsapp_link: String,
}

/// Response DTO for an invoice e-mail request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InvoiceEmailResponse {
    pub order_id: String,
    /// False when the notification queue was full and the request was dropped
    pub queued: bool,
}

/// Request DTO for updating order status
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
    /// Version the caller last read; stale versions are rejected
    #[serde(default)]
    pub expected_version: Option<i32>,
}

/// Request DTO for updating payment status
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePaymentRequest {
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub expected_version: Option<i32>,
}

/// Query parameters for order listing
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct OrderQuery {
    /// Optional status filter
    pub status: Option<OrderStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::customer;

    #[test]
    fn test_status_ranks_follow_fulfilment_path() {
        assert!(OrderStatus::Pending.rank() < OrderStatus::Confirmed.rank());
        assert!(OrderStatus::Shipped.rank() < OrderStatus::Delivered.rank());
        assert_eq!(OrderStatus::Cancelled.rank(), None);
        assert!(OrderStatus::Delivered.is_terminal());
        assert!(!OrderStatus::Shipped.is_terminal());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        let json = serde_json::to_string(&OrderStatus::Processing).unwrap();
        assert_eq!(json, "\"processing\"");
        let parsed: PaymentStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(parsed, PaymentStatus::Completed);
    }

    #[test]
    fn test_customer_blank_fields() {
        let mut c = customer();
        assert!(c.blank_fields().is_empty());
        assert!(c.validate().is_ok());

        c.city = "  ".to_string();
        c.phone = String::new();
        assert_eq!(c.blank_fields(), vec!["phone", "city"]);
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_checkout_request_validates_nested_customer() {
        let request = CheckoutRequest {
            customer: Customer {
                email: "not-an-email".to_string(),
                ..customer()
            },
            payment_method: " ".to_string(),
            lines: vec![],
            notes: None,
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.errors().contains_key("customer"));
        assert!(errors.field_errors().contains_key("payment_method"));
    }
}
