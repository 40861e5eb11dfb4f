use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::orders::{Order, OrderStatus};

/// Dashboard figures for the admin overview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DashboardAnalytics {
    pub total_orders: usize,
    /// Sum of order totals, cancelled orders excluded
    pub total_revenue: Decimal,
    /// Distinct customers by e-mail, case-insensitive
    pub total_customers: usize,
    pub total_products: usize,
    pub recent_orders: Vec<RecentOrder>,
    pub top_products: Vec<ProductSales>,
    /// Oldest month first
    pub monthly_revenue: Vec<MonthlyRevenue>,
}

/// Compact order row for the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RecentOrder {
    pub id: String,
    pub customer_name: String,
    pub total: Decimal,
    pub currency: String,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl From<&Order> for RecentOrder {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.clone(),
            customer_name: order.customer.name.clone(),
            total: order.total,
            currency: order.currency.clone(),
            status: order.status,
            created_at: order.created_at,
        }
    }
}

/// Sales of one product across all orders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductSales {
    pub product_id: String,
    pub product_name: String,
    pub units_sold: i64,
    pub order_count: usize,
    pub revenue: Decimal,
}

/// Revenue for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MonthlyRevenue {
    /// `YYYY-MM`
    #[schema(example = "2026-10")]
    pub month: String,
    #[schema(example = "Oct 2026")]
    pub label: String,
    pub order_count: usize,
    pub revenue: Decimal,
}
