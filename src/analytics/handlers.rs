// HTTP handler for the admin dashboard

use axum::{extract::State, Json};
use chrono::Utc;

use crate::analytics::{compute_analytics, DashboardAnalytics};
use crate::error::ApiError;
use crate::AppState;

/// Handler for GET /api/admin/analytics
#[utoipa::path(
    get,
    path = "/api/admin/analytics",
    responses(
        (status = 200, description = "Dashboard analytics", body = DashboardAnalytics),
        (status = 500, description = "Internal server error")
    ),
    tag = "admin"
)]
pub async fn get_analytics(State(state): State<AppState>) -> Result<Json<DashboardAnalytics>, ApiError> {
    let orders = state.orders.list(None).await?;
    let product_count = state.products.list().await?.len();

    let analytics = compute_analytics(&orders, product_count, Utc::now());
    tracing::debug!(
        "Analytics computed over {} orders, revenue {}",
        analytics.total_orders,
        analytics.total_revenue
    );
    Ok(Json(analytics))
}
