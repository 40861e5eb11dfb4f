pub mod analytics;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod invoice;
pub mod notifications;
pub mod orders;
pub mod settings;
pub mod validation;

#[cfg(test)]
pub mod test_support;

use axum::{
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::analytics::{DashboardAnalytics, MonthlyRevenue, ProductSales, RecentOrder};
use crate::cart::CartLineView;
use crate::catalog::{CreateProduct, PriceTier, Product, ProductRepository, UpdateProduct};
use crate::orders::{
    CartQuote, CheckoutLine, CheckoutRequest, Customer, InvoiceEmailResponse, Order, OrderLine, OrderRepository,
    OrderService, OrderStatus, PaymentStatus, PlacedOrderResponse, QuoteRequest, UpdatePaymentRequest,
    UpdateStatusRequest, WhatsAppLinkResponse,
};
use crate::settings::{AdminSettings, SettingsRepository, StoreHours};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        catalog::handlers::list_products,
        catalog::handlers::get_product,
        catalog::handlers::create_product,
        catalog::handlers::update_product,
        catalog::handlers::delete_product,
        orders::handlers::quote_cart,
        orders::handlers::place_order,
        orders::handlers::list_orders,
        orders::handlers::get_order,
        orders::handlers::update_order_status,
        orders::handlers::update_payment_status,
        orders::handlers::get_whatsapp_link,
        orders::handlers::get_invoice_html,
        orders::handlers::get_invoice_pdf,
        orders::handlers::send_invoice_email,
        settings::handlers::get_settings,
        settings::handlers::update_settings,
        analytics::handlers::get_analytics,
    ),
    components(
        schemas(
            Product, CreateProduct, UpdateProduct, PriceTier,
            CheckoutLine, CheckoutRequest, QuoteRequest, CartQuote, CartLineView,
            Customer, Order, OrderLine, OrderStatus, PaymentStatus,
            PlacedOrderResponse, WhatsAppLinkResponse, InvoiceEmailResponse,
            UpdateStatusRequest, UpdatePaymentRequest,
            AdminSettings, StoreHours,
            DashboardAnalytics, RecentOrder, ProductSales, MonthlyRevenue
        )
    ),
    tags(
        (name = "products", description = "Product catalog management"),
        (name = "orders", description = "Checkout and order management"),
        (name = "invoices", description = "Invoice rendering and delivery"),
        (name = "settings", description = "Store settings"),
        (name = "admin", description = "Admin dashboard")
    ),
    info(
        title = "GreatBliss Store API",
        version = "1.0.0",
        description = "Storefront API for skincare orders, invoices and store administration"
    )
)]
pub struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub products: Arc<dyn ProductRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub settings: Arc<dyn SettingsRepository>,
    pub order_service: OrderService,
}

/// Create the application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Catalog
        .route(
            "/api/products",
            get(catalog::list_products).post(catalog::create_product),
        )
        .route(
            "/api/products/:id",
            get(catalog::get_product)
                .put(catalog::update_product)
                .delete(catalog::delete_product),
        )
        // Cart and checkout
        .route("/api/cart/quote", post(orders::quote_cart))
        .route("/api/orders", get(orders::list_orders).post(orders::place_order))
        .route("/api/orders/:id", get(orders::get_order))
        .route("/api/orders/:id/status", patch(orders::update_order_status))
        .route("/api/orders/:id/payment", patch(orders::update_payment_status))
        .route("/api/orders/:id/whatsapp", get(orders::get_whatsapp_link))
        // Invoices
        .route("/api/orders/:id/invoice", get(orders::get_invoice_html))
        .route("/api/orders/:id/invoice.pdf", get(orders::get_invoice_pdf))
        .route("/api/orders/:id/invoice/email", post(orders::send_invoice_email))
        // Administration
        .route(
            "/api/settings",
            get(settings::get_settings).put(settings::update_settings),
        )
        .route("/api/admin/analytics", get(analytics::get_analytics))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
