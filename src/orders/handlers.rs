// HTTP handlers for checkout and order management

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};

use crate::invoice::InvoiceRenderer;
use crate::orders::{
    CartQuote, CheckoutRequest, InvoiceEmailResponse, Order, OrderError, OrderQuery, PlacedOrderResponse,
    QuoteRequest, UpdatePaymentRequest, UpdateStatusRequest, WhatsAppLinkResponse,
};
use crate::AppState;

/// Handler for POST /api/cart/quote
/// Prices a cart under the current settings without placing an order
#[utoipa::path(
    post,
    path = "/api/cart/quote",
    request_body = QuoteRequest,
    responses(
        (status = 200, description = "Priced cart", body = CartQuote),
        (status = 400, description = "Invalid cart lines")
    ),
    tag = "orders"
)]
pub async fn quote_cart(
    State(state): State<AppState>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<CartQuote>, OrderError> {
    let quote = state.order_service.quote(&request.lines).await?;
    Ok(Json(quote))
}

/// Handler for POST /api/orders
/// Places an order and queues the invoice e-mail
#[utoipa::path(
    post,
    path = "/api/orders",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Order placed", body = PlacedOrderResponse),
        (status = 400, description = "Invalid checkout request"),
        (status = 500, description = "Order processing failed")
    ),
    tag = "orders"
)]
pub async fn place_order(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<(StatusCode, Json<PlacedOrderResponse>), OrderError> {
    tracing::debug!("Checkout with {} line(s)", request.lines.len());

    let placed = state.order_service.place_order(request).await?;
    Ok((StatusCode::CREATED, Json(placed)))
}

/// Handler for GET /api/orders
/// Lists orders newest first, optionally filtered by status
#[utoipa::path(
    get,
    path = "/api/orders",
    params(OrderQuery),
    responses((status = 200, description = "Orders", body = Vec<Order>)),
    tag = "orders"
)]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrderQuery>,
) -> Result<Json<Vec<Order>>, OrderError> {
    let orders = state.order_service.list(query.status).await?;
    Ok(Json(orders))
}

/// Handler for GET /api/orders/:id
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(("id" = String, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Order found", body = Order),
        (status = 404, description = "Order not found")
    ),
    tag = "orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Order>, OrderError> {
    let order = state.order_service.get(&id).await?;
    Ok(Json(order))
}

/// Handler for PATCH /api/orders/:id/status
#[utoipa::path(
    patch,
    path = "/api/orders/{id}/status",
    params(("id" = String, Path, description = "Order ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = Order),
        (status = 400, description = "Invalid status transition"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order was modified concurrently")
    ),
    tag = "orders"
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Order>, OrderError> {
    let order = state
        .order_service
        .update_status(&id, request.status, request.expected_version)
        .await?;
    Ok(Json(order))
}

/// Handler for PATCH /api/orders/:id/payment
#[utoipa::path(
    patch,
    path = "/api/orders/{id}/payment",
    params(("id" = String, Path, description = "Order ID")),
    request_body = UpdatePaymentRequest,
    responses(
        (status = 200, description = "Payment status updated", body = Order),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order was modified concurrently")
    ),
    tag = "orders"
)]
pub async fn update_payment_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdatePaymentRequest>,
) -> Result<Json<Order>, OrderError> {
    let order = state
        .order_service
        .update_payment(&id, request.payment_status, request.expected_version)
        .await?;
    Ok(Json(order))
}

/// Handler for GET /api/orders/:id/whatsapp
#[utoipa::path(
    get,
    path = "/api/orders/{id}/whatsapp",
    params(("id" = String, Path, description = "Order ID")),
    responses(
        (status = 200, description = "WhatsApp deep link", body = WhatsAppLinkResponse),
        (status = 404, description = "Order not found")
    ),
    tag = "orders"
)]
pub async fn get_whatsapp_link(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<WhatsAppLinkResponse>, OrderError> {
    let whatsapp_link = state.order_service.whatsapp_link(&id).await?;
    Ok(Json(WhatsAppLinkResponse {
        order_id: id,
        whatsapp_link,
    }))
}

/// Handler for GET /api/orders/:id/invoice
/// Printable HTML invoice
#[utoipa::path(
    get,
    path = "/api/orders/{id}/invoice",
    params(("id" = String, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Invoice page", content_type = "text/html", body = String),
        (status = 404, description = "Order not found")
    ),
    tag = "invoices"
)]
pub async fn get_invoice_html(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, OrderError> {
    let order = state.order_service.get(&id).await?;
    let settings = state.settings.load().await?;

    let page = InvoiceRenderer::render_html(&order, &settings)?;
    Ok(Html(page))
}

/// Handler for GET /api/orders/:id/invoice.pdf
/// PDF download; falls back to the HTML print view when rendering fails
#[utoipa::path(
    get,
    path = "/api/orders/{id}/invoice.pdf",
    params(("id" = String, Path, description = "Order ID")),
    responses(
        (status = 200, description = "Invoice PDF", content_type = "application/pdf", body = Vec<u8>),
        (status = 303, description = "Rendering failed, redirected to the HTML invoice"),
        (status = 404, description = "Order not found")
    ),
    tag = "invoices"
)]
pub async fn get_invoice_pdf(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, OrderError> {
    let order = state.order_service.get(&id).await?;
    let settings = state.settings.load().await?;

    match InvoiceRenderer::render_pdf(&order, &settings) {
        Ok(pdf) => {
            let disposition = format!("attachment; filename=\"invoice-{}.pdf\"", order.id);
            Ok((
                [
                    (header::CONTENT_TYPE, "application/pdf".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                pdf,
            )
                .into_response())
        }
        Err(error) => {
            tracing::error!("PDF invoice for order {} failed, falling back to HTML: {}", order.id, error);
            Ok(Redirect::to(&format!("/api/orders/{}/invoice", urlencoding::encode(&order.id))).into_response())
        }
    }
}

/// Handler for POST /api/orders/:id/invoice/email
/// Queues the invoice e-mail again
#[utoipa::path(
    post,
    path = "/api/orders/{id}/invoice/email",
    params(("id" = String, Path, description = "Order ID")),
    responses(
        (status = 202, description = "Invoice e-mail queued", body = InvoiceEmailResponse),
        (status = 404, description = "Order not found")
    ),
    tag = "invoices"
)]
pub async fn send_invoice_email(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<InvoiceEmailResponse>), OrderError> {
    let queued = state.order_service.resend_invoice(&id).await?;
    if !queued {
        tracing::warn!("Invoice e-mail for order {} could not be queued", id);
    }

    Ok((StatusCode::ACCEPTED, Json(InvoiceEmailResponse { order_id: id, queued })))
}
