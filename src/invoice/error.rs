use thiserror::Error;

/// Failures while turning an order into an invoice document
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invoice for order {order_id} would need {pages} pages (limit {limit})")]
    TooManyPages {
        order_id: String,
        pages: usize,
        limit: usize,
    },

    #[error("Failed to render invoice template: {0}")]
    Template(#[from] askama::Error),
}
