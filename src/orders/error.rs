use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::cart::CartError;
use crate::db::PersistenceError;
use crate::invoice::RenderError;

/// Error types for order operations
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error(transparent)]
    Cart(#[from] CartError),

    #[error("Order {0} not found")]
    NotFound(String),

    #[error("Product {0} not found")]
    ProductNotFound(String),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        from: crate::orders::OrderStatus,
        to: crate::orders::OrderStatus,
    },

    #[error("Order {0} was modified concurrently, reload and retry")]
    Conflict(String),

    #[error("Persistence error: {0}")]
    Persistence(PersistenceError),

    #[error("Invoice rendering failed: {0}")]
    Render(#[from] RenderError),
}

impl From<PersistenceError> for OrderError {
    fn from(err: PersistenceError) -> Self {
        match err {
            PersistenceError::VersionConflict { id, .. } => OrderError::Conflict(id),
            other => OrderError::Persistence(other),
        }
    }
}

impl From<validator::ValidationErrors> for OrderError {
    fn from(errors: validator::ValidationErrors) -> Self {
        OrderError::ValidationError(errors.to_string())
    }
}

impl OrderError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            OrderError::ValidationError(_)
            | OrderError::Cart(_)
            | OrderError::ProductNotFound(_)
            | OrderError::InvalidTransition { .. } => StatusCode::BAD_REQUEST,
            OrderError::NotFound(_) => StatusCode::NOT_FOUND,
            OrderError::Conflict(_) => StatusCode::CONFLICT,
            OrderError::Persistence(_) | OrderError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message = match &self {
            OrderError::Persistence(err) => {
                tracing::error!("Order persistence failure: {}", err);
                "Order processing failed".to_string()
            }
            OrderError::Render(err) => {
                tracing::error!("Invoice rendering failure: {}", err);
                "Invoice could not be generated".to_string()
            }
            other => {
                tracing::debug!("Order request rejected: {}", other);
                other.to_string()
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
