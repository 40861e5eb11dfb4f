use std::time::Duration;
use thiserror::Error;

use crate::db::PersistenceError;
use crate::invoice::RenderError;

/// Errors that can occur while delivering order notifications
///
/// These are logged by the worker and never reach the customer.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    /// Failed to build the message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    #[error("Invalid attachment content type: {0}")]
    ContentType(String),

    #[error("Mail delivery timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invoice rendering failed: {0}")]
    Render(#[from] RenderError),

    #[error("Could not load store settings: {0}")]
    Settings(#[from] PersistenceError),

    /// Test and in-process mailers
    #[error("Delivery failed: {0}")]
    Delivery(String),
}
