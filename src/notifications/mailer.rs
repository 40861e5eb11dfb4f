//! Invoice e-mail composition and SMTP delivery via lettre.

use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::time::Duration;

use crate::config::SmtpConfig;
use crate::notifications::{format_order_summary, NotificationError};
use crate::orders::Order;
use crate::settings::AdminSettings;

/// A ready-to-send invoice message
#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceEmail {
    pub to: String,
    /// Preferred sender, usually the store's e-mail address
    pub reply_to: Option<String>,
    pub subject: String,
    pub body: String,
    pub attachment_name: String,
    pub pdf: Vec<u8>,
}

impl InvoiceEmail {
    /// Build the invoice message for `order`
    ///
    /// Returns `None` when the customer left no e-mail address.
    pub fn compose(order: &Order, settings: &AdminSettings, pdf: Vec<u8>) -> Option<Self> {
        let to = order.customer.email.trim();
        if to.is_empty() {
            return None;
        }

        let business_name = if settings.business_name.trim().is_empty() {
            "Store"
        } else {
            settings.business_name.trim()
        };

        let body = format!(
            "Dear {},\n\nThank you for your order. Attached is your invoice.\n\n{}",
            order.customer.name,
            format_order_summary(order)
        );

        Some(Self {
            to: to.to_string(),
            reply_to: Some(settings.business_email.trim().to_string()).filter(|e| !e.is_empty()),
            subject: format!("Invoice {} - {}", order.id, business_name),
            body,
            attachment_name: format!("invoice-{}.pdf", order.id),
            pdf,
        })
    }
}

/// Delivery seam for invoice e-mails
#[async_trait]
pub trait InvoiceMailer: Send + Sync {
    async fn send(&self, email: &InvoiceEmail) -> Result<(), NotificationError>;
}

/// SMTP mailer for invoice e-mails
#[derive(Clone)]
pub struct SmtpMailer {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl SmtpMailer {
    /// Create a new SMTP mailer from configuration.
    ///
    /// The sender is `SMTP_FROM` when set, otherwise the SMTP username.
    pub fn new(config: &SmtpConfig) -> Result<Self, NotificationError> {
        let credentials = Credentials::new(config.username.clone(), config.password.clone());

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?
            .port(config.port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config
                .from_address
                .clone()
                .unwrap_or_else(|| config.username.clone()),
        })
    }

    fn build_message(&self, email: &InvoiceEmail) -> Result<Message, NotificationError> {
        let from: Mailbox = self
            .from_address
            .parse()
            .map_err(|_| NotificationError::InvalidAddress(self.from_address.clone()))?;
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|_| NotificationError::InvalidAddress(email.to.clone()))?;

        let mut builder = Message::builder().from(from).to(to).subject(email.subject.clone());
        if let Some(reply_to) = &email.reply_to {
            // a malformed store address only loses the Reply-To header
            if let Ok(mailbox) = reply_to.parse::<Mailbox>() {
                builder = builder.reply_to(mailbox);
            }
        }

        let pdf_type = ContentType::parse("application/pdf")
            .map_err(|e| NotificationError::ContentType(e.to_string()))?;

        let message = builder.multipart(
            MultiPart::mixed()
                .singlepart(
                    SinglePart::builder()
                        .header(ContentType::TEXT_PLAIN)
                        .body(email.body.clone()),
                )
                .singlepart(Attachment::new(email.attachment_name.clone()).body(email.pdf.clone(), pdf_type)),
        )?;

        Ok(message)
    }
}

#[async_trait]
impl InvoiceMailer for SmtpMailer {
    async fn send(&self, email: &InvoiceEmail) -> Result<(), NotificationError> {
        let message = self.build_message(email)?;
        self.mailer.send(message).await?;

        tracing::info!(to = %email.to, subject = %email.subject, "Invoice email sent");
        Ok(())
    }
}

/// Send with a per-attempt timeout, retrying exactly once on failure
pub async fn send_with_retry(
    mailer: &dyn InvoiceMailer,
    email: &InvoiceEmail,
    timeout: Duration,
) -> Result<(), NotificationError> {
    let mut last_error = None;

    for attempt in 1..=2 {
        let result = match tokio::time::timeout(timeout, mailer.send(email)).await {
            Ok(result) => result,
            Err(_) => Err(NotificationError::Timeout(timeout)),
        };

        match result {
            Ok(()) => return Ok(()),
            Err(error) => {
                tracing::warn!(to = %email.to, attempt, "Invoice email attempt failed: {}", error);
                last_error = Some(error);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| NotificationError::Delivery("no delivery attempt made".to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_order;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakyMailer {
        failures: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl InvoiceMailer for FlakyMailer {
        async fn send(&self, _email: &InvoiceEmail) -> Result<(), NotificationError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                Err(NotificationError::Delivery("connection reset".to_string()))
            } else {
                Ok(())
            }
        }
    }

    struct SlowMailer;

    #[async_trait]
    impl InvoiceMailer for SlowMailer {
        async fn send(&self, _email: &InvoiceEmail) -> Result<(), NotificationError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(())
        }
    }

    fn email() -> InvoiceEmail {
        InvoiceEmail::compose(&sample_order(), &AdminSettings::default(), b"%PDF-1.4".to_vec()).unwrap()
    }

    #[test]
    fn test_compose_invoice_email() {
        let email = email();
        assert_eq!(email.to, "amaka@example.com");
        assert_eq!(email.subject, "Invoice GB1760882700000X7K - GreatBliss SkincareNG");
        assert_eq!(email.attachment_name, "invoice-GB1760882700000X7K.pdf");
        assert!(email.body.starts_with("Dear Amaka Obi,"));
        assert!(email.body.contains("*Order ID:* GB1760882700000X7K"));
        assert_eq!(email.reply_to.as_deref(), Some("blisssiraoya@yahoo.com"));
    }

    #[test]
    fn test_compose_falls_back_to_store_name() {
        let settings = AdminSettings {
            business_name: " ".to_string(),
            ..AdminSettings::default()
        };
        let email = InvoiceEmail::compose(&sample_order(), &settings, Vec::new()).unwrap();
        assert_eq!(email.subject, "Invoice GB1760882700000X7K - Store");
    }

    #[test]
    fn test_blank_customer_email_skips_compose() {
        let mut order = sample_order();
        order.customer.email = "  ".to_string();
        assert!(InvoiceEmail::compose(&order, &AdminSettings::default(), Vec::new()).is_none());
    }

    #[tokio::test]
    async fn test_single_retry_recovers() {
        let mailer = FlakyMailer {
            failures: 1,
            calls: AtomicU32::new(0),
        };
        send_with_retry(&mailer, &email(), Duration::from_secs(1)).await.unwrap();
        assert_eq!(mailer.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_gives_up_after_second_failure() {
        let mailer = FlakyMailer {
            failures: 5,
            calls: AtomicU32::new(0),
        };
        let result = send_with_retry(&mailer, &email(), Duration::from_secs(1)).await;
        assert!(matches!(result, Err(NotificationError::Delivery(_))));
        assert_eq!(mailer.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_timeout_counts_as_failure() {
        let result = send_with_retry(&SlowMailer, &email(), Duration::from_millis(20)).await;
        assert!(matches!(result, Err(NotificationError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_smtp_message_has_pdf_attachment() {
        let config = SmtpConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            username: "orders@example.com".to_string(),
            password: "secret".to_string(),
            from_address: None,
        };
        let mailer = SmtpMailer::new(&config).unwrap();
        let message = mailer.build_message(&email()).unwrap();
        let raw = String::from_utf8_lossy(&message.formatted()).to_string();

        assert!(raw.contains("Subject: Invoice GB1760882700000X7K - GreatBliss SkincareNG"));
        assert!(raw.contains("application/pdf"));
        assert!(raw.contains("invoice-GB1760882700000X7K.pdf"));
    }
}
