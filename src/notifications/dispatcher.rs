//! Outbox-style notification queue.
//!
//! Request handlers only enqueue events; a background worker renders the
//! invoice and mails it, so a slow or failing SMTP relay never delays or
//! rolls back an order.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::invoice::InvoiceRenderer;
use crate::notifications::{send_with_retry, InvoiceEmail, InvoiceMailer, NotificationError};
use crate::orders::Order;
use crate::settings::SettingsRepository;

/// Work item for the notification worker
#[derive(Debug, Clone)]
pub enum NotificationEvent {
    /// A new order was committed
    OrderPlaced(Box<Order>),
    /// An admin asked for the invoice to be sent again
    InvoiceRequested(Box<Order>),
}

impl NotificationEvent {
    pub fn order(&self) -> &Order {
        match self {
            NotificationEvent::OrderPlaced(order) | NotificationEvent::InvoiceRequested(order) => order,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            NotificationEvent::OrderPlaced(_) => "order_placed",
            NotificationEvent::InvoiceRequested(_) => "invoice_requested",
        }
    }
}

/// Cloneable handle for enqueueing notification events
#[derive(Clone)]
pub struct NotificationDispatcher {
    sender: mpsc::Sender<NotificationEvent>,
}

impl NotificationDispatcher {
    /// Bounded queue of `capacity` events and its receiving end
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<NotificationEvent>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender }, receiver)
    }

    /// Enqueue without waiting; returns `false` if the event was dropped
    pub fn dispatch(&self, event: NotificationEvent) -> bool {
        let order_id = event.order().id.clone();
        match self.sender.try_send(event) {
            Ok(()) => {
                tracing::debug!("Queued notification for order {}", order_id);
                true
            }
            Err(TrySendError::Full(event)) => {
                tracing::warn!(
                    "Notification queue full, dropping {} event for order {}",
                    event.kind(),
                    order_id
                );
                false
            }
            Err(TrySendError::Closed(event)) => {
                tracing::warn!(
                    "Notification worker stopped, dropping {} event for order {}",
                    event.kind(),
                    order_id
                );
                false
            }
        }
    }
}

/// What happened to one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Sent,
    /// Customer left no e-mail address
    SkippedNoRecipient,
    /// No SMTP relay configured
    SkippedNoMailer,
}

/// Background consumer of the notification queue
pub struct NotificationWorker {
    receiver: mpsc::Receiver<NotificationEvent>,
    settings: Arc<dyn SettingsRepository>,
    mailer: Option<Arc<dyn InvoiceMailer>>,
    timeout: Duration,
}

impl NotificationWorker {
    pub fn new(
        receiver: mpsc::Receiver<NotificationEvent>,
        settings: Arc<dyn SettingsRepository>,
        mailer: Option<Arc<dyn InvoiceMailer>>,
        timeout: Duration,
    ) -> Self {
        Self {
            receiver,
            settings,
            mailer,
            timeout,
        }
    }

    /// Process events until every dispatcher handle is dropped
    pub async fn run(mut self) {
        tracing::info!("Notification worker started");
        while let Some(event) = self.receiver.recv().await {
            let order_id = event.order().id.clone();
            match self.handle(&event).await {
                Ok(DeliveryOutcome::Sent) => {
                    tracing::info!("Invoice for order {} delivered ({})", order_id, event.kind());
                }
                Ok(outcome) => {
                    tracing::debug!("Invoice for order {} not sent: {:?}", order_id, outcome);
                }
                Err(error) => {
                    tracing::error!("Failed to deliver invoice for order {}: {}", order_id, error);
                }
            }
        }
        tracing::info!("Notification worker stopped");
    }

    /// Render and send the invoice for one event
    pub async fn handle(&self, event: &NotificationEvent) -> Result<DeliveryOutcome, NotificationError> {
        let order = event.order();
        if order.customer.email.trim().is_empty() {
            return Ok(DeliveryOutcome::SkippedNoRecipient);
        }
        let Some(mailer) = &self.mailer else {
            return Ok(DeliveryOutcome::SkippedNoMailer);
        };

        let settings = self.settings.load().await?;
        let pdf = InvoiceRenderer::render_pdf(order, &settings)?;
        let Some(email) = InvoiceEmail::compose(order, &settings, pdf) else {
            return Ok(DeliveryOutcome::SkippedNoRecipient);
        };

        send_with_retry(mailer.as_ref(), &email, self.timeout).await?;
        Ok(DeliveryOutcome::Sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::InMemorySettingsRepository;
    use crate::test_support::sample_order;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<InvoiceEmail>>,
    }

    #[async_trait]
    impl InvoiceMailer for RecordingMailer {
        async fn send(&self, email: &InvoiceEmail) -> Result<(), NotificationError> {
            self.sent.lock().await.push(email.clone());
            Ok(())
        }
    }

    struct FailingMailer;

    #[async_trait]
    impl InvoiceMailer for FailingMailer {
        async fn send(&self, _email: &InvoiceEmail) -> Result<(), NotificationError> {
            Err(NotificationError::Delivery("relay refused".to_string()))
        }
    }

    fn worker(mailer: Option<Arc<dyn InvoiceMailer>>) -> (NotificationDispatcher, NotificationWorker) {
        let (dispatcher, receiver) = NotificationDispatcher::channel(4);
        let worker = NotificationWorker::new(
            receiver,
            Arc::new(InMemorySettingsRepository::new()),
            mailer,
            Duration::from_secs(1),
        );
        (dispatcher, worker)
    }

    #[tokio::test]
    async fn test_worker_sends_rendered_invoice() {
        let mailer = Arc::new(RecordingMailer::default());
        let (_dispatcher, worker) = worker(Some(mailer.clone()));

        let outcome = worker
            .handle(&NotificationEvent::OrderPlaced(Box::new(sample_order())))
            .await
            .unwrap();

        assert_eq!(outcome, DeliveryOutcome::Sent);
        let sent = mailer.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "amaka@example.com");
        assert!(sent[0].pdf.starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn test_blank_email_and_missing_mailer_are_skipped() {
        let mailer = Arc::new(RecordingMailer::default());
        let (_d, with_mailer) = worker(Some(mailer.clone()));
        let mut order = sample_order();
        order.customer.email = String::new();
        let outcome = with_mailer
            .handle(&NotificationEvent::OrderPlaced(Box::new(order)))
            .await
            .unwrap();
        assert_eq!(outcome, DeliveryOutcome::SkippedNoRecipient);
        assert!(mailer.sent.lock().await.is_empty());

        let (_d, without_mailer) = worker(None);
        let outcome = without_mailer
            .handle(&NotificationEvent::InvoiceRequested(Box::new(sample_order())))
            .await
            .unwrap();
        assert_eq!(outcome, DeliveryOutcome::SkippedNoMailer);
    }

    #[tokio::test]
    async fn test_delivery_failure_is_reported_not_panicking() {
        let (_d, worker) = worker(Some(Arc::new(FailingMailer)));
        let result = worker
            .handle(&NotificationEvent::OrderPlaced(Box::new(sample_order())))
            .await;
        assert!(matches!(result, Err(NotificationError::Delivery(_))));
    }

    #[tokio::test]
    async fn test_full_queue_drops_event() {
        let (dispatcher, _receiver) = NotificationDispatcher::channel(1);
        assert!(dispatcher.dispatch(NotificationEvent::OrderPlaced(Box::new(sample_order()))));
        assert!(!dispatcher.dispatch(NotificationEvent::OrderPlaced(Box::new(sample_order()))));
    }

    #[tokio::test]
    async fn test_closed_queue_drops_event() {
        let (dispatcher, receiver) = NotificationDispatcher::channel(1);
        drop(receiver);
        assert!(!dispatcher.dispatch(NotificationEvent::OrderPlaced(Box::new(sample_order()))));
    }

    #[tokio::test]
    async fn test_run_drains_queue_until_dispatchers_drop() {
        let mailer = Arc::new(RecordingMailer::default());
        let (dispatcher, worker) = worker(Some(mailer.clone()));

        assert!(dispatcher.dispatch(NotificationEvent::OrderPlaced(Box::new(sample_order()))));
        assert!(dispatcher.dispatch(NotificationEvent::InvoiceRequested(Box::new(sample_order()))));
        drop(dispatcher);

        worker.run().await;
        assert_eq!(mailer.sent.lock().await.len(), 2);
    }
}
