use chrono::Utc;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use validator::Validate;

use crate::cart::{Cart, CartError};
use crate::catalog::{Product, ProductRepository};
use crate::db::{with_single_retry, PersistenceError};
use crate::notifications::{build_notification_link, NotificationDispatcher, NotificationEvent};
use crate::orders::{
    CartQuote, CheckoutLine, CheckoutRequest, Order, OrderAssembler, OrderError, OrderRepository,
    OrderStatus, PaymentStatus, PlacedOrderResponse, PriceCalculator, StatusMachine,
};
use crate::settings::SettingsRepository;

/// Service for order business logic
#[derive(Clone)]
pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
    products: Arc<dyn ProductRepository>,
    settings: Arc<dyn SettingsRepository>,
    notifications: NotificationDispatcher,
}

impl OrderService {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        products: Arc<dyn ProductRepository>,
        settings: Arc<dyn SettingsRepository>,
        notifications: NotificationDispatcher,
    ) -> Self {
        Self {
            orders,
            products,
            settings,
            notifications,
        }
    }

    /// Place an order
    ///
    /// # Validation
    /// - Customer fields and payment method must be present
    /// - Every line must reference an existing, in-stock product
    /// - Wholesale lines must meet the product's minimum quantity
    /// - Prices are resolved from the catalog and snapshotted into the order
    ///
    /// The invoice e-mail is queued only after the order is stored; a full
    /// queue never fails the checkout.
    pub async fn place_order(&self, request: CheckoutRequest) -> Result<PlacedOrderResponse, OrderError> {
        request.validate()?;

        let settings = self.settings.load().await?;
        let cart = self.build_cart(&request.lines).await?;

        let mut order = OrderAssembler::assemble(
            &cart,
            request.customer,
            &request.payment_method,
            &settings,
            Utc::now(),
        )?;
        order.notes = request
            .notes
            .map(|notes| notes.trim().to_string())
            .filter(|notes| !notes.is_empty());

        self.insert_new(&order).await?;

        tracing::info!(
            "Order {} placed: {} line(s), total {} {}",
            order.id,
            order.items.len(),
            order.total,
            order.currency
        );

        let whatsapp_link = build_notification_link(&order, &settings.whatsapp_number);
        self.notifications
            .dispatch(NotificationEvent::OrderPlaced(Box::new(order.clone())));

        Ok(PlacedOrderResponse { order, whatsapp_link })
    }

    /// Price a cart under the current settings without storing anything
    pub async fn quote(&self, lines: &[CheckoutLine]) -> Result<CartQuote, OrderError> {
        let settings = self.settings.load().await?;
        let cart = self.build_cart(lines).await?;

        let sub_total = cart.compute_subtotal();
        let tax = PriceCalculator::calculate_tax(sub_total, settings.tax_rate);
        let total = PriceCalculator::calculate_total(sub_total, tax, settings.shipping_fee, Decimal::ZERO);

        Ok(CartQuote {
            lines: cart.views(),
            sub_total,
            tax,
            shipping_fee: settings.shipping_fee,
            total,
            currency: settings.currency.clone(),
            meets_minimum: settings.minimum_order_amount <= Decimal::ZERO
                || sub_total >= settings.minimum_order_amount,
        })
    }

    /// Get an order by id
    pub async fn get(&self, id: &str) -> Result<Order, OrderError> {
        self.orders
            .find_by_id(id)
            .await?
            .ok_or_else(|| OrderError::NotFound(id.to_string()))
    }

    /// All orders, newest first, optionally filtered by status
    pub async fn list(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, OrderError> {
        Ok(self.orders.list(status).await?)
    }

    /// Move an order to `new_status`
    ///
    /// Requesting the current status returns the order unchanged. When
    /// `expected_version` is given it must match the stored version.
    pub async fn update_status(
        &self,
        id: &str,
        new_status: OrderStatus,
        expected_version: Option<i32>,
    ) -> Result<Order, OrderError> {
        let order = self.get(id).await?;
        check_version(&order, expected_version)?;

        if order.status == new_status {
            return Ok(order);
        }

        StatusMachine::transition(order.status, new_status)?;

        let mut updated = order.clone();
        updated.status = new_status;
        self.save_update(updated, order.version).await
    }

    /// Set the payment status of an order
    pub async fn update_payment(
        &self,
        id: &str,
        payment_status: PaymentStatus,
        expected_version: Option<i32>,
    ) -> Result<Order, OrderError> {
        let order = self.get(id).await?;
        check_version(&order, expected_version)?;

        let mut updated = order.clone();
        updated.payment_status = payment_status;
        self.save_update(updated, order.version).await
    }

    /// WhatsApp deep link announcing the order to the store
    pub async fn whatsapp_link(&self, id: &str) -> Result<String, OrderError> {
        let order = self.get(id).await?;
        let settings = self.settings.load().await?;
        Ok(build_notification_link(&order, &settings.whatsapp_number))
    }

    /// Queue the invoice e-mail again; returns whether it was queued
    pub async fn resend_invoice(&self, id: &str) -> Result<bool, OrderError> {
        let order = self.get(id).await?;
        Ok(self
            .notifications
            .dispatch(NotificationEvent::InvoiceRequested(Box::new(order))))
    }

    /// Insert a freshly assembled order, retrying once on a transient error
    ///
    /// A transient error can arrive after the first attempt committed, in
    /// which case the retry reports a duplicate; the stored row is accepted
    /// when it is the same order.
    async fn insert_new(&self, order: &Order) -> Result<(), OrderError> {
        let mut attempts = 0;
        let result = with_single_retry("order insert", || {
            attempts += 1;
            self.orders.insert(order)
        })
        .await;

        match result {
            Err(PersistenceError::Duplicate { entity, id }) if attempts > 1 => {
                match self.orders.find_by_id(&order.id).await? {
                    Some(stored) if is_same_order(&stored, order) => {
                        tracing::warn!("Order {} was stored by the attempt that reported failure", order.id);
                        Ok(())
                    }
                    _ => Err(PersistenceError::Duplicate { entity, id }.into()),
                }
            }
            other => Ok(other?),
        }
    }

    async fn save_update(&self, mut order: Order, expected_version: i32) -> Result<Order, OrderError> {
        order.version = expected_version + 1;
        order.updated_at = Utc::now();
        self.orders.update(&order, expected_version).await?;

        tracing::info!(
            "Order {} updated: status={}, payment={}, version={}",
            order.id,
            order.status,
            order.payment_status,
            order.version
        );
        Ok(order)
    }

    async fn build_cart(&self, lines: &[CheckoutLine]) -> Result<Cart, OrderError> {
        if lines.is_empty() {
            return Err(OrderError::ValidationError("Cart is empty".to_string()));
        }

        let mut ids: Vec<String> = lines.iter().map(|line| line.product_id.clone()).collect();
        ids.sort();
        ids.dedup();

        let catalog: HashMap<String, Arc<Product>> = self
            .products
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|product| (product.id.clone(), Arc::new(product)))
            .collect();

        let mut cart = Cart::new();
        for line in lines {
            let product = catalog
                .get(&line.product_id)
                .ok_or_else(|| OrderError::ProductNotFound(line.product_id.clone()))?;
            if !product.in_stock {
                return Err(CartError::OutOfStock(product.id.clone()).into());
            }
            cart.add_item(Arc::clone(product), line.quantity, line.tier)?;
        }
        Ok(cart)
    }
}

/// Stored rows lose sub-microsecond precision, so timestamps are not compared
fn is_same_order(stored: &Order, order: &Order) -> bool {
    stored.id == order.id
        && stored.customer == order.customer
        && stored.items == order.items
        && stored.total == order.total
        && stored.version == order.version
}

fn check_version(order: &Order, expected_version: Option<i32>) -> Result<(), OrderError> {
    match expected_version {
        Some(version) if version != order.version => Err(OrderError::Conflict(order.id.clone())),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::seed::default_products;
    use crate::catalog::{InMemoryProductRepository, PriceTier};
    use crate::orders::InMemoryOrderRepository;
    use crate::settings::{AdminSettings, InMemorySettingsRepository};
    use crate::test_support::customer;
    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::sync::mpsc::Receiver;

    fn service_with(settings: AdminSettings) -> (OrderService, Receiver<NotificationEvent>) {
        let (dispatcher, receiver) = NotificationDispatcher::channel(8);
        let mut products = default_products(Utc::now());
        products[2].in_stock = false;
        let service = OrderService::new(
            Arc::new(InMemoryOrderRepository::new()),
            Arc::new(InMemoryProductRepository::with_products(products)),
            Arc::new(InMemorySettingsRepository::with_settings(settings)),
            dispatcher,
        );
        (service, receiver)
    }

    fn service() -> (OrderService, Receiver<NotificationEvent>) {
        service_with(AdminSettings::default())
    }

    fn line(product_id: &str, tier: PriceTier, quantity: i32) -> CheckoutLine {
        CheckoutLine {
            product_id: product_id.to_string(),
            tier,
            quantity,
        }
    }

    fn checkout(lines: Vec<CheckoutLine>) -> CheckoutRequest {
        CheckoutRequest {
            customer: customer(),
            payment_method: "Bank Transfer".to_string(),
            lines,
            notes: Some("  Call before delivery ".to_string()),
        }
    }

    fn serum_lines() -> Vec<CheckoutLine> {
        vec![
            line("prod_1", PriceTier::Retail, 1),
            line("prod_1", PriceTier::Wholesale, 6),
        ]
    }

    #[tokio::test]
    async fn test_place_order_prices_from_catalog_and_queues_notification() {
        let (service, mut receiver) = service();

        let placed = service.place_order(checkout(serum_lines())).await.unwrap();
        let order = &placed.order;

        assert_eq!(order.items.len(), 2);
        assert_eq!(order.sub_total, dec!(75000));
        assert_eq!(order.shipping_fee, dec!(2000));
        assert_eq!(order.total, dec!(77000));
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.version, 1);
        assert_eq!(order.notes.as_deref(), Some("Call before delivery"));
        assert!(placed.whatsapp_link.starts_with("https://wa.me/2349025500817?text="));

        assert_eq!(service.get(&order.id).await.unwrap(), *order);
        match receiver.try_recv().unwrap() {
            NotificationEvent::OrderPlaced(queued) => assert_eq!(queued.id, order.id),
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_checkout_rejections_store_nothing() {
        let (service, mut receiver) = service();

        let empty = service.place_order(checkout(vec![])).await;
        assert!(matches!(empty, Err(OrderError::ValidationError(_))));

        let below_minimum = service
            .place_order(checkout(vec![line("prod_1", PriceTier::Wholesale, 3)]))
            .await;
        assert!(matches!(
            below_minimum,
            Err(OrderError::Cart(CartError::BelowWholesaleMinimum { minimum: 6, requested: 3, .. }))
        ));

        let unknown = service
            .place_order(checkout(vec![line("prod_404", PriceTier::Retail, 1)]))
            .await;
        assert!(matches!(unknown, Err(OrderError::ProductNotFound(id)) if id == "prod_404"));

        let out_of_stock = service
            .place_order(checkout(vec![line("prod_3", PriceTier::Retail, 1)]))
            .await;
        assert!(matches!(out_of_stock, Err(OrderError::Cart(CartError::OutOfStock(_)))));

        let mut request = checkout(serum_lines());
        request.customer.address = "   ".to_string();
        assert!(matches!(
            service.place_order(request).await,
            Err(OrderError::ValidationError(_))
        ));

        assert!(service.list(None).await.unwrap().is_empty());
        assert!(receiver.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_minimum_order_amount_is_enforced() {
        let (service, _receiver) = service();
        let small = service
            .place_order(checkout(vec![line("prod_2", PriceTier::Retail, 1)]))
            .await;
        assert!(small.is_ok());

        let (strict, _receiver) = service_with(AdminSettings {
            minimum_order_amount: dec!(20000),
            ..AdminSettings::default()
        });
        let rejected = strict
            .place_order(checkout(vec![line("prod_2", PriceTier::Retail, 1)]))
            .await;
        assert!(matches!(rejected, Err(OrderError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_quote_applies_tax_and_minimum_flag() {
        let (service, _receiver) = service_with(AdminSettings {
            tax_rate: dec!(7.5),
            minimum_order_amount: dec!(100000),
            ..AdminSettings::default()
        });

        let quote = service.quote(&serum_lines()).await.unwrap();
        assert_eq!(quote.lines.len(), 2);
        assert_eq!(quote.sub_total, dec!(75000));
        assert_eq!(quote.tax, dec!(5625));
        assert_eq!(quote.total, dec!(82625));
        assert!(!quote.meets_minimum);
        assert!(service.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_status_lifecycle() {
        let (service, _receiver) = service();
        let order = service.place_order(checkout(serum_lines())).await.unwrap().order;

        let confirmed = service
            .update_status(&order.id, OrderStatus::Confirmed, Some(1))
            .await
            .unwrap();
        assert_eq!(confirmed.status, OrderStatus::Confirmed);
        assert_eq!(confirmed.version, 2);
        assert!(confirmed.updated_at >= order.updated_at);

        let same = service
            .update_status(&order.id, OrderStatus::Confirmed, None)
            .await
            .unwrap();
        assert_eq!(same.version, 2);

        let backwards = service.update_status(&order.id, OrderStatus::Pending, None).await;
        assert!(matches!(backwards, Err(OrderError::InvalidTransition { .. })));

        let delivered = service
            .update_status(&order.id, OrderStatus::Delivered, None)
            .await
            .unwrap();
        assert_eq!(delivered.version, 3);

        let cancel = service.update_status(&order.id, OrderStatus::Cancelled, None).await;
        assert!(matches!(cancel, Err(OrderError::InvalidTransition { .. })));
    }

    #[tokio::test]
    async fn test_stale_version_is_a_conflict() {
        let (service, _receiver) = service();
        let order = service.place_order(checkout(serum_lines())).await.unwrap().order;

        service
            .update_payment(&order.id, PaymentStatus::Completed, Some(1))
            .await
            .unwrap();
        let stale = service
            .update_status(&order.id, OrderStatus::Confirmed, Some(1))
            .await;
        assert!(matches!(stale, Err(OrderError::Conflict(_))));

        let stored = service.get(&order.id).await.unwrap();
        assert_eq!(stored.payment_status, PaymentStatus::Completed);
        assert_eq!(stored.status, OrderStatus::Pending);
        assert_eq!(stored.version, 2);
    }

    #[tokio::test]
    async fn test_missing_order_is_not_found() {
        let (service, _receiver) = service();
        assert!(matches!(service.get("GB0").await, Err(OrderError::NotFound(_))));
        assert!(matches!(service.whatsapp_link("GB0").await, Err(OrderError::NotFound(_))));
        assert!(matches!(service.resend_invoice("GB0").await, Err(OrderError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_resend_invoice_queues_event() {
        let (service, mut receiver) = service();
        let order = service.place_order(checkout(serum_lines())).await.unwrap().order;
        let _placed = receiver.try_recv().unwrap();

        assert!(service.resend_invoice(&order.id).await.unwrap());
        assert!(matches!(
            receiver.try_recv().unwrap(),
            NotificationEvent::InvoiceRequested(_)
        ));
    }

    /// Commits the first insert but reports it as a dropped connection
    struct CommitThenDropRepository {
        inner: InMemoryOrderRepository,
        inserts: AtomicU32,
        stored_instead: Option<Order>,
    }

    #[async_trait]
    impl OrderRepository for CommitThenDropRepository {
        async fn insert(&self, order: &Order) -> Result<(), PersistenceError> {
            if self.inserts.fetch_add(1, Ordering::SeqCst) == 0 {
                let committed = match &self.stored_instead {
                    Some(other) => Order {
                        id: order.id.clone(),
                        ..other.clone()
                    },
                    None => order.clone(),
                };
                self.inner.insert(&committed).await?;
                return Err(PersistenceError::Transient("connection reset".to_string()));
            }
            self.inner.insert(order).await
        }

        async fn find_by_id(&self, id: &str) -> Result<Option<Order>, PersistenceError> {
            self.inner.find_by_id(id).await
        }

        async fn list(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, PersistenceError> {
            self.inner.list(status).await
        }

        async fn update(&self, order: &Order, expected_version: i32) -> Result<(), PersistenceError> {
            self.inner.update(order, expected_version).await
        }
    }

    fn service_over(orders: Arc<CommitThenDropRepository>) -> (OrderService, Receiver<NotificationEvent>) {
        let (dispatcher, receiver) = NotificationDispatcher::channel(8);
        let service = OrderService::new(
            orders,
            Arc::new(InMemoryProductRepository::with_products(default_products(Utc::now()))),
            Arc::new(InMemorySettingsRepository::new()),
            dispatcher,
        );
        (service, receiver)
    }

    #[tokio::test]
    async fn test_retry_after_committed_insert_succeeds() {
        let orders = Arc::new(CommitThenDropRepository {
            inner: InMemoryOrderRepository::new(),
            inserts: AtomicU32::new(0),
            stored_instead: None,
        });
        let (service, mut receiver) = service_over(orders.clone());

        let placed = service.place_order(checkout(serum_lines())).await.unwrap();

        assert_eq!(orders.inserts.load(Ordering::SeqCst), 2);
        assert_eq!(service.list(None).await.unwrap().len(), 1);
        assert_eq!(service.get(&placed.order.id).await.unwrap().total, dec!(77000));
        assert!(matches!(receiver.try_recv().unwrap(), NotificationEvent::OrderPlaced(_)));
    }

    #[tokio::test]
    async fn test_retry_hitting_a_different_order_still_fails() {
        let mut other = crate::test_support::sample_order();
        other.customer.email = "someone.else@example.com".to_string();
        let orders = Arc::new(CommitThenDropRepository {
            inner: InMemoryOrderRepository::new(),
            inserts: AtomicU32::new(0),
            stored_instead: Some(other),
        });
        let (service, mut receiver) = service_over(orders);

        let result = service.place_order(checkout(serum_lines())).await;

        assert!(matches!(
            result,
            Err(OrderError::Persistence(PersistenceError::Duplicate { .. }))
        ));
        assert!(receiver.try_recv().is_err());
    }
}
