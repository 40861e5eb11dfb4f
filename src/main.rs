use std::sync::Arc;

use bliss_store::catalog::{seed::seed_if_empty, InMemoryProductRepository, PgProductRepository, ProductRepository};
use bliss_store::config::AppConfig;
use bliss_store::notifications::{InvoiceMailer, NotificationDispatcher, NotificationWorker, SmtpMailer};
use bliss_store::orders::{InMemoryOrderRepository, OrderRepository, OrderService, PgOrderRepository};
use bliss_store::settings::{InMemorySettingsRepository, PgSettingsRepository, SettingsRepository};
use bliss_store::{create_router, db, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("GreatBliss Store API - Starting...");

    let config = AppConfig::from_env()?;

    let (products, orders, settings): (
        Arc<dyn ProductRepository>,
        Arc<dyn OrderRepository>,
        Arc<dyn SettingsRepository>,
    ) = match &config.database_url {
        Some(database_url) => {
            tracing::info!("Connecting to database...");
            let pool = db::create_pool(database_url).await?;

            tracing::info!("Running database migrations...");
            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Migrations completed successfully");

            (
                Arc::new(PgProductRepository::new(pool.clone())),
                Arc::new(PgOrderRepository::new(pool.clone())),
                Arc::new(PgSettingsRepository::new(pool)),
            )
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory storage; data is lost on restart");
            (
                Arc::new(InMemoryProductRepository::new()),
                Arc::new(InMemoryOrderRepository::new()),
                Arc::new(InMemorySettingsRepository::new()),
            )
        }
    };

    seed_if_empty(products.as_ref()).await?;

    let mailer: Option<Arc<dyn InvoiceMailer>> = match &config.smtp {
        Some(smtp) => {
            tracing::info!("Invoice e-mail enabled via {}:{}", smtp.host, smtp.port);
            Some(Arc::new(SmtpMailer::new(smtp)?))
        }
        None => {
            tracing::warn!("SMTP_HOST not set, invoice e-mails are disabled");
            None
        }
    };

    let (dispatcher, receiver) = NotificationDispatcher::channel(config.notification_queue_capacity);
    let worker = NotificationWorker::new(receiver, settings.clone(), mailer, config.email_timeout);
    tokio::spawn(worker.run());

    let order_service = OrderService::new(orders.clone(), products.clone(), settings.clone(), dispatcher);
    let app = create_router(AppState {
        products,
        orders,
        settings,
        order_service,
    });

    let addr = config.bind_address();
    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("GreatBliss Store API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
