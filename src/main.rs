use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sales_order_service::api::{self, AppState};
use sales_order_service::config::Settings;
use sales_order_service::domain::order::OrderCommandHandler;
use sales_order_service::metrics::Metrics;
use sales_order_service::store::{InMemoryOrderRepository, OrderRepository, PgOrderRepository};
use sales_order_service::utils::RetryConfig;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,sales_order_service=debug")),
        )
        .init();

    tracing::info!("Starting sales order service");

    // === 1. Load configuration ===
    let settings = Settings::from_env()?;
    tracing::info!(
        status_policy = %settings.status_policy,
        max_attempts = settings.order_number_max_attempts,
        flat_fee = %settings.delivery.flat_fee,
        free_from_items = settings.delivery.free_from_items,
        "Configuration loaded"
    );

    // === 2. Open the order store ===
    let repository: Arc<dyn OrderRepository> = match &settings.database_url {
        Some(url) => {
            tracing::info!("Connecting to Postgres...");
            let pool = PgPoolOptions::new()
                .max_connections(settings.database_max_connections)
                .connect(url)
                .await?;

            let repository = PgOrderRepository::new(pool);
            repository.migrate().await?;
            tracing::info!("Database migrations applied");
            Arc::new(repository)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, orders are kept in memory and lost on exit");
            Arc::new(InMemoryOrderRepository::new())
        }
    };

    // === 3. Initialize Prometheus metrics ===
    let metrics = Arc::new(Metrics::new()?);
    tracing::info!("Metrics registry created with {} metrics", metrics.registry().gather().len());

    // === 4. Wire the lifecycle manager and serve ===
    let orders = OrderCommandHandler::new(
        repository,
        metrics.clone(),
        settings.status_policy,
        RetryConfig::for_conflicts(settings.order_number_max_attempts),
    );
    let state = AppState {
        orders: Arc::new(orders),
        delivery: settings.delivery,
    };

    api::serve(state, metrics, settings.bind_address()).await?;

    tracing::info!("Server stopped");
    Ok(())
}
