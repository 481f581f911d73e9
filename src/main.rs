use actix_web::{web, App, HttpResponse, HttpServer};
use paybridge::config::Config;
use paybridge::middleware::Correlation;
use paybridge::modules::callbacks::controllers as callback_controllers;
use paybridge::modules::carts::repositories::MySqlCartStore;
use paybridge::modules::gateway::services::{GatewayClient, PaymentProcessor};
use paybridge::modules::orders::repositories::MySqlOrderStore;
use paybridge::modules::rates::controllers as rate_controllers;
use paybridge::modules::rates::models::RateSource;
use paybridge::modules::rates::services::{HttpRateFeed, RateCache, RateFeed};
use paybridge::modules::reconciliation::controllers as checkout_controllers;
use paybridge::modules::reconciliation::repositories::{MySqlTradeStore, TradeStore};
use paybridge::modules::reconciliation::services::{
    CheckoutService, ReconciliationPoller, ReconciliationService,
};
use std::sync::Arc;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paybridge=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env().expect("Failed to load configuration");
    config.validate().expect("Configuration validation failed");

    tracing::info!("Starting PayBridge payment reconciliation service");
    tracing::info!("Environment: {}", config.app.env);
    tracing::info!("Server binding to: {}", config.server.bind_address());

    // Create database connection pool
    let db_pool = config
        .database
        .create_pool()
        .await
        .expect("Failed to create database pool");

    tracing::info!(
        "Database pool initialized ({} connections)",
        config.database.pool_size
    );

    // Exchange-rate cache: primary feed, then backup, else static default
    let feeds: Vec<Arc<dyn RateFeed>> = vec![
        Arc::new(
            HttpRateFeed::new(config.rates.primary_url.clone(), RateSource::Primary)
                .expect("Failed to build primary rate feed"),
        ),
        Arc::new(
            HttpRateFeed::new(config.rates.backup_url.clone(), RateSource::Backup)
                .expect("Failed to build backup rate feed"),
        ),
    ];
    let rates = Arc::new(RateCache::new(config.rates.default_rate, feeds));

    // Collaborators and the signed gateway client
    let trades: Arc<dyn TradeStore> = Arc::new(MySqlTradeStore::new(db_pool.clone()));
    let orders = Arc::new(MySqlOrderStore::new(db_pool.clone()));
    let carts = Arc::new(MySqlCartStore::new(db_pool.clone()));
    let processor: Arc<dyn PaymentProcessor> = Arc::new(
        GatewayClient::new(config.gateway.clone()).expect("Failed to build gateway client"),
    );

    let reconciler = Arc::new(ReconciliationService::new(
        trades.clone(),
        orders.clone(),
        carts.clone(),
    ));

    let checkout = Arc::new(CheckoutService::new(
        trades.clone(),
        carts.clone(),
        processor.clone(),
        rates.clone(),
    ));

    // Sweep up attempts whose callback never arrived
    let poller = Arc::new(ReconciliationPoller::new(
        trades.clone(),
        processor.clone(),
        reconciler.clone(),
        config.poller.clone(),
    ));
    tokio::spawn(poller.start());

    // Start HTTP server
    let bind_address = config.server.bind_address();
    let server = HttpServer::new(move || {
        let reconciler = reconciler.clone();
        let checkout = checkout.clone();
        let trades = trades.clone();
        let rates = rates.clone();
        App::new()
            .wrap(TracingLogger::default())
            .wrap(Correlation)
            .configure(move |cfg| callback_controllers::configure(cfg, reconciler))
            .configure(move |cfg| checkout_controllers::configure(cfg, checkout, trades))
            .configure(move |cfg| rate_controllers::configure(cfg, rates))
            .route("/health", web::get().to(health_check))
    })
    .bind(&bind_address)?
    .run();

    tracing::info!("Server started at http://{}", bind_address);

    server.await
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "paybridge"
    }))
}
