//! CourseHub commerce server.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use coursehub_api::AppState;
use coursehub_core::config::AppConfig;
use coursehub_core::error::AppError;
use coursehub_core::traits::{LogNotificationDispatcher, NotificationDispatcher};
use coursehub_database::{DatabasePool, PgCommerceStore, Stores};
use coursehub_payment::{PaymentGateway, PaystackGateway};
use coursehub_service::CommerceServices;

#[tokio::main]
async fn main() {
    let env = std::env::var("COURSEHUB_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting CourseHub v{}", env!("CARGO_PKG_VERSION"));

    let database = DatabasePool::connect(&config.database).await?;
    let stores = Stores::from_backend(Arc::new(PgCommerceStore::new(database.pool().clone())));

    let gateway: Arc<dyn PaymentGateway> = Arc::new(PaystackGateway::new(&config.payment)?);
    let dispatcher: Arc<dyn NotificationDispatcher> = Arc::new(LogNotificationDispatcher);
    let services = CommerceServices::new(stores, gateway, dispatcher, &config);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let relay_handle = if config.outbox.enabled {
        let relay = services.relay.clone();
        let rx = shutdown_rx.clone();
        Some(tokio::spawn(async move { relay.run(rx).await }))
    } else {
        None
    };

    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    let state = AppState::new(config, services, Some(database.clone()));
    let result = coursehub_api::serve(state, shutdown_rx).await;

    if let Some(handle) = relay_handle {
        if let Err(e) = handle.await {
            tracing::error!("Outbox relay task failed: {}", e);
        }
    }
    database.close().await;
    tracing::info!("CourseHub stopped");
    result
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
