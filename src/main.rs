//! Engagement Server: user feed and notification fan-out.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, fmt};

use engagement_core::config::AppConfig;
use engagement_core::error::AppError;
use engagement_pubsub::{DeliveryRunner, InMemoryBus, MessageHandler, TopicNamer};
use engagement_service::{Channels, ServiceRegistry};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from files and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("ENGAGEMENT_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env).map_err(|e| e.context(format!("loading '{env}' configuration")))
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
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.pubsub.environment,
        "Starting engagement server"
    );

    // ── Step 1: Repository ───────────────────────────────────────
    tracing::info!(provider = %config.database.provider, "Initializing feed repository...");
    let repository = engagement_database::build_repository(&config.database).await?;

    // ── Step 2: Notification bus ─────────────────────────────────
    let namer = TopicNamer::from_config(&config.pubsub);
    let (bus, deliveries) = InMemoryBus::with_delivery(namer, config.pubsub.queue_capacity);
    let bus = Arc::new(bus);
    tracing::info!(
        topics = bus.namer().topic_ids().len(),
        queue_capacity = config.pubsub.queue_capacity,
        "Notification bus initialized"
    );

    // ── Step 3: Outbound channels ────────────────────────────────
    tracing::info!(provider = %config.channels.provider, "Initializing notification channels...");
    let channels = Channels::from_config(&config.channels)?;

    // ── Step 4: Services ─────────────────────────────────────────
    let services = ServiceRegistry::new(&config, repository, bus, channels);

    // ── Step 5: Shutdown channel ─────────────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Step 6: Delivery runner ──────────────────────────────────
    let handler: Arc<dyn MessageHandler> = services.router.clone();
    let runner = DeliveryRunner::new(
        handler,
        config.pubsub.subscription.clone(),
        config.pubsub.delivery_concurrency,
    );
    let runner_handle = tokio::spawn(async move {
        runner.run(deliveries, shutdown_rx).await;
    });
    tracing::info!("Delivery runner started");

    // ── Step 7: HTTP server ──────────────────────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let shutdown_grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let app = engagement_api::build_app(engagement_api::AppState::new(config, &services));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("Engagement server listening on {}", addr);

    // ── Step 8: Graceful shutdown ────────────────────────────────
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        let _ = shutdown_tx.send(true);
    });

    server
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    tracing::info!("Waiting for in-flight deliveries to complete...");
    if tokio::time::timeout(shutdown_grace, runner_handle)
        .await
        .is_err()
    {
        tracing::warn!("Delivery runner did not stop within the grace period");
    }

    tracing::info!("Engagement server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
