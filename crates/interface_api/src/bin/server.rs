//! Wallet Ledger - API Server Binary
//!
//! Starts the HTTP API server over the wallet ledger engine.
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin wallet-api
//!
//! # Run against the in-memory store
//! WALLET_STORAGE=memory cargo run --bin wallet-api
//! ```
//!
//! # Environment Variables
//!
//! * `WALLET_HOST` - Server host (default: 0.0.0.0)
//! * `WALLET_PORT` - Server port (default: 8080)
//! * `WALLET_JWT_SECRET` - JWT signing secret (required in production)
//! * `WALLET_JWT_EXPIRATION_SECS` - JWT token expiration in seconds (default: 3600)
//! * `WALLET_DATABASE_URL` - PostgreSQL connection string
//! * `WALLET_STORAGE` - `postgres` (default) or `memory`
//! * `WALLET_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `WALLET_ADMIN_EMAIL`, `WALLET_ADMIN_PHONE`, `WALLET_ADMIN_NAME` - Admin account seeded at startup
//! * `WALLET_USER_FEE_PER_MILLE`, `WALLET_AGENT_FEE_PER_MILLE`,
//!   `WALLET_AGENT_COMMISSION_PER_MILLE` - Rates pinned on new accounts
//! * `WALLET_INITIAL_FUNDING`, `WALLET_ADMIN_FLOAT` - Funding amounts

use std::net::SocketAddr;
use std::sync::Arc;

use domain_wallet::{InMemoryLedgerStore, LedgerEngine, LedgerStore};
use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresLedgerStore};
use interface_api::{
    config::{ApiConfig, StorageBackend},
    create_router,
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Main entry point for the API server.
///
/// Initializes logging, loads configuration, opens the ledger store, seeds
/// the admin account and starts the HTTP server.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration is invalid
/// - Database connection or migrations fail
/// - The admin account cannot be seeded
/// - Server fails to bind to the configured address
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = load_config();

    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        storage = ?config.storage,
        "Starting Wallet Ledger API Server"
    );

    let settings = config.ledger_settings()?;
    let store = open_store(&config).await?;
    let engine = Arc::new(LedgerEngine::new(store, config.admin_email.clone(), settings));

    // The ledger cannot move money without its float
    let admin = engine.seed_admin(config.admin_account()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to seed admin account");
        e
    })?;
    tracing::info!(admin_id = %admin.id, "Admin account ready");

    let app = create_router(engine, config.clone());

    let addr: SocketAddr = config.server_addr().parse()?;

    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Loads API configuration from `WALLET_*` environment variables.
///
/// Falls back to defaults, with a warning, if the environment cannot be
/// deserialized.
fn load_config() -> ApiConfig {
    ApiConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Invalid configuration ({}), using defaults", e);
        ApiConfig::default()
    })
}

/// Initializes the tracing subscriber for structured logging.
///
/// `RUST_LOG` takes precedence over the configured level.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Opens the configured ledger store, applying migrations for PostgreSQL
async fn open_store(config: &ApiConfig) -> Result<Arc<dyn LedgerStore>, Box<dyn std::error::Error>> {
    match config.storage {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory ledger store; state is lost on restart");
            Ok(Arc::new(InMemoryLedgerStore::new()))
        }
        StorageBackend::Postgres => {
            tracing::info!("Connecting to database...");
            let pool = create_pool(DatabaseConfig::new(config.database_url.clone())).await?;
            run_migrations(&pool).await?;
            tracing::info!("Database ready");
            Ok(Arc::new(PostgresLedgerStore::new(pool)))
        }
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// This enables graceful shutdown of the server, allowing in-flight
/// requests to complete before the process exits.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
