//! HTTP API Layer
//!
//! REST API over the wallet ledger engine, built on Axum.
//!
//! # Architecture
//!
//! - **Handlers**: one module per area (accounts, wallet, agent, admin,
//!   transactions, stats, health)
//! - **Middleware**: JWT authentication and request audit logging
//! - **DTOs**: request/response shapes; counterparties are addressed by
//!   phone number
//! - **Error Handling**: ledger errors mapped to stable status codes
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::create_router;
//!
//! let app = create_router(engine, config);
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use domain_wallet::LedgerEngine;

use crate::config::ApiConfig;
use crate::handlers::{accounts, admin, agent, health, stats, transactions, wallet};
use crate::middleware::{audit_middleware, auth_middleware};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<LedgerEngine>,
    pub config: ApiConfig,
}

/// Creates the main API router
///
/// # Arguments
///
/// * `engine` - Ledger engine over the configured store
/// * `config` - API configuration
pub fn create_router(engine: Arc<LedgerEngine>, config: ApiConfig) -> Router {
    let state = AppState { engine, config };

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let registration_routes = Router::new().route("/accounts", post(accounts::register));

    let wallet_routes = Router::new()
        .route("/me", get(wallet::my_wallet))
        .route("/top-up", post(wallet::top_up))
        .route("/withdraw", post(wallet::withdraw))
        .route("/send", post(wallet::send_money));

    let agent_routes = Router::new()
        .route("/cash-in", post(agent::cash_in))
        .route("/cash-out", post(agent::cash_out));

    let admin_routes = Router::new()
        .route("/agents", get(admin::list_agents))
        .route("/agents/:id/approve", patch(admin::approve_agent))
        .route("/agents/:id/suspend", patch(admin::suspend_agent))
        .route("/wallets", get(admin::list_wallets))
        .route("/wallets/:id/block", patch(admin::block_wallet))
        .route("/wallets/:id/unblock", patch(admin::unblock_wallet))
        .route("/transactions", get(admin::all_transactions));

    let stats_routes = Router::new()
        .route("/summary", get(stats::summary))
        .route("/wallets", get(stats::wallets))
        .route("/dashboard", get(stats::dashboard))
        .route("/me", get(stats::my_volume));

    // Protected API routes
    let protected_routes = Router::new()
        .nest("/wallet", wallet_routes)
        .route("/wallets/:id", get(wallet::get_wallet))
        .nest("/agent", agent_routes)
        .nest("/admin", admin_routes)
        .route("/transactions/me", get(transactions::my_transactions))
        .nest("/stats", stats_routes)
        .layer(axum_middleware::from_fn(audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    let api_routes = Router::new()
        .merge(registration_routes)
        .merge(protected_routes);

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                ),
        )
        .with_state(state)
}
