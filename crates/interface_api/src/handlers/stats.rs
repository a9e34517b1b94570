//! Statistics handlers

use axum::{extract::State, Json};

use domain_wallet::{DashboardStats, Role, TransactionSummary, VolumeStats, WalletStatistics};

use crate::auth::AuthenticatedActor;
use crate::{error::ApiError, AppState};

/// Ledger-wide totals by kind (admin)
pub async fn summary(
    State(state): State<AppState>,
    caller: AuthenticatedActor,
) -> Result<Json<TransactionSummary>, ApiError> {
    caller.require(Role::Admin)?;
    Ok(Json(state.engine.summary().await?))
}

/// Wallet population and total balance (admin)
pub async fn wallets(
    State(state): State<AppState>,
    caller: AuthenticatedActor,
) -> Result<Json<WalletStatistics>, ApiError> {
    caller.require(Role::Admin)?;
    Ok(Json(state.engine.wallet_statistics().await?))
}

pub async fn dashboard(
    State(state): State<AppState>,
    caller: AuthenticatedActor,
) -> Result<Json<DashboardStats>, ApiError> {
    Ok(Json(state.engine.dashboard(caller.id).await?))
}

/// The caller's 7- and 30-day volume
pub async fn my_volume(
    State(state): State<AppState>,
    caller: AuthenticatedActor,
) -> Result<Json<VolumeStats>, ApiError> {
    Ok(Json(state.engine.volume(caller.id).await?))
}
