//! Administrative handlers
//!
//! Every handler here requires the admin role.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use core_kernel::{ActorId, WalletId};
use domain_wallet::Role;

use crate::auth::AuthenticatedActor;
use crate::dto::accounts::ActorResponse;
use crate::dto::transactions::{HistoryParams, PageParams, PageResponse, TransactionResponse};
use crate::dto::wallet::WalletResponse;
use crate::{error::ApiError, AppState};

pub async fn approve_agent(
    State(state): State<AppState>,
    caller: AuthenticatedActor,
    Path(id): Path<Uuid>,
) -> Result<Json<ActorResponse>, ApiError> {
    caller.require(Role::Admin)?;
    let agent = state.engine.approve_agent(ActorId::from_uuid(id)).await?;
    Ok(Json(agent.into()))
}

pub async fn suspend_agent(
    State(state): State<AppState>,
    caller: AuthenticatedActor,
    Path(id): Path<Uuid>,
) -> Result<Json<ActorResponse>, ApiError> {
    caller.require(Role::Admin)?;
    let agent = state.engine.suspend_agent(ActorId::from_uuid(id)).await?;
    Ok(Json(agent.into()))
}

pub async fn block_wallet(
    State(state): State<AppState>,
    caller: AuthenticatedActor,
    Path(id): Path<Uuid>,
) -> Result<Json<WalletResponse>, ApiError> {
    caller.require(Role::Admin)?;
    let wallet = state.engine.block_wallet(WalletId::from_uuid(id)).await?;
    Ok(Json(wallet.into()))
}

pub async fn unblock_wallet(
    State(state): State<AppState>,
    caller: AuthenticatedActor,
    Path(id): Path<Uuid>,
) -> Result<Json<WalletResponse>, ApiError> {
    caller.require(Role::Admin)?;
    let wallet = state.engine.unblock_wallet(WalletId::from_uuid(id)).await?;
    Ok(Json(wallet.into()))
}

pub async fn list_agents(
    State(state): State<AppState>,
    caller: AuthenticatedActor,
    Query(params): Query<PageParams>,
) -> Result<Json<PageResponse<ActorResponse>>, ApiError> {
    caller.require(Role::Admin)?;
    let page = state.engine.agents(params.pagination()).await?;
    Ok(Json(page.into()))
}

pub async fn list_wallets(
    State(state): State<AppState>,
    caller: AuthenticatedActor,
    Query(params): Query<PageParams>,
) -> Result<Json<PageResponse<WalletResponse>>, ApiError> {
    caller.require(Role::Admin)?;
    let page = state.engine.list_wallets(params.pagination()).await?;
    Ok(Json(page.into()))
}

/// The whole transaction log, filtered and paginated
pub async fn all_transactions(
    State(state): State<AppState>,
    caller: AuthenticatedActor,
    Query(params): Query<HistoryParams>,
) -> Result<Json<PageResponse<TransactionResponse>>, ApiError> {
    caller.require(Role::Admin)?;
    let page = state.engine.transactions(&params.into_query()?).await?;
    Ok(Json(page.into()))
}
