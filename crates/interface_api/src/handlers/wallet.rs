//! Wallet handlers

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use core_kernel::WalletId;
use domain_wallet::TransferRequest;

use super::caller_view;
use crate::auth::AuthenticatedActor;
use crate::dto::wallet::*;
use crate::{error::ApiError, AppState};

/// The caller's own wallet
pub async fn my_wallet(
    State(state): State<AppState>,
    caller: AuthenticatedActor,
) -> Result<Json<WalletResponse>, ApiError> {
    let wallet = state.engine.wallet_of(caller.id).await?;
    Ok(Json(wallet.into()))
}

/// A wallet by id; visible to its owner and the admin
pub async fn get_wallet(
    State(state): State<AppState>,
    caller: AuthenticatedActor,
    Path(id): Path<Uuid>,
) -> Result<Json<WalletResponse>, ApiError> {
    let wallet = state.engine.wallet(WalletId::from_uuid(id)).await?;
    if wallet.owner_id != caller.id && !caller.is_admin() {
        return Err(ApiError::Forbidden("not your wallet".to_string()));
    }
    Ok(Json(wallet.into()))
}

pub async fn top_up(
    State(state): State<AppState>,
    caller: AuthenticatedActor,
    Json(request): Json<AmountRequest>,
) -> Result<Json<OperationResponse>, ApiError> {
    let receipt = state
        .engine
        .top_up(caller.id, request.amount, request.note)
        .await?;
    Ok(Json(caller_view(receipt, caller.id)?))
}

pub async fn withdraw(
    State(state): State<AppState>,
    caller: AuthenticatedActor,
    Json(request): Json<AmountRequest>,
) -> Result<Json<OperationResponse>, ApiError> {
    let receipt = state
        .engine
        .withdraw(caller.id, request.amount, request.note)
        .await?;
    Ok(Json(caller_view(receipt, caller.id)?))
}

/// Sends money to the account registered under `phone`
pub async fn send_money(
    State(state): State<AppState>,
    caller: AuthenticatedActor,
    Json(request): Json<CounterpartyRequest>,
) -> Result<Json<OperationResponse>, ApiError> {
    let recipient = state.engine.actor_by_phone(&request.phone).await?;
    let receipt = state
        .engine
        .send_money(
            TransferRequest::new(caller.id, recipient.id, request.amount).with_note(request.note),
        )
        .await?;
    Ok(Json(caller_view(receipt, caller.id)?))
}
