//! Agent cash handlers

use axum::{extract::State, Json};

use domain_wallet::{Role, TransferRequest};

use super::caller_view;
use crate::auth::AuthenticatedActor;
use crate::dto::wallet::{CounterpartyRequest, OperationResponse};
use crate::{error::ApiError, AppState};

/// Agent credits the user registered under `phone`
pub async fn cash_in(
    State(state): State<AppState>,
    caller: AuthenticatedActor,
    Json(request): Json<CounterpartyRequest>,
) -> Result<Json<OperationResponse>, ApiError> {
    caller.require(Role::Agent)?;
    let user = state.engine.actor_by_phone(&request.phone).await?;
    let receipt = state
        .engine
        .cash_in(TransferRequest::new(caller.id, user.id, request.amount).with_note(request.note))
        .await?;
    Ok(Json(caller_view(receipt, caller.id)?))
}

/// User withdraws cash through an agent
///
/// A user caller names the agent by phone; an agent caller names the user.
pub async fn cash_out(
    State(state): State<AppState>,
    caller: AuthenticatedActor,
    Json(request): Json<CounterpartyRequest>,
) -> Result<Json<OperationResponse>, ApiError> {
    let counterparty = state.engine.actor_by_phone(&request.phone).await?;
    let transfer = match caller.role {
        Role::User => TransferRequest::new(caller.id, counterparty.id, request.amount),
        Role::Agent => TransferRequest::new(counterparty.id, caller.id, request.amount)
            .initiated_by(caller.id),
        Role::Admin => {
            return Err(ApiError::Forbidden(
                "cash-out is between a user and an agent".to_string(),
            ))
        }
    };

    let receipt = state
        .engine
        .cash_out(transfer.with_note(request.note))
        .await?;
    Ok(Json(caller_view(receipt, caller.id)?))
}
