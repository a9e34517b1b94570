//! Account handlers

use axum::{extract::State, http::StatusCode, Json};

use domain_wallet::NewAccount;

use crate::auth::create_token;
use crate::dto::accounts::{RegisterRequest, RegistrationResponse};
use crate::dto::transactions::TransactionResponse;
use crate::{error::ApiError, AppState};

/// Registers a user or agent and returns a token for it
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegistrationResponse>), ApiError> {
    let registration = state
        .engine
        .register_account(NewAccount::from(request))
        .await?;
    let actor = registration.actor;

    let access_token = create_token(
        actor.id,
        actor.role,
        &state.config.jwt_secret,
        state.config.jwt_expiration_secs,
    )?;

    let balance = registration
        .receipt
        .balance_of(actor.wallet_id)
        .map(|m| m.amount())
        .unwrap_or_default();
    let entries = registration
        .receipt
        .entries
        .into_iter()
        .filter(|e| e.wallet_id == actor.wallet_id)
        .map(TransactionResponse::from)
        .collect();

    Ok((
        StatusCode::CREATED,
        Json(RegistrationResponse {
            actor: actor.into(),
            access_token,
            balance,
            entries,
        }),
    ))
}
