//! Transaction history handlers

use axum::{
    extract::{Query, State},
    Json,
};

use crate::auth::AuthenticatedActor;
use crate::dto::transactions::{HistoryParams, PageResponse, TransactionResponse};
use crate::{error::ApiError, AppState};

/// Entries on the caller's wallet
pub async fn my_transactions(
    State(state): State<AppState>,
    caller: AuthenticatedActor,
    Query(params): Query<HistoryParams>,
) -> Result<Json<PageResponse<TransactionResponse>>, ApiError> {
    let page = state
        .engine
        .history(caller.id, params.into_query()?)
        .await?;
    Ok(Json(page.into()))
}
