//! Request handlers

pub mod accounts;
pub mod admin;
pub mod agent;
pub mod health;
pub mod stats;
pub mod transactions;
pub mod wallet;

use core_kernel::ActorId;

use crate::dto::wallet::OperationResponse;
use crate::error::ApiError;
use domain_wallet::LedgerReceipt;

/// Projects a receipt onto the caller's wallet
pub(crate) fn caller_view(receipt: LedgerReceipt, caller: ActorId) -> Result<OperationResponse, ApiError> {
    OperationResponse::for_caller(receipt, caller)
        .ok_or_else(|| ApiError::Internal("operation did not touch the caller's wallet".to_string()))
}
