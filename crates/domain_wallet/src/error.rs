//! Ledger domain errors
//!
//! Every engine operation and every storage port returns `LedgerError`.
//! Variants fall into four groups: validation (rejected before any store
//! access), state (rejected after a precondition check), resource (rejected
//! after a fresh read of balances) and infrastructure (`Store`, which always
//! means the unit of work was rolled back).

use rust_decimal::Decimal;
use thiserror::Error;

use core_kernel::{ActorId, MoneyError, PortError, WalletId};

/// Errors that can occur in the wallet ledger
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A debit would take the wallet below zero
    #[error("Insufficient funds in wallet {wallet}: available {available}, requested {requested}")]
    InsufficientFunds {
        wallet: WalletId,
        available: Decimal,
        requested: Decimal,
    },

    /// The admin float cannot cover a funding or commission payout
    #[error("Insufficient admin float: available {available}, requested {requested}")]
    InsufficientAdminFloat {
        available: Decimal,
        requested: Decimal,
    },

    #[error("Wallet is blocked: {0}")]
    WalletBlocked(WalletId),

    #[error("Wallet not found: {0}")]
    WalletNotFound(String),

    #[error("Actor not found: {0}")]
    ActorNotFound(String),

    /// The agent is suspended and may not move money
    #[error("Agent is not approved: {0}")]
    ActorNotApproved(ActorId),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Sender and receiver wallets are the same")]
    SameWallet,

    #[error("Role not permitted: {0}")]
    RoleNotPermitted(String),

    /// A status transition was requested into the current status
    #[error("Already in state: {0}")]
    AlreadyInState(String),

    #[error("Admin account is not configured")]
    AdminNotConfigured,

    #[error("Duplicate account: {0}")]
    DuplicateAccount(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Infrastructure failure; the unit of work has been rolled back
    #[error("Store error: {0}")]
    Store(#[from] PortError),

    #[error("Money error: {0}")]
    Money(#[from] MoneyError),
}

impl LedgerError {
    pub fn wallet_not_found(id: impl std::fmt::Display) -> Self {
        LedgerError::WalletNotFound(id.to_string())
    }

    pub fn actor_not_found(id: impl std::fmt::Display) -> Self {
        LedgerError::ActorNotFound(id.to_string())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        LedgerError::Validation(message.into())
    }

    pub fn role_not_permitted(message: impl Into<String>) -> Self {
        LedgerError::RoleNotPermitted(message.into())
    }

    pub fn already_in_state(message: impl Into<String>) -> Self {
        LedgerError::AlreadyInState(message.into())
    }

    /// Stable machine-readable code for the error kind
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::InsufficientFunds { .. } => "insufficient_funds",
            LedgerError::InsufficientAdminFloat { .. } => "insufficient_admin_float",
            LedgerError::WalletBlocked(_) => "wallet_blocked",
            LedgerError::WalletNotFound(_) => "wallet_not_found",
            LedgerError::ActorNotFound(_) => "actor_not_found",
            LedgerError::ActorNotApproved(_) => "actor_not_approved",
            LedgerError::InvalidAmount(_) => "invalid_amount",
            LedgerError::SameWallet => "same_wallet",
            LedgerError::RoleNotPermitted(_) => "role_not_permitted",
            LedgerError::AlreadyInState(_) => "already_in_state",
            LedgerError::AdminNotConfigured => "admin_not_configured",
            LedgerError::DuplicateAccount(_) => "duplicate_account",
            LedgerError::Validation(_) => "validation_error",
            LedgerError::Store(_) => "store_error",
            LedgerError::Money(_) => "money_error",
        }
    }

    /// Returns true for infrastructure failures
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, LedgerError::Store(_))
    }
}

impl From<validator::ValidationErrors> for LedgerError {
    fn from(errors: validator::ValidationErrors) -> Self {
        LedgerError::Validation(errors.to_string())
    }
}
