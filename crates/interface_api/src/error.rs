//! API error handling
//!
//! Ledger errors keep their machine-readable code in the response body;
//! the HTTP status groups them by kind: validation 400/422, missing
//! records 404, state conflicts 403/409, infrastructure 500.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use domain_wallet::LedgerError;

use crate::auth::AuthError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    /// Error raised by the ledger engine
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

fn ledger_status(err: &LedgerError) -> StatusCode {
    match err {
        LedgerError::InvalidAmount(_)
        | LedgerError::SameWallet
        | LedgerError::InsufficientFunds { .. }
        | LedgerError::Money(_) => StatusCode::BAD_REQUEST,
        LedgerError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        LedgerError::WalletNotFound(_) | LedgerError::ActorNotFound(_) => StatusCode::NOT_FOUND,
        LedgerError::WalletBlocked(_)
        | LedgerError::ActorNotApproved(_)
        | LedgerError::RoleNotPermitted(_) => StatusCode::FORBIDDEN,
        LedgerError::AlreadyInState(_) | LedgerError::DuplicateAccount(_) => StatusCode::CONFLICT,
        LedgerError::InsufficientAdminFloat { .. }
        | LedgerError::AdminNotConfigured
        | LedgerError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl ApiError {
    /// HTTP status and machine-readable code
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            ApiError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
            ApiError::Ledger(err) => (ledger_status(err), err.code()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = if status.is_server_error() {
            error!(error = %self, "Request failed");
            "Internal server error".to_string()
        } else {
            match &self {
                ApiError::Ledger(err) => err.to_string(),
                ApiError::Unauthorized => "Unauthorized".to_string(),
                ApiError::NotFound(msg)
                | ApiError::BadRequest(msg)
                | ApiError::Forbidden(msg)
                | ApiError::Validation(msg)
                | ApiError::Internal(msg) => msg.clone(),
            }
        };

        let body = ErrorResponse {
            error: code.to_string(),
            message,
            details: None,
        };

        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingPermission(msg) => ApiError::Forbidden(msg),
            AuthError::InvalidToken | AuthError::TokenExpired => ApiError::Unauthorized,
            AuthError::Signing(msg) => ApiError::Internal(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{PortError, WalletId};
    use rust_decimal_macros::dec;

    #[test]
    fn test_insufficient_funds_is_bad_request() {
        let err = ApiError::from(LedgerError::InsufficientFunds {
            wallet: WalletId::new(),
            available: dec!(10),
            requested: dec!(20),
        });
        assert_eq!(
            err.status_and_code(),
            (StatusCode::BAD_REQUEST, "insufficient_funds")
        );
    }

    #[test]
    fn test_state_errors() {
        let conflict = ApiError::from(LedgerError::already_in_state("wallet is blocked"));
        assert_eq!(conflict.status_and_code().0, StatusCode::CONFLICT);

        let forbidden = ApiError::from(LedgerError::role_not_permitted("agents cannot send"));
        assert_eq!(forbidden.status_and_code().0, StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_store_errors_are_internal() {
        let err = ApiError::from(LedgerError::Store(PortError::connection("refused")));
        assert_eq!(
            err.status_and_code(),
            (StatusCode::INTERNAL_SERVER_ERROR, "store_error")
        );
    }

    #[test]
    fn test_auth_errors() {
        assert!(matches!(
            ApiError::from(AuthError::TokenExpired),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            ApiError::from(AuthError::MissingPermission("admin".into())),
            ApiError::Forbidden(_)
        ));
    }
}
