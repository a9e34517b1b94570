//! Wallet and money movement DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::ActorId;
use domain_wallet::{LedgerReceipt, Wallet, WalletStatus};

use super::transactions::TransactionResponse;

/// Top-up or withdrawal on the caller's own wallet
#[derive(Debug, Deserialize)]
pub struct AmountRequest {
    pub amount: Decimal,
    /// Free-text purpose stored on the entry
    pub note: Option<String>,
}

/// Movement to or from a counterparty addressed by phone number
#[derive(Debug, Deserialize)]
pub struct CounterpartyRequest {
    pub phone: String,
    pub amount: Decimal,
    pub note: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WalletResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub balance: Decimal,
    pub currency: String,
    pub status: WalletStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Wallet> for WalletResponse {
    fn from(wallet: Wallet) -> Self {
        Self {
            id: wallet.id.into(),
            owner_id: wallet.owner_id.into(),
            balance: wallet.balance.amount(),
            currency: wallet.balance.currency().code().to_string(),
            status: wallet.status,
            created_at: wallet.created_at,
            updated_at: wallet.updated_at,
        }
    }
}

/// The caller's view of a committed operation
///
/// Only entries on the caller's wallet and the caller's resulting balance
/// are returned; counterparties' balances stay private.
#[derive(Debug, Serialize, Deserialize)]
pub struct OperationResponse {
    pub balance: Decimal,
    pub currency: String,
    pub entries: Vec<TransactionResponse>,
}

impl OperationResponse {
    /// Projects a receipt onto the wallet owned by `caller`
    pub fn for_caller(receipt: LedgerReceipt, caller: ActorId) -> Option<Self> {
        let wallet = receipt.balances.into_iter().find(|w| w.owner_id == caller)?;
        let entries = receipt
            .entries
            .into_iter()
            .filter(|e| e.wallet_id == wallet.id)
            .map(TransactionResponse::from)
            .collect();
        Some(Self {
            balance: wallet.balance.amount(),
            currency: wallet.balance.currency().code().to_string(),
            entries,
        })
    }
}
