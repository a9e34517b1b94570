//! Wallet records
//!
//! A wallet is created once per actor with a zero balance and is never
//! deleted. Its balance changes only through the store's atomic increment;
//! nothing above the store reads a balance and writes it back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ActorId, Currency, Money, WalletId};

use crate::error::LedgerError;

/// Wallet status
///
/// Blocked wallets reject every debit and credit until an administrator
/// unblocks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletStatus {
    Active,
    Blocked,
}

impl std::fmt::Display for WalletStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WalletStatus::Active => write!(f, "active"),
            WalletStatus::Blocked => write!(f, "blocked"),
        }
    }
}

/// A wallet holding one actor's balance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub id: WalletId,
    pub owner_id: ActorId,
    /// Never negative
    pub balance: Money,
    pub status: WalletStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    /// Opens a new active wallet with a zero balance
    pub fn open(owner_id: ActorId, currency: Currency) -> Self {
        let now = Utc::now();
        Self {
            id: WalletId::new_v7(),
            owner_id,
            balance: Money::zero(currency),
            status: WalletStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == WalletStatus::Active
    }

    /// Fails with `WalletBlocked` unless the wallet is active
    pub fn ensure_active(&self) -> Result<(), LedgerError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(LedgerError::WalletBlocked(self.id))
        }
    }

    /// Fails with `InsufficientFunds` unless the balance covers `amount`
    pub fn ensure_covers(&self, amount: &Money) -> Result<(), LedgerError> {
        if self.balance.covers(amount)? {
            Ok(())
        } else {
            Err(LedgerError::InsufficientFunds {
                wallet: self.id,
                available: self.balance.amount(),
                requested: amount.amount(),
            })
        }
    }
}
