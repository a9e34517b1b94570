//! Wallet Ledger Ports
//!
//! The engine talks to storage only through these traits. `LedgerStore` is
//! the long-lived handle (reads plus `begin`), and `UnitOfWork` is one
//! atomic transaction: every mutation staged through it becomes visible
//! together on `commit`, and none of it survives `rollback` or drop.
//!
//! # Adapters
//!
//! - **PostgreSQL** (`infra_db::PostgresLedgerStore`): a sqlx transaction
//!   with `SELECT ... FOR UPDATE` row locks and conditional balance updates.
//! - **In-memory** (`crate::memory::InMemoryLedgerStore`): a store-wide
//!   async mutex with staged writes, used by tests and local runs.
//!
//! ```rust,ignore
//! let mut uow = store.begin().await?;
//! let wallets = uow.lock_wallets(&[sender, receiver]).await?;
//! let debited = uow.increment_balance(sender, -amount).await?;
//! uow.append(entry).await?;
//! uow.commit().await?;
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use core_kernel::{ActorId, DomainPort, HealthCheckable, Money, WalletId};

use crate::actor::{Actor, ApprovalStatus, Role};
use crate::error::LedgerError;
use crate::query::{Page, Pagination, TransactionQuery};
use crate::stats::{TransactionSummary, WalletStatistics};
use crate::transaction::{NewTransaction, Transaction};
use crate::wallet::{Wallet, WalletStatus};

/// One atomic unit of work against the ledger store
#[async_trait]
pub trait UnitOfWork: Send {
    // ========================================================================
    // Accounts
    // ========================================================================

    async fn find_actor(&mut self, id: ActorId) -> Result<Option<Actor>, LedgerError>;

    async fn find_actor_by_email(&mut self, email: &str) -> Result<Option<Actor>, LedgerError>;

    async fn find_actor_by_phone(&mut self, phone: &str) -> Result<Option<Actor>, LedgerError>;

    /// Inserts an actor; `DuplicateAccount` if email or phone is taken
    async fn insert_actor(&mut self, actor: &Actor) -> Result<(), LedgerError>;

    /// Changes an actor's approval; `AlreadyInState` when unchanged
    async fn set_approval(
        &mut self,
        id: ActorId,
        approval: ApprovalStatus,
    ) -> Result<Actor, LedgerError>;

    // ========================================================================
    // Wallets
    // ========================================================================

    async fn insert_wallet(&mut self, wallet: &Wallet) -> Result<(), LedgerError>;

    /// Fresh read of the listed wallets, locked for the rest of the unit
    ///
    /// Locks are taken in ascending id order. The result is in the same
    /// order as `ids`; a missing wallet fails with `WalletNotFound`.
    async fn lock_wallets(&mut self, ids: &[WalletId]) -> Result<Vec<Wallet>, LedgerError>;

    /// Atomically adds `delta` (which may be negative) to a balance
    ///
    /// Fails with `InsufficientFunds` and changes nothing if the result
    /// would be negative.
    async fn increment_balance(
        &mut self,
        id: WalletId,
        delta: Money,
    ) -> Result<Wallet, LedgerError>;

    /// Changes a wallet's status; `AlreadyInState` when unchanged
    async fn set_wallet_status(
        &mut self,
        id: WalletId,
        status: WalletStatus,
    ) -> Result<Wallet, LedgerError>;

    // ========================================================================
    // Log
    // ========================================================================

    async fn append(&mut self, entry: NewTransaction) -> Result<Transaction, LedgerError>;

    // ========================================================================
    // Completion
    // ========================================================================

    async fn commit(self: Box<Self>) -> Result<(), LedgerError>;

    async fn rollback(self: Box<Self>) -> Result<(), LedgerError>;
}

/// Read side of the wallet store
#[async_trait]
pub trait WalletStore: Send + Sync {
    async fn wallet(&self, id: WalletId) -> Result<Wallet, LedgerError>;

    async fn wallet_by_owner(&self, owner: ActorId) -> Result<Wallet, LedgerError>;

    async fn list_wallets(&self, pagination: Pagination) -> Result<Page<Wallet>, LedgerError>;

    async fn wallet_statistics(&self) -> Result<WalletStatistics, LedgerError>;
}

/// Read side of the transaction log
#[async_trait]
pub trait TransactionLog: Send + Sync {
    async fn query(&self, query: &TransactionQuery) -> Result<Page<Transaction>, LedgerError>;

    /// Totals over entries created at or after `since` (all entries if `None`)
    async fn summary(&self, since: Option<DateTime<Utc>>) -> Result<TransactionSummary, LedgerError>;

    /// Sum of entry amounts on `wallet` created at or after `since`
    async fn wallet_volume(&self, wallet: WalletId, since: DateTime<Utc>) -> Result<Decimal, LedgerError>;

    async fn count(&self) -> Result<u64, LedgerError>;
}

/// Account lookups
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    async fn lookup_actor(&self, id: ActorId) -> Result<Actor, LedgerError>;

    async fn find_by_phone(&self, phone: &str) -> Result<Option<Actor>, LedgerError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Actor>, LedgerError>;

    async fn count_by_role(&self, role: Role) -> Result<u64, LedgerError>;

    async fn list_by_role(&self, role: Role, pagination: Pagination) -> Result<Page<Actor>, LedgerError>;
}

/// A complete ledger backing store
#[async_trait]
pub trait LedgerStore:
    DomainPort + HealthCheckable + WalletStore + TransactionLog + AccountDirectory
{
    /// Opens a new unit of work
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>, LedgerError>;
}
