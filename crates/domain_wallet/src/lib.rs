//! Wallet Ledger Domain
//!
//! The transactional core of the digital wallet. Users, agents and the admin
//! float each hold one wallet; money moves between wallets through
//! registration funding, top-up, withdrawal, peer transfer, cash-in and
//! cash-out. Each movement mutates several balances and appends the matching
//! ledger entries as one atomic unit of work.
//!
//! # Components
//!
//! - **Wallet Store** ([`ports::WalletStore`], [`ports::UnitOfWork`]): wallet
//!   records and the atomic balance increment
//! - **Transaction Log** ([`ports::TransactionLog`]): append-only entries,
//!   filtered history and aggregates
//! - **Fee/Commission Policy** ([`fee`]): per-mille rates pinned per actor
//! - **Ledger Engine** ([`engine::LedgerEngine`]): one unit of work per operation
//! - **Admin Float Manager** ([`admin::AdminFloat`]): per-operation admin
//!   wallet resolution
//!
//! # Examples
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use domain_wallet::{InMemoryLedgerStore, LedgerEngine, LedgerSettings, TransferRequest};
//!
//! let engine = LedgerEngine::new(
//!     Arc::new(InMemoryLedgerStore::new()),
//!     "admin@wallet.local",
//!     LedgerSettings::default(),
//! );
//! let receipt = engine.send_money(TransferRequest::new(alice, bob, dec!(250))).await?;
//! ```

pub mod actor;
pub mod admin;
pub mod engine;
pub mod error;
pub mod fee;
pub mod memory;
pub mod ports;
pub mod query;
pub mod stats;
pub mod transaction;
pub mod wallet;

pub use actor::{Actor, ApprovalStatus, NewAccount, Role};
pub use admin::AdminFloat;
pub use engine::{
    AdminAccount, LedgerEngine, LedgerReceipt, LedgerSettings, Registration, TransferRequest,
    MAX_AMOUNT,
};
pub use error::LedgerError;
pub use fee::{compute_agent_commission, compute_cash_out_fee, ActorRates, FeeSchedule};
pub use memory::InMemoryLedgerStore;
pub use ports::{AccountDirectory, LedgerStore, TransactionLog, UnitOfWork, WalletStore};
pub use query::{Page, PageMeta, Pagination, SortOrder, TransactionQuery};
pub use stats::{DashboardStats, TransactionSummary, VolumeStats, WalletStatistics};
pub use transaction::{NewTransaction, Transaction, TransactionKind, TransactionStatus};
pub use wallet::{Wallet, WalletStatus};
