//! Domain Adapters
//!
//! Implementations of the wallet domain's ports on top of the repository
//! layer. Adapters translate between row types and domain models; the
//! repositories only speak SQL.
//!
//! # Usage
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresLedgerStore;
//! use domain_wallet::WalletStore;
//!
//! let store = PostgresLedgerStore::new(pool);
//! let wallet = store.wallet_by_owner(actor_id).await?;
//! ```

pub mod ledger;
mod mapping;

pub use ledger::{PostgresLedgerStore, PostgresUnitOfWork};
