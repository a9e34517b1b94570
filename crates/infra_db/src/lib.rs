//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the wallet ledger, built on SQLx.
//!
//! # Architecture
//!
//! - [`pool`]: connection pool configuration and embedded migrations
//! - [`repositories`]: SQL for the `actors`, `wallets` and
//!   `ledger_transactions` tables
//! - [`adapters`]: [`PostgresLedgerStore`], the `LedgerStore` implementation
//!   the ledger engine runs against
//!
//! Balance safety does not depend on the engine alone: wallet balances carry
//! a `CHECK (balance >= 0)` constraint and debits are conditional updates.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresLedgerStore};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/wallet")).await?;
//! run_migrations(&pool).await?;
//! let store = PostgresLedgerStore::new(pool);
//! ```

pub mod adapters;
pub mod error;
pub mod pool;
pub mod repositories;

pub use adapters::{PostgresLedgerStore, PostgresUnitOfWork};
pub use error::DatabaseError;
pub use pool::{create_pool, create_pool_from_url, run_migrations, DatabaseConfig, DatabasePool};
