//! Repositories for the ledger tables
//!
//! Each repository is a set of free functions over a `PgConnection`, so the
//! same query runs on a pooled connection or inside an open transaction.
//! Statements are built at runtime with `sqlx::query_as` and `QueryBuilder`.

pub mod actors;
pub mod transactions;
pub mod wallets;

pub use actors::ActorRow;
pub use transactions::{NewTransactionRow, TransactionFilter, TransactionRow};
pub use wallets::WalletRow;
