//! Test Utilities Crate
//!
//! Shared test infrastructure, fixtures, and helpers for the wallet ledger
//! test suite.
//!
//! # Modules
//!
//! - `fixtures`: Seeded in-memory ledgers and predictable test data
//! - `builders`: Builder patterns for accounts and engine settings
//! - `database`: PostgreSQL testcontainer management
//! - `assertions`: Ledger-level assertion helpers
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod database;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use database::*;
pub use assertions::*;
pub use generators::*;
