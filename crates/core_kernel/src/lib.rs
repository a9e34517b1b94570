//! Core Kernel - Foundational types for the wallet ledger
//!
//! This crate provides the building blocks shared by every other crate:
//! - Money with precise decimal arithmetic and minor-unit truncation
//! - Per-mille rates used for fees and agent commissions
//! - Strongly-typed identifiers for actors, wallets and ledger entries
//! - Port abstractions (errors, health checks)

pub mod money;
pub mod identifiers;
pub mod ports;
pub mod error;

pub use money::{Money, Currency, MoneyError, Rate};
pub use identifiers::{ActorId, WalletId, TransactionId};
pub use ports::{PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth};
pub use error::CoreError;
