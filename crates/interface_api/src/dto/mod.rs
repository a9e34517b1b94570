//! Data Transfer Objects for API requests and responses

pub mod accounts;
pub mod transactions;
pub mod wallet;
