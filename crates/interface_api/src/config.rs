//! API configuration

use std::time::Duration;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;

use core_kernel::{CoreError, Currency, Rate};
use domain_wallet::{AdminAccount, FeeSchedule, LedgerSettings};

/// Where ledger state lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Postgres,
    Memory,
}

/// API configuration
///
/// Every field has a default; environment variables with the `WALLET_`
/// prefix override them (`WALLET_PORT`, `WALLET_USER_FEE_PER_MILLE`, ...).
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// JWT secret for authentication
    pub jwt_secret: String,
    /// JWT expiration in seconds
    pub jwt_expiration_secs: u64,
    pub database_url: String,
    pub log_level: String,
    pub storage: StorageBackend,

    /// Admin actor created at startup if missing
    pub admin_name: String,
    pub admin_email: String,
    pub admin_phone: String,

    /// ISO 4217 code of the ledger currency
    pub currency: String,
    pub user_fee_per_mille: Decimal,
    pub agent_fee_per_mille: Decimal,
    pub agent_commission_per_mille: Decimal,
    pub initial_funding: Decimal,
    pub admin_float: Decimal,
    /// Restrict send money to user-to-user transfers
    pub peer_transfer_users_only: bool,
    pub admin_cache_ttl_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_secs: 3600,
            database_url: "postgres://localhost/wallet".to_string(),
            log_level: "info".to_string(),
            storage: StorageBackend::Postgres,
            admin_name: "Admin".to_string(),
            admin_email: "admin@wallet.local".to_string(),
            admin_phone: "01700000000".to_string(),
            currency: "BDT".to_string(),
            user_fee_per_mille: dec!(15),
            agent_fee_per_mille: dec!(10),
            agent_commission_per_mille: dec!(10),
            initial_funding: dec!(50),
            admin_float: dec!(1000000),
            peer_transfer_users_only: true,
            admin_cache_ttl_secs: 30,
        }
    }
}

impl ApiConfig {
    /// Loads configuration from `WALLET_*` environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("WALLET"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Builds the engine settings, rejecting unknown currencies and
    /// out-of-range rates
    pub fn ledger_settings(&self) -> Result<LedgerSettings, CoreError> {
        let currency: Currency = self
            .currency
            .parse()
            .map_err(|e| CoreError::configuration(format!("currency: {}", e)))?;
        let rate = |name: &str, value: Decimal| {
            Rate::per_mille(value).map_err(|e| CoreError::configuration(format!("{}: {}", name, e)))
        };
        if self.initial_funding < Decimal::ZERO || self.admin_float < Decimal::ZERO {
            return Err(CoreError::configuration(
                "initial_funding and admin_float must not be negative",
            ));
        }

        Ok(LedgerSettings {
            fees: FeeSchedule {
                currency,
                user_fee_rate: rate("user_fee_per_mille", self.user_fee_per_mille)?,
                agent_fee_rate: rate("agent_fee_per_mille", self.agent_fee_per_mille)?,
                agent_commission_rate: rate(
                    "agent_commission_per_mille",
                    self.agent_commission_per_mille,
                )?,
                initial_funding_amount: self.initial_funding,
                admin_float_amount: self.admin_float,
            },
            peer_transfer_users_only: self.peer_transfer_users_only,
            admin_cache_ttl: Duration::from_secs(self.admin_cache_ttl_secs),
        })
    }

    pub fn admin_account(&self) -> AdminAccount {
        AdminAccount {
            name: self.admin_name.clone(),
            phone: self.admin_phone.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_are_valid() {
        let settings = ApiConfig::default().ledger_settings().unwrap();
        assert_eq!(settings.fees.currency, Currency::BDT);
        assert_eq!(settings.fees.user_fee_rate.as_per_mille(), dec!(15));
        assert_eq!(settings.admin_cache_ttl, Duration::from_secs(30));
    }

    #[test]
    fn test_out_of_range_rate_is_rejected() {
        let config = ApiConfig {
            agent_commission_per_mille: dec!(1200),
            ..ApiConfig::default()
        };
        let err = config.ledger_settings().unwrap_err();
        assert!(err.to_string().contains("agent_commission_per_mille"));
    }

    #[test]
    fn test_unknown_currency_is_rejected() {
        let config = ApiConfig {
            currency: "XYZ".to_string(),
            ..ApiConfig::default()
        };
        assert!(config.ledger_settings().is_err());
    }

    #[test]
    fn test_server_addr() {
        let config = ApiConfig {
            port: 9000,
            ..ApiConfig::default()
        };
        assert_eq!(config.server_addr(), "0.0.0.0:9000");
    }
}
