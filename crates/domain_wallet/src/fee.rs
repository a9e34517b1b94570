//! Fee and commission policy
//!
//! Pure computation. Both fees and commissions are per mille of the
//! principal and are truncated toward zero at the currency minor unit.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use core_kernel::{Currency, Money, MoneyError, Rate};

use crate::actor::Role;

/// Fee charged to a user on cash-out: `trunc(amount * fee_rate / 1000)`
pub fn compute_cash_out_fee(amount: &Money, fee_rate: Rate) -> Result<Money, MoneyError> {
    fee_rate.apply_truncated(amount)
}

/// Commission earned by an agent on cash-in: `trunc(amount * rate / 1000)`
pub fn compute_agent_commission(amount: &Money, commission_rate: Rate) -> Result<Money, MoneyError> {
    commission_rate.apply_truncated(amount)
}

/// Rates pinned on an actor at creation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorRates {
    pub fee_rate: Rate,
    pub commission_rate: Rate,
}

/// Configured fee schedule and funding amounts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSchedule {
    pub currency: Currency,
    pub user_fee_rate: Rate,
    pub agent_fee_rate: Rate,
    pub agent_commission_rate: Rate,
    /// Paid from the admin float into every newly registered wallet
    pub initial_funding_amount: Decimal,
    /// Starting balance of the admin wallet when it is first seeded
    pub admin_float_amount: Decimal,
}

impl FeeSchedule {
    /// Rates to pin on a newly created actor with `role`
    pub fn rates_for(&self, role: Role) -> ActorRates {
        match role {
            Role::Agent => ActorRates {
                fee_rate: self.agent_fee_rate,
                commission_rate: self.agent_commission_rate,
            },
            Role::User => ActorRates {
                fee_rate: self.user_fee_rate,
                commission_rate: Rate::ZERO,
            },
            Role::Admin => ActorRates {
                fee_rate: Rate::ZERO,
                commission_rate: Rate::ZERO,
            },
        }
    }

    pub fn initial_funding(&self) -> Money {
        Money::new(self.initial_funding_amount, self.currency)
    }

    pub fn admin_float(&self) -> Money {
        Money::new(self.admin_float_amount, self.currency)
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            currency: Currency::BDT,
            user_fee_rate: Rate::per_mille(dec!(15)).unwrap_or(Rate::ZERO),
            agent_fee_rate: Rate::per_mille(dec!(10)).unwrap_or(Rate::ZERO),
            agent_commission_rate: Rate::per_mille(dec!(10)).unwrap_or(Rate::ZERO),
            initial_funding_amount: dec!(50),
            admin_float_amount: dec!(1000000),
        }
    }
}
