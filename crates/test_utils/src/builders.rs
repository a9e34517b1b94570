//! Test Data Builders
//!
//! Builder patterns for constructing test data with sensible defaults.
//! Tests set only the fields they care about.

use core_kernel::{Currency, Rate};
use domain_wallet::{FeeSchedule, LedgerSettings, NewAccount, Role};
use fake::faker::name::en::Name;
use fake::Fake;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::fixtures::AccountFixtures;

/// Builder for registration requests
///
/// Contact fields derive from the sequence number, so two builders with
/// different numbers never collide on phone or email. The display name is
/// random.
pub struct NewAccountBuilder {
    name: String,
    email: String,
    phone: String,
    role: Role,
}

impl NewAccountBuilder {
    /// Creates a user registration numbered `n`
    pub fn new(n: u32) -> Self {
        Self {
            name: Name().fake(),
            email: AccountFixtures::email(n),
            phone: AccountFixtures::phone(n),
            role: Role::User,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    pub fn agent(self) -> Self {
        self.with_role(Role::Agent)
    }

    pub fn build(self) -> NewAccount {
        NewAccount {
            name: self.name,
            email: self.email,
            phone: self.phone,
            role: self.role,
        }
    }
}

/// Builder for engine settings
pub struct LedgerSettingsBuilder {
    fees: FeeSchedule,
    peer_transfer_users_only: bool,
}

impl Default for LedgerSettingsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerSettingsBuilder {
    /// Starts from the default schedule in BDT
    pub fn new() -> Self {
        Self {
            fees: FeeSchedule::default(),
            peer_transfer_users_only: true,
        }
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.fees.currency = currency;
        self
    }

    /// Sets the user cash-out fee in per mille
    pub fn with_user_fee(mut self, per_mille: Decimal) -> Self {
        self.fees.user_fee_rate = Rate::per_mille(per_mille).expect("invalid rate");
        self
    }

    pub fn with_agent_fee(mut self, per_mille: Decimal) -> Self {
        self.fees.agent_fee_rate = Rate::per_mille(per_mille).expect("invalid rate");
        self
    }

    pub fn with_commission(mut self, per_mille: Decimal) -> Self {
        self.fees.agent_commission_rate = Rate::per_mille(per_mille).expect("invalid rate");
        self
    }

    pub fn with_initial_funding(mut self, amount: Decimal) -> Self {
        self.fees.initial_funding_amount = amount;
        self
    }

    pub fn with_admin_float(mut self, amount: Decimal) -> Self {
        self.fees.admin_float_amount = amount;
        self
    }

    /// Allows any non-admin pair to use send money
    pub fn relaxed_peer_transfers(mut self) -> Self {
        self.peer_transfer_users_only = false;
        self
    }

    /// Zero fees, commission and funding
    pub fn free(self) -> Self {
        self.with_user_fee(dec!(0))
            .with_agent_fee(dec!(0))
            .with_commission(dec!(0))
            .with_initial_funding(dec!(0))
    }

    pub fn build(self) -> LedgerSettings {
        LedgerSettings {
            fees: self.fees,
            peer_transfer_users_only: self.peer_transfer_users_only,
            ..LedgerSettings::default()
        }
    }
}
