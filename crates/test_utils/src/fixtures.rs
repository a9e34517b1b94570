//! Pre-built Test Fixtures
//!
//! Ready-to-use test data and a seeded in-memory ledger. Fixtures are
//! deterministic: account `n` always gets the same phone and email, so
//! tests can register several actors without collisions.

use std::sync::Arc;

use core_kernel::{Currency, Money, Rate};
use domain_wallet::{
    Actor, AdminAccount, FeeSchedule, InMemoryLedgerStore, LedgerEngine, LedgerSettings,
    NewAccount, Role,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Email the fixture ledger resolves the admin float by
pub const ADMIN_EMAIL: &str = "admin@wallet.local";

/// Phone of the seeded admin
pub const ADMIN_PHONE: &str = "01700000000";

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    pub fn bdt(amount: Decimal) -> Money {
        Money::new(amount, Currency::BDT)
    }

    pub fn bdt_100() -> Money {
        Self::bdt(dec!(100.00))
    }

    pub fn bdt_zero() -> Money {
        Money::zero(Currency::BDT)
    }

    /// Amount below the minor unit, rejected by every movement
    pub fn bdt_sub_minor() -> Decimal {
        dec!(0.001)
    }

    /// A USD amount for currency mismatch tests
    pub fn usd_100() -> Money {
        Money::new(dec!(100.00), Currency::USD)
    }
}

/// Fixture for account registration data
pub struct AccountFixtures;

impl AccountFixtures {
    /// Valid local phone number unique to `n`
    pub fn phone(n: u32) -> String {
        format!("017{:08}", n)
    }

    pub fn email(n: u32) -> String {
        format!("account{}@example.com", n)
    }

    pub fn account(n: u32, role: Role) -> NewAccount {
        NewAccount {
            name: format!("Account {}", n),
            email: Self::email(n),
            phone: Self::phone(n),
            role,
        }
    }

    pub fn user(n: u32) -> NewAccount {
        Self::account(n, Role::User)
    }

    pub fn agent(n: u32) -> NewAccount {
        Self::account(n, Role::Agent)
    }

    pub fn admin() -> AdminAccount {
        AdminAccount {
            name: "Admin".to_string(),
            phone: ADMIN_PHONE.to_string(),
        }
    }
}

/// Fixture for engine settings
pub struct SettingsFixtures;

impl SettingsFixtures {
    /// Round rates: 20‰ fees, 10‰ commission, no registration funding
    pub fn round_rates(admin_float: Decimal) -> LedgerSettings {
        LedgerSettings {
            fees: FeeSchedule {
                currency: Currency::BDT,
                user_fee_rate: Rate::per_mille(dec!(20)).unwrap(),
                agent_fee_rate: Rate::per_mille(dec!(20)).unwrap(),
                agent_commission_rate: Rate::per_mille(dec!(10)).unwrap(),
                initial_funding_amount: Decimal::ZERO,
                admin_float_amount: admin_float,
            },
            ..LedgerSettings::default()
        }
    }
}

/// An engine over a fresh in-memory store with the admin already seeded
pub struct LedgerFixture {
    pub store: Arc<InMemoryLedgerStore>,
    pub engine: Arc<LedgerEngine>,
    pub admin: Actor,
}

impl LedgerFixture {
    /// Seeds a ledger with [`SettingsFixtures::round_rates`] and a 100 000 float
    pub async fn new() -> Self {
        Self::with_settings(SettingsFixtures::round_rates(dec!(100000))).await
    }

    pub async fn with_settings(settings: LedgerSettings) -> Self {
        let store = Arc::new(InMemoryLedgerStore::new());
        let engine = Arc::new(LedgerEngine::new(store.clone(), ADMIN_EMAIL, settings));
        let admin = engine
            .seed_admin(AccountFixtures::admin())
            .await
            .expect("failed to seed admin");
        Self {
            store,
            engine,
            admin,
        }
    }

    /// Registers user `n`
    pub async fn user(&self, n: u32) -> Actor {
        self.register(AccountFixtures::user(n)).await
    }

    /// Registers agent `n` and approves it
    pub async fn approved_agent(&self, n: u32) -> Actor {
        let agent = self.register(AccountFixtures::agent(n)).await;
        self.engine
            .approve_agent(agent.id)
            .await
            .expect("failed to approve agent")
    }

    /// Registers user `n` and tops up its wallet
    pub async fn funded_user(&self, n: u32, amount: Decimal) -> Actor {
        let user = self.user(n).await;
        self.engine
            .top_up(user.id, amount, None)
            .await
            .expect("failed to top up");
        user
    }

    pub async fn register(&self, account: NewAccount) -> Actor {
        self.engine
            .register_account(account)
            .await
            .expect("failed to register account")
            .actor
    }

    pub async fn balance(&self, actor: &Actor) -> Decimal {
        self.engine
            .wallet(actor.wallet_id)
            .await
            .expect("wallet missing")
            .balance
            .amount()
    }
}
