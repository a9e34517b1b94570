//! Ledger engine
//!
//! Every balance-changing operation runs inside exactly one unit of work:
//! actors are loaded, the touched wallets are freshly read and locked in
//! ascending id order, fees are computed from the rates pinned on the
//! actors, balances move through the store's atomic increment, and the
//! matching ledger entries are appended. The unit of work commits only if
//! every step succeeded; any error rolls all of it back.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument, warn};

use core_kernel::{ActorId, Currency, Money, WalletId};

use crate::actor::{is_valid_phone, Actor, ApprovalStatus, NewAccount, Role};
use crate::admin::{AdminFloat, DEFAULT_ADMIN_CACHE_TTL};
use crate::error::LedgerError;
use crate::fee::{compute_agent_commission, compute_cash_out_fee, FeeSchedule};
use crate::ports::{LedgerStore, UnitOfWork};
use crate::query::{Page, Pagination, TransactionQuery};
use crate::stats::{DashboardStats, TransactionSummary, VolumeStats, WalletStatistics};
use crate::transaction::{NewTransaction, Transaction, TransactionKind};
use crate::wallet::{Wallet, WalletStatus};

/// Largest amount a single movement may carry
pub const MAX_AMOUNT: Decimal = dec!(1000000000000);

/// Engine configuration
#[derive(Debug, Clone)]
pub struct LedgerSettings {
    pub fees: FeeSchedule,
    /// Restrict peer transfers to user-to-user
    pub peer_transfer_users_only: bool,
    pub admin_cache_ttl: Duration,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            fees: FeeSchedule::default(),
            peer_transfer_users_only: true,
            admin_cache_ttl: DEFAULT_ADMIN_CACHE_TTL,
        }
    }
}

/// Entries written and final balances of every wallet an operation touched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerReceipt {
    pub entries: Vec<Transaction>,
    pub balances: Vec<Wallet>,
}

impl LedgerReceipt {
    pub fn balance_of(&self, wallet: WalletId) -> Option<Money> {
        self.balances
            .iter()
            .find(|w| w.id == wallet)
            .map(|w| w.balance)
    }

    pub fn entries_of(&self, kind: TransactionKind) -> impl Iterator<Item = &Transaction> {
        self.entries.iter().filter(move |e| e.kind == kind)
    }
}

/// Result of registering a new account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub actor: Actor,
    pub receipt: LedgerReceipt,
}

/// A money movement between two actors
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub from: ActorId,
    pub to: ActorId,
    pub amount: Decimal,
    pub initiated_by: ActorId,
    pub note: Option<String>,
}

impl TransferRequest {
    /// Creates a transfer initiated by the paying side
    pub fn new(from: ActorId, to: ActorId, amount: Decimal) -> Self {
        Self {
            from,
            to,
            amount,
            initiated_by: from,
            note: None,
        }
    }

    pub fn initiated_by(mut self, actor: ActorId) -> Self {
        self.initiated_by = actor;
        self
    }

    pub fn with_note(mut self, note: Option<String>) -> Self {
        self.note = note;
        self
    }
}

/// Administrator account created by `seed_admin`
#[derive(Debug, Clone)]
pub struct AdminAccount {
    pub name: String,
    pub phone: String,
}

#[derive(Debug, Default)]
struct Postings {
    entries: Vec<Transaction>,
    balances: Vec<Wallet>,
}

impl Postings {
    fn touch(&mut self, wallet: Wallet) {
        match self.balances.iter_mut().find(|w| w.id == wallet.id) {
            Some(slot) => *slot = wallet,
            None => self.balances.push(wallet),
        }
    }

    async fn record(
        &mut self,
        uow: &mut dyn UnitOfWork,
        entry: NewTransaction,
    ) -> Result<(), LedgerError> {
        let written = uow.append(entry).await?;
        self.entries.push(written);
        Ok(())
    }

    fn into_receipt(self) -> LedgerReceipt {
        LedgerReceipt {
            entries: self.entries,
            balances: self.balances,
        }
    }
}

fn pick(wallets: &[Wallet], id: WalletId) -> Result<&Wallet, LedgerError> {
    wallets
        .iter()
        .find(|w| w.id == id)
        .ok_or_else(|| LedgerError::wallet_not_found(id))
}

fn admin_short(available: &Money, requested: &Money) -> LedgerError {
    LedgerError::InsufficientAdminFloat {
        available: available.amount(),
        requested: requested.amount(),
    }
}

/// The transactional ledger core
pub struct LedgerEngine {
    store: Arc<dyn LedgerStore>,
    admin: AdminFloat,
    settings: LedgerSettings,
}

impl LedgerEngine {
    pub fn new(
        store: Arc<dyn LedgerStore>,
        admin_email: impl Into<String>,
        settings: LedgerSettings,
    ) -> Self {
        let admin = AdminFloat::new(admin_email, settings.admin_cache_ttl);
        Self::with_admin_float(store, admin, settings)
    }

    pub fn with_admin_float(
        store: Arc<dyn LedgerStore>,
        admin: AdminFloat,
        settings: LedgerSettings,
    ) -> Self {
        Self {
            store,
            admin,
            settings,
        }
    }

    pub fn store(&self) -> &Arc<dyn LedgerStore> {
        &self.store
    }

    pub fn settings(&self) -> &LedgerSettings {
        &self.settings
    }

    pub fn admin_float(&self) -> &AdminFloat {
        &self.admin
    }

    pub fn currency(&self) -> Currency {
        self.settings.fees.currency
    }

    // ========================================================================
    // Account lifecycle
    // ========================================================================

    /// Creates the admin actor and its funded float, or returns the existing admin
    #[instrument(skip(self, account))]
    pub async fn seed_admin(&self, account: AdminAccount) -> Result<Actor, LedgerError> {
        if !is_valid_phone(&account.phone) {
            return Err(LedgerError::validation(format!(
                "invalid admin phone number: {}",
                account.phone
            )));
        }

        let mut uow = self.store.begin().await?;
        let result = self.seed_admin_in(&mut *uow, account).await;
        let (admin, created) = self.complete("seed_admin", uow, result).await?;

        if created {
            info!(actor_id = %admin.id, wallet_id = %admin.wallet_id, "Admin account seeded");
        } else {
            info!(actor_id = %admin.id, "Admin account already exists");
        }
        Ok(admin)
    }

    async fn seed_admin_in(
        &self,
        uow: &mut dyn UnitOfWork,
        account: AdminAccount,
    ) -> Result<(Actor, bool), LedgerError> {
        let email = self.admin.admin_email().to_string();
        if let Some(existing) = uow.find_actor_by_email(&email).await? {
            if existing.is_admin() {
                return Ok((existing, false));
            }
            return Err(LedgerError::DuplicateAccount(format!(
                "admin email {} belongs to a non-admin account",
                email
            )));
        }
        if uow.find_actor_by_phone(&account.phone).await?.is_some() {
            return Err(LedgerError::DuplicateAccount(format!(
                "phone {} is already registered",
                account.phone
            )));
        }

        let (admin, wallet) = self.new_actor(account.name, email, account.phone, Role::Admin);
        uow.insert_actor(&admin).await?;
        uow.insert_wallet(&wallet).await?;

        let float = self.settings.fees.admin_float();
        if float.is_positive() {
            let funded = uow.increment_balance(wallet.id, float).await?;
            uow.append(
                NewTransaction::new(
                    TransactionKind::InitialFunding,
                    float,
                    wallet.id,
                    admin.id,
                    funded.balance,
                )
                .to_wallet(wallet.id)
                .with_note(Some("admin float".to_string())),
            )
            .await?;
        }
        Ok((admin, true))
    }

    /// Registers a user or agent and funds its new wallet from the admin float
    ///
    /// If the admin float cannot cover the initial funding, nothing is
    /// created.
    #[instrument(skip(self, request), fields(role = %request.role))]
    pub async fn register_account(&self, request: NewAccount) -> Result<Registration, LedgerError> {
        request.check()?;

        let mut uow = self.store.begin().await?;
        let result = self.register_in(&mut *uow, request).await;
        let registration = self.complete("register_account", uow, result).await?;

        info!(
            actor_id = %registration.actor.id,
            wallet_id = %registration.actor.wallet_id,
            role = %registration.actor.role,
            "Account registered"
        );
        Ok(registration)
    }

    async fn register_in(
        &self,
        uow: &mut dyn UnitOfWork,
        request: NewAccount,
    ) -> Result<Registration, LedgerError> {
        if uow.find_actor_by_email(&request.email).await?.is_some() {
            return Err(LedgerError::DuplicateAccount(format!(
                "email {} is already registered",
                request.email
            )));
        }
        if uow.find_actor_by_phone(&request.phone).await?.is_some() {
            return Err(LedgerError::DuplicateAccount(format!(
                "phone {} is already registered",
                request.phone
            )));
        }

        let (actor, wallet) = self.new_actor(request.name, request.email, request.phone, request.role);
        uow.insert_actor(&actor).await?;
        uow.insert_wallet(&wallet).await?;

        let mut postings = Postings::default();
        postings.touch(wallet.clone());

        let funding = self.settings.fees.initial_funding();
        if funding.is_positive() {
            self.fund_in(uow, wallet.id, funding, &mut postings).await?;
        }

        Ok(Registration {
            actor,
            receipt: postings.into_receipt(),
        })
    }

    fn new_actor(&self, name: String, email: String, phone: String, role: Role) -> (Actor, Wallet) {
        let id = ActorId::new_v7();
        let wallet = Wallet::open(id, self.currency());
        let rates = self.settings.fees.rates_for(role);
        let actor = Actor {
            id,
            name,
            email,
            phone,
            role,
            approval: match role {
                Role::Agent => ApprovalStatus::Pending,
                Role::User | Role::Admin => ApprovalStatus::Approved,
            },
            fee_rate: rates.fee_rate,
            commission_rate: rates.commission_rate,
            wallet_id: wallet.id,
            created_at: Utc::now(),
        };
        (actor, wallet)
    }

    // ========================================================================
    // Money movements
    // ========================================================================

    /// Moves `amount` from the admin float into `target`
    #[instrument(skip(self), fields(wallet_id = %target))]
    pub async fn initial_funding(
        &self,
        target: WalletId,
        amount: Decimal,
    ) -> Result<LedgerReceipt, LedgerError> {
        let amount = self.positive_amount(amount)?;

        let mut uow = self.store.begin().await?;
        let mut postings = Postings::default();
        let result = self
            .fund_in(&mut *uow, target, amount, &mut postings)
            .await
            .map(|_| postings.into_receipt());
        let receipt = self.complete("initial_funding", uow, result).await?;

        info!(wallet_id = %target, amount = %amount.amount(), "Initial funding committed");
        Ok(receipt)
    }

    async fn fund_in(
        &self,
        uow: &mut dyn UnitOfWork,
        target: WalletId,
        amount: Money,
        postings: &mut Postings,
    ) -> Result<(), LedgerError> {
        let (admin, wallets) = self.admin.resolve(uow, &[target]).await?;
        if admin.id == target {
            return Err(LedgerError::SameWallet);
        }
        let admin_id = admin.id;
        let recipient = pick(&wallets, target)?;
        admin.ensure_active()?;
        recipient.ensure_active()?;
        if !admin.balance.covers(&amount)? {
            return Err(admin_short(&admin.balance, &amount));
        }

        let admin_after = self.debit_admin(uow, admin_id, amount).await?;
        let recipient_after = uow.increment_balance(target, amount).await?;

        postings
            .record(
                uow,
                NewTransaction::new(
                    TransactionKind::InitialFunding,
                    amount,
                    admin_id,
                    admin_after.owner_id,
                    admin_after.balance,
                )
                .from_wallet(admin_id)
                .to_wallet(target),
            )
            .await?;
        postings
            .record(
                uow,
                NewTransaction::new(
                    TransactionKind::ReceiveMoney,
                    amount,
                    target,
                    admin_after.owner_id,
                    recipient_after.balance,
                )
                .from_wallet(admin_id)
                .to_wallet(target),
            )
            .await?;

        postings.touch(admin_after);
        postings.touch(recipient_after);
        Ok(())
    }

    /// Credits an actor's wallet from an external source
    #[instrument(skip(self, note), fields(actor_id = %actor))]
    pub async fn top_up(
        &self,
        actor: ActorId,
        amount: Decimal,
        note: Option<String>,
    ) -> Result<LedgerReceipt, LedgerError> {
        let amount = self.positive_amount(amount)?;

        let mut uow = self.store.begin().await?;
        let result = self.top_up_in(&mut *uow, actor, amount, note).await;
        let receipt = self.complete("top_up", uow, result).await?;

        info!(actor_id = %actor, amount = %amount.amount(), "Top-up committed");
        Ok(receipt)
    }

    async fn top_up_in(
        &self,
        uow: &mut dyn UnitOfWork,
        actor: ActorId,
        amount: Money,
        note: Option<String>,
    ) -> Result<LedgerReceipt, LedgerError> {
        let owner = self.load_actor(uow, actor).await?;
        let wallets = uow.lock_wallets(&[owner.wallet_id]).await?;
        pick(&wallets, owner.wallet_id)?.ensure_active()?;

        let after = uow.increment_balance(owner.wallet_id, amount).await?;

        let mut postings = Postings::default();
        postings
            .record(
                uow,
                NewTransaction::new(
                    TransactionKind::AddMoney,
                    amount,
                    owner.wallet_id,
                    actor,
                    after.balance,
                )
                .to_wallet(owner.wallet_id)
                .with_note(note),
            )
            .await?;
        postings.touch(after);
        Ok(postings.into_receipt())
    }

    /// Debits an actor's wallet to an external destination
    #[instrument(skip(self, note), fields(actor_id = %actor))]
    pub async fn withdraw(
        &self,
        actor: ActorId,
        amount: Decimal,
        note: Option<String>,
    ) -> Result<LedgerReceipt, LedgerError> {
        let amount = self.positive_amount(amount)?;

        let mut uow = self.store.begin().await?;
        let result = self.withdraw_in(&mut *uow, actor, amount, note).await;
        let receipt = self.complete("withdraw", uow, result).await?;

        info!(actor_id = %actor, amount = %amount.amount(), "Withdrawal committed");
        Ok(receipt)
    }

    async fn withdraw_in(
        &self,
        uow: &mut dyn UnitOfWork,
        actor: ActorId,
        amount: Money,
        note: Option<String>,
    ) -> Result<LedgerReceipt, LedgerError> {
        let owner = self.load_actor(uow, actor).await?;
        let wallets = uow.lock_wallets(&[owner.wallet_id]).await?;
        let wallet = pick(&wallets, owner.wallet_id)?;
        wallet.ensure_active()?;
        wallet.ensure_covers(&amount)?;

        let after = uow.increment_balance(owner.wallet_id, -amount).await?;

        let mut postings = Postings::default();
        postings
            .record(
                uow,
                NewTransaction::new(
                    TransactionKind::Withdraw,
                    amount,
                    owner.wallet_id,
                    actor,
                    after.balance,
                )
                .from_wallet(owner.wallet_id)
                .with_note(note),
            )
            .await?;
        postings.touch(after);
        Ok(postings.into_receipt())
    }

    /// Peer transfer from `request.from` to `request.to`
    #[instrument(skip(self, request), fields(sender = %request.from, receiver = %request.to))]
    pub async fn send_money(&self, request: TransferRequest) -> Result<LedgerReceipt, LedgerError> {
        let amount = self.positive_amount(request.amount)?;
        if request.from == request.to {
            return Err(LedgerError::SameWallet);
        }

        let mut uow = self.store.begin().await?;
        let result = self.send_in(&mut *uow, &request, amount).await;
        let receipt = self.complete("send_money", uow, result).await?;

        info!(
            sender = %request.from,
            receiver = %request.to,
            amount = %amount.amount(),
            "Send money committed"
        );
        Ok(receipt)
    }

    async fn send_in(
        &self,
        uow: &mut dyn UnitOfWork,
        request: &TransferRequest,
        amount: Money,
    ) -> Result<LedgerReceipt, LedgerError> {
        let sender = self.load_actor(uow, request.from).await?;
        let receiver = self.load_actor(uow, request.to).await?;
        if sender.wallet_id == receiver.wallet_id {
            return Err(LedgerError::SameWallet);
        }
        if self.settings.peer_transfer_users_only {
            sender.ensure_role(Role::User)?;
            receiver.ensure_role(Role::User)?;
        }

        let wallets = uow
            .lock_wallets(&[sender.wallet_id, receiver.wallet_id])
            .await?;
        let from = pick(&wallets, sender.wallet_id)?;
        let to = pick(&wallets, receiver.wallet_id)?;
        from.ensure_active()?;
        to.ensure_active()?;
        from.ensure_covers(&amount)?;

        let from_after = uow.increment_balance(sender.wallet_id, -amount).await?;
        let to_after = uow.increment_balance(receiver.wallet_id, amount).await?;

        let mut postings = Postings::default();
        postings
            .record(
                uow,
                NewTransaction::new(
                    TransactionKind::SendMoney,
                    amount,
                    sender.wallet_id,
                    request.initiated_by,
                    from_after.balance,
                )
                .from_wallet(sender.wallet_id)
                .to_wallet(receiver.wallet_id)
                .with_note(request.note.clone()),
            )
            .await?;
        postings
            .record(
                uow,
                NewTransaction::new(
                    TransactionKind::ReceiveMoney,
                    amount,
                    receiver.wallet_id,
                    request.initiated_by,
                    to_after.balance,
                )
                .from_wallet(sender.wallet_id)
                .to_wallet(receiver.wallet_id)
                .with_note(request.note.clone()),
            )
            .await?;
        postings.touch(from_after);
        postings.touch(to_after);
        Ok(postings.into_receipt())
    }

    /// Agent hands cash to the system on behalf of a user
    ///
    /// `request.from` is the agent, `request.to` the user. The agent's
    /// commission is paid from the admin float.
    #[instrument(skip(self, request), fields(agent = %request.from, user = %request.to))]
    pub async fn cash_in(&self, request: TransferRequest) -> Result<LedgerReceipt, LedgerError> {
        let amount = self.positive_amount(request.amount)?;
        if request.from == request.to {
            return Err(LedgerError::SameWallet);
        }

        let mut uow = self.store.begin().await?;
        let result = self.cash_in_in(&mut *uow, &request, amount).await;
        let receipt = self.complete("cash_in", uow, result).await?;

        info!(
            agent = %request.from,
            user = %request.to,
            amount = %amount.amount(),
            "Cash-in committed"
        );
        Ok(receipt)
    }

    async fn cash_in_in(
        &self,
        uow: &mut dyn UnitOfWork,
        request: &TransferRequest,
        amount: Money,
    ) -> Result<LedgerReceipt, LedgerError> {
        let agent = self.load_actor(uow, request.from).await?;
        let user = self.load_actor(uow, request.to).await?;
        agent.ensure_transacting_agent()?;
        user.ensure_role(Role::User)?;

        let commission = compute_agent_commission(&amount, agent.commission_rate)?;
        let ids = [agent.wallet_id, user.wallet_id];
        let (admin, wallets) = if commission.is_positive() {
            let (admin, wallets) = self.admin.resolve(uow, &ids).await?;
            (Some(admin), wallets)
        } else {
            (None, uow.lock_wallets(&ids).await?)
        };
        let admin_id = admin.as_ref().map(|w| w.id);

        let agent_wallet = pick(&wallets, agent.wallet_id)?;
        let user_wallet = pick(&wallets, user.wallet_id)?;
        agent_wallet.ensure_active()?;
        user_wallet.ensure_active()?;
        agent_wallet.ensure_covers(&amount)?;
        if let Some(admin) = &admin {
            admin.ensure_active()?;
            if !admin.balance.covers(&commission)? {
                return Err(admin_short(&admin.balance, &commission));
            }
        }

        let agent_after = uow.increment_balance(agent.wallet_id, -amount).await?;
        let user_after = uow.increment_balance(user.wallet_id, amount).await?;

        let mut postings = Postings::default();
        postings
            .record(
                uow,
                NewTransaction::new(
                    TransactionKind::CashIn,
                    amount,
                    agent.wallet_id,
                    request.initiated_by,
                    agent_after.balance,
                )
                .from_wallet(agent.wallet_id)
                .to_wallet(user.wallet_id)
                .with_commission(commission)
                .with_note(request.note.clone()),
            )
            .await?;
        postings
            .record(
                uow,
                NewTransaction::new(
                    TransactionKind::ReceiveMoney,
                    amount,
                    user.wallet_id,
                    request.initiated_by,
                    user_after.balance,
                )
                .from_wallet(agent.wallet_id)
                .to_wallet(user.wallet_id)
                .with_note(request.note.clone()),
            )
            .await?;
        postings.touch(agent_after);
        postings.touch(user_after);

        if let Some(admin_id) = admin_id {
            let admin_after = self.debit_admin(uow, admin_id, commission).await?;
            let agent_paid = uow.increment_balance(agent.wallet_id, commission).await?;
            postings
                .record(
                    uow,
                    NewTransaction::new(
                        TransactionKind::Commission,
                        commission,
                        agent.wallet_id,
                        request.initiated_by,
                        agent_paid.balance,
                    )
                    .from_wallet(admin_id)
                    .to_wallet(agent.wallet_id),
                )
                .await?;
            postings.touch(admin_after);
            postings.touch(agent_paid);
        }

        Ok(postings.into_receipt())
    }

    /// User takes cash out through an agent
    ///
    /// `request.from` is the user, `request.to` the agent. The user pays
    /// `amount + fee`, the agent receives `amount` and the fee goes to the
    /// admin float.
    #[instrument(skip(self, request), fields(user = %request.from, agent = %request.to))]
    pub async fn cash_out(&self, request: TransferRequest) -> Result<LedgerReceipt, LedgerError> {
        let amount = self.positive_amount(request.amount)?;
        if request.from == request.to {
            return Err(LedgerError::SameWallet);
        }

        let mut uow = self.store.begin().await?;
        let result = self.cash_out_in(&mut *uow, &request, amount).await;
        let receipt = self.complete("cash_out", uow, result).await?;

        info!(
            user = %request.from,
            agent = %request.to,
            amount = %amount.amount(),
            "Cash-out committed"
        );
        Ok(receipt)
    }

    async fn cash_out_in(
        &self,
        uow: &mut dyn UnitOfWork,
        request: &TransferRequest,
        amount: Money,
    ) -> Result<LedgerReceipt, LedgerError> {
        let user = self.load_actor(uow, request.from).await?;
        let agent = self.load_actor(uow, request.to).await?;
        user.ensure_role(Role::User)?;
        agent.ensure_transacting_agent()?;

        let fee = compute_cash_out_fee(&amount, user.fee_rate)?;
        let total = amount.checked_add(&fee)?;
        let ids = [user.wallet_id, agent.wallet_id];
        let (admin, wallets) = if fee.is_positive() {
            let (admin, wallets) = self.admin.resolve(uow, &ids).await?;
            (Some(admin), wallets)
        } else {
            (None, uow.lock_wallets(&ids).await?)
        };
        let admin_id = admin.as_ref().map(|w| w.id);

        let user_wallet = pick(&wallets, user.wallet_id)?;
        let agent_wallet = pick(&wallets, agent.wallet_id)?;
        user_wallet.ensure_active()?;
        agent_wallet.ensure_active()?;
        if let Some(admin) = &admin {
            admin.ensure_active()?;
        }
        user_wallet.ensure_covers(&total)?;

        let user_after = uow.increment_balance(user.wallet_id, -total).await?;
        let agent_after = uow.increment_balance(agent.wallet_id, amount).await?;

        let mut postings = Postings::default();
        postings
            .record(
                uow,
                NewTransaction::new(
                    TransactionKind::CashOut,
                    amount,
                    user.wallet_id,
                    request.initiated_by,
                    user_after.balance,
                )
                .from_wallet(user.wallet_id)
                .to_wallet(agent.wallet_id)
                .with_fee(fee)
                .with_note(request.note.clone()),
            )
            .await?;
        postings
            .record(
                uow,
                NewTransaction::new(
                    TransactionKind::ReceiveMoney,
                    amount,
                    agent.wallet_id,
                    request.initiated_by,
                    agent_after.balance,
                )
                .from_wallet(user.wallet_id)
                .to_wallet(agent.wallet_id)
                .with_note(request.note.clone()),
            )
            .await?;
        postings.touch(user_after);
        postings.touch(agent_after);

        if let Some(admin_id) = admin_id {
            let admin_after = uow.increment_balance(admin_id, fee).await?;
            postings
                .record(
                    uow,
                    NewTransaction::new(
                        TransactionKind::Fee,
                        fee,
                        admin_id,
                        request.initiated_by,
                        admin_after.balance,
                    )
                    .from_wallet(user.wallet_id)
                    .to_wallet(admin_id),
                )
                .await?;
            postings.touch(admin_after);
        }

        Ok(postings.into_receipt())
    }

    // ========================================================================
    // Administrative transitions
    // ========================================================================

    #[instrument(skip(self), fields(agent = %agent))]
    pub async fn approve_agent(&self, agent: ActorId) -> Result<Actor, LedgerError> {
        self.transition_agent("approve_agent", agent, ApprovalStatus::Approved)
            .await
    }

    #[instrument(skip(self), fields(agent = %agent))]
    pub async fn suspend_agent(&self, agent: ActorId) -> Result<Actor, LedgerError> {
        self.transition_agent("suspend_agent", agent, ApprovalStatus::Suspended)
            .await
    }

    async fn transition_agent(
        &self,
        operation: &'static str,
        agent: ActorId,
        approval: ApprovalStatus,
    ) -> Result<Actor, LedgerError> {
        let mut uow = self.store.begin().await?;
        let result = self.transition_agent_in(&mut *uow, agent, approval).await;
        let updated = self.complete(operation, uow, result).await?;

        info!(agent = %agent, approval = %updated.approval, "Agent approval changed");
        Ok(updated)
    }

    async fn transition_agent_in(
        &self,
        uow: &mut dyn UnitOfWork,
        agent: ActorId,
        approval: ApprovalStatus,
    ) -> Result<Actor, LedgerError> {
        let actor = self.load_actor(uow, agent).await?;
        actor.ensure_role(Role::Agent)?;
        if actor.approval == approval {
            return Err(LedgerError::already_in_state(format!(
                "agent {} is already {}",
                agent, approval
            )));
        }
        uow.set_approval(agent, approval).await
    }

    #[instrument(skip(self), fields(wallet_id = %wallet))]
    pub async fn block_wallet(&self, wallet: WalletId) -> Result<Wallet, LedgerError> {
        self.transition_wallet("block_wallet", wallet, WalletStatus::Blocked)
            .await
    }

    #[instrument(skip(self), fields(wallet_id = %wallet))]
    pub async fn unblock_wallet(&self, wallet: WalletId) -> Result<Wallet, LedgerError> {
        self.transition_wallet("unblock_wallet", wallet, WalletStatus::Active)
            .await
    }

    async fn transition_wallet(
        &self,
        operation: &'static str,
        wallet: WalletId,
        status: WalletStatus,
    ) -> Result<Wallet, LedgerError> {
        let mut uow = self.store.begin().await?;
        let result = self.transition_wallet_in(&mut *uow, wallet, status).await;
        let updated = self.complete(operation, uow, result).await?;

        info!(wallet_id = %wallet, status = %updated.status, "Wallet status changed");
        Ok(updated)
    }

    async fn transition_wallet_in(
        &self,
        uow: &mut dyn UnitOfWork,
        wallet: WalletId,
        status: WalletStatus,
    ) -> Result<Wallet, LedgerError> {
        let wallets = uow.lock_wallets(&[wallet]).await?;
        if pick(&wallets, wallet)?.status == status {
            return Err(LedgerError::already_in_state(format!(
                "wallet {} is already {}",
                wallet, status
            )));
        }
        uow.set_wallet_status(wallet, status).await
    }

    // ========================================================================
    // Reads
    // ========================================================================

    pub async fn actor(&self, id: ActorId) -> Result<Actor, LedgerError> {
        self.store.lookup_actor(id).await
    }

    pub async fn actor_by_phone(&self, phone: &str) -> Result<Actor, LedgerError> {
        self.store
            .find_by_phone(phone)
            .await?
            .ok_or_else(|| LedgerError::actor_not_found(phone))
    }

    pub async fn wallet(&self, id: WalletId) -> Result<Wallet, LedgerError> {
        self.store.wallet(id).await
    }

    pub async fn wallet_of(&self, actor: ActorId) -> Result<Wallet, LedgerError> {
        self.store.wallet_by_owner(actor).await
    }

    pub async fn admin_wallet(&self) -> Result<Wallet, LedgerError> {
        self.admin.wallet(self.store.as_ref()).await
    }

    pub async fn list_wallets(&self, pagination: Pagination) -> Result<Page<Wallet>, LedgerError> {
        self.store.list_wallets(pagination).await
    }

    /// Transaction history of one actor's wallet
    ///
    /// Any wallet filter already on `query` is replaced.
    pub async fn history(
        &self,
        actor: ActorId,
        query: TransactionQuery,
    ) -> Result<Page<Transaction>, LedgerError> {
        let owner = self.actor(actor).await?;
        let query = TransactionQuery {
            wallets: vec![owner.wallet_id],
            ..query
        };
        self.store.query(&query).await
    }

    pub async fn transactions(&self, query: &TransactionQuery) -> Result<Page<Transaction>, LedgerError> {
        self.store.query(query).await
    }

    pub async fn summary(&self) -> Result<TransactionSummary, LedgerError> {
        self.store.summary(None).await
    }

    pub async fn wallet_statistics(&self) -> Result<WalletStatistics, LedgerError> {
        self.store.wallet_statistics().await
    }

    pub async fn agents(&self, pagination: Pagination) -> Result<Page<Actor>, LedgerError> {
        self.store.list_by_role(Role::Agent, pagination).await
    }

    pub async fn dashboard(&self, actor: ActorId) -> Result<DashboardStats, LedgerError> {
        let wallet = self.wallet_of(actor).await?;
        Ok(DashboardStats {
            wallet_balance: wallet.balance.amount(),
            total_users: self.store.count_by_role(Role::User).await?,
            total_agents: self.store.count_by_role(Role::Agent).await?,
            total_transactions: self.store.count().await?,
        })
    }

    /// Volume on the actor's wallet over the trailing 7 and 30 days
    pub async fn volume(&self, actor: ActorId) -> Result<VolumeStats, LedgerError> {
        let owner = self.actor(actor).await?;
        let now = Utc::now();
        Ok(VolumeStats {
            last_7_days: self
                .store
                .wallet_volume(owner.wallet_id, now - chrono::Duration::days(7))
                .await?,
            last_30_days: self
                .store
                .wallet_volume(owner.wallet_id, now - chrono::Duration::days(30))
                .await?,
        })
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn positive_amount(&self, amount: Decimal) -> Result<Money, LedgerError> {
        let money = Money::new(amount, self.currency());
        if !money.is_positive() {
            return Err(LedgerError::InvalidAmount(format!(
                "amount must be greater than 0, got {}",
                amount
            )));
        }
        if amount > MAX_AMOUNT {
            return Err(LedgerError::InvalidAmount(format!(
                "amount must not exceed {}, got {}",
                MAX_AMOUNT, amount
            )));
        }
        if money.amount() != amount || !money.is_minor_unit_exact() {
            return Err(LedgerError::InvalidAmount(format!(
                "{} has more precision than {} allows",
                amount,
                self.currency()
            )));
        }
        Ok(money)
    }

    async fn load_actor(&self, uow: &mut dyn UnitOfWork, id: ActorId) -> Result<Actor, LedgerError> {
        uow.find_actor(id)
            .await?
            .ok_or_else(|| LedgerError::actor_not_found(id))
    }

    async fn debit_admin(
        &self,
        uow: &mut dyn UnitOfWork,
        admin: WalletId,
        amount: Money,
    ) -> Result<Wallet, LedgerError> {
        uow.increment_balance(admin, -amount)
            .await
            .map_err(|e| match e {
                LedgerError::InsufficientFunds {
                    available,
                    requested,
                    ..
                } => LedgerError::InsufficientAdminFloat {
                    available,
                    requested,
                },
                other => other,
            })
    }

    /// Commits on success, rolls back on failure
    async fn complete<T>(
        &self,
        operation: &'static str,
        uow: Box<dyn UnitOfWork>,
        result: Result<T, LedgerError>,
    ) -> Result<T, LedgerError> {
        match result {
            Ok(value) => {
                uow.commit().await?;
                Ok(value)
            }
            Err(e) => {
                warn!(operation, code = e.code(), error = %e, "Ledger operation rejected");
                if let Err(rollback) = uow.rollback().await {
                    error!(operation, error = %rollback, "Rollback failed");
                }
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for LedgerEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerEngine")
            .field("admin", &self.admin)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
