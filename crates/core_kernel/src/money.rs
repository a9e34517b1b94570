//! Money types with precise decimal arithmetic
//!
//! Wallet balances, transfer amounts, fees and commissions are all `Money`.
//! Amounts are backed by `rust_decimal` so no floating-point drift can leak
//! into a balance. Fee and commission rates are expressed per mille and are
//! always truncated to the currency's minor unit, never rounded up.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Neg;
use std::str::FromStr;
use thiserror::Error;

/// Currency codes following ISO 4217
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    BDT,
    USD,
    EUR,
    GBP,
    INR,
    JPY,
}

impl Currency {
    /// Returns the number of decimal places of the minor unit
    pub fn decimal_places(&self) -> u32 {
        match self {
            Currency::JPY => 0,
            _ => 2,
        }
    }

    /// Returns the currency symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::BDT => "৳",
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::INR => "₹",
            Currency::JPY => "¥",
        }
    }

    /// Returns the ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::BDT => "BDT",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::INR => "INR",
            Currency::JPY => "JPY",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BDT" => Ok(Currency::BDT),
            "USD" => Ok(Currency::USD),
            "EUR" => Ok(Currency::EUR),
            "GBP" => Ok(Currency::GBP),
            "INR" => Ok(Currency::INR),
            "JPY" => Ok(Currency::JPY),
            other => Err(MoneyError::UnknownCurrency(other.to_string())),
        }
    }
}

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Currency mismatch: cannot operate on {0} and {1}")]
    CurrencyMismatch(String, String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    #[error("Invalid rate: {0}")]
    InvalidRate(String),

    #[error("Arithmetic overflow: {0}")]
    Overflow(String),
}

/// A monetary amount with associated currency
///
/// Amounts are held at 4 decimal places internally; ledger-facing values
/// (fees, commissions) are truncated to the currency minor unit before they
/// touch a balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Money {
    amount: Decimal,
    currency: Currency,
}

impl Money {
    /// Creates a new Money value
    pub fn new(amount: Decimal, currency: Currency) -> Self {
        Self {
            amount: amount.round_dp(4),
            currency,
        }
    }

    /// Creates Money from an integer amount in minor units (e.g., poisha)
    pub fn from_minor(minor_units: i64, currency: Currency) -> Self {
        Self::new(Decimal::new(minor_units, currency.decimal_places()), currency)
    }

    /// Creates a zero amount in the specified currency
    pub fn zero(currency: Currency) -> Self {
        Self {
            amount: dec!(0),
            currency,
        }
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    /// Returns true if the amount is strictly greater than zero
    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }

    /// Returns true if the amount is strictly less than zero
    pub fn is_negative(&self) -> bool {
        self.amount < Decimal::ZERO
    }

    /// Returns true if the amount has no digits below the currency minor unit
    pub fn is_minor_unit_exact(&self) -> bool {
        self.amount.round_dp(self.currency.decimal_places()) == self.amount
    }

    /// Truncates toward zero to the currency minor unit
    pub fn truncate_to_currency(&self) -> Self {
        Self {
            amount: self.amount.round_dp_with_strategy(
                self.currency.decimal_places(),
                RoundingStrategy::ToZero,
            ),
            currency: self.currency,
        }
    }

    /// Checked addition; errors on currency mismatch or overflow
    pub fn checked_add(&self, other: &Money) -> Result<Money, MoneyError> {
        self.ensure_same_currency(other)?;
        let sum = self
            .amount
            .checked_add(other.amount)
            .ok_or_else(|| MoneyError::Overflow(format!("{} + {}", self.amount, other.amount)))?;
        Ok(Self::new(sum, self.currency))
    }

    /// Checked subtraction; errors on currency mismatch or overflow
    pub fn checked_sub(&self, other: &Money) -> Result<Money, MoneyError> {
        self.ensure_same_currency(other)?;
        let diff = self
            .amount
            .checked_sub(other.amount)
            .ok_or_else(|| MoneyError::Overflow(format!("{} - {}", self.amount, other.amount)))?;
        Ok(Self::new(diff, self.currency))
    }

    /// Returns true if `self >= other`; errors on currency mismatch
    pub fn covers(&self, other: &Money) -> Result<bool, MoneyError> {
        self.ensure_same_currency(other)?;
        Ok(self.amount >= other.amount)
    }

    fn ensure_same_currency(&self, other: &Money) -> Result<(), MoneyError> {
        if self.currency != other.currency {
            return Err(MoneyError::CurrencyMismatch(
                self.currency.to_string(),
                other.currency.to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dp = self.currency.decimal_places();
        write!(
            f,
            "{} {:.dp$}",
            self.currency.symbol(),
            self.amount,
            dp = dp as usize
        )
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.amount, self.currency)
    }
}

/// A rate expressed per mille (parts per thousand)
///
/// A rate of 20 means 20 / 1000 = 2%. Rates are pinned on an actor record
/// when the actor is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rate {
    per_mille: Decimal,
}

impl Rate {
    pub const ZERO: Rate = Rate { per_mille: Decimal::ZERO };

    /// Creates a rate from a per-mille value, rejecting values outside 0..=1000
    pub fn per_mille(per_mille: Decimal) -> Result<Self, MoneyError> {
        if per_mille < Decimal::ZERO || per_mille > dec!(1000) {
            return Err(MoneyError::InvalidRate(format!(
                "{} is outside 0..=1000 per mille",
                per_mille
            )));
        }
        Ok(Self { per_mille })
    }

    /// Returns the rate in per mille
    pub fn as_per_mille(&self) -> Decimal {
        self.per_mille
    }

    /// Applies the rate and truncates the result to the currency minor unit
    ///
    /// `amount * rate / 1000`, rounded toward zero, so the ledger never
    /// collects more than the configured rate.
    pub fn apply_truncated(&self, money: &Money) -> Result<Money, MoneyError> {
        let exact = self
            .per_mille
            .checked_div(dec!(1000))
            .and_then(|fraction| money.amount.checked_mul(fraction))
            .ok_or_else(|| MoneyError::Overflow(format!("{} at {}", money.amount, self)))?;
        Ok(Money {
            amount: exact.round_dp_with_strategy(
                money.currency.decimal_places(),
                RoundingStrategy::ToZero,
            ),
            currency: money.currency,
        })
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}‰", self.per_mille.normalize())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn truncated_rate_never_exceeds_exact_value(
            minor in 1i64..1_000_000_000i64,
            per_mille in 0u32..=1000u32
        ) {
            let amount = Money::from_minor(minor, Currency::BDT);
            let rate = Rate::per_mille(Decimal::from(per_mille)).unwrap();
            let exact = amount.amount() * Decimal::from(per_mille) / dec!(1000);
            let charged = rate.apply_truncated(&amount).unwrap();

            prop_assert!(charged.amount() <= exact);
            prop_assert!(exact - charged.amount() < dec!(0.01));
            prop_assert!(charged.is_minor_unit_exact());
        }

        #[test]
        fn add_then_sub_is_identity(
            a in -1_000_000i64..1_000_000i64,
            b in -1_000_000i64..1_000_000i64
        ) {
            let ma = Money::from_minor(a, Currency::BDT);
            let mb = Money::from_minor(b, Currency::BDT);

            prop_assert_eq!(ma.checked_add(&mb).unwrap().checked_sub(&mb).unwrap(), ma);
        }
    }
}
