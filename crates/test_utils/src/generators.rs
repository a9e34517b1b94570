//! Property-Based Test Generators
//!
//! Proptest strategies that produce inputs the ledger accepts: amounts
//! exact at the minor unit, rates inside 0..=1000 per mille, and phone
//! numbers in the accepted local format.

use core_kernel::{ActorId, Currency, Money, Rate, WalletId};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Strategy for generating supported currencies
pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::BDT),
        Just(Currency::USD),
        Just(Currency::EUR),
        Just(Currency::GBP),
        Just(Currency::INR),
        Just(Currency::JPY),
    ]
}

/// Strategy for positive amounts in minor units
pub fn positive_amount_minor_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000_000_000i64
}

/// Strategy for positive BDT amounts with two decimal places
pub fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..10_000_000i64).prop_map(|minor| Decimal::new(minor, 2))
}

/// Strategy for generating valid Money values with positive amounts
pub fn positive_money_strategy() -> impl Strategy<Value = Money> {
    (positive_amount_minor_strategy(), currency_strategy())
        .prop_map(|(amount, currency)| Money::from_minor(amount, currency))
}

/// Strategy for per-mille values up to 100 (0% to 10%), one decimal place
pub fn per_mille_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=1000i64).prop_map(|n| Decimal::new(n, 1))
}

/// Strategy for fee and commission rates
pub fn rate_strategy() -> impl Strategy<Value = Rate> {
    per_mille_strategy().prop_map(|p| Rate::per_mille(p).expect("Generated invalid rate"))
}

pub fn actor_id_strategy() -> impl Strategy<Value = ActorId> {
    any::<[u8; 16]>().prop_map(|bytes| ActorId::from_uuid(uuid::Uuid::from_bytes(bytes)))
}

pub fn wallet_id_strategy() -> impl Strategy<Value = WalletId> {
    any::<[u8; 16]>().prop_map(|bytes| WalletId::from_uuid(uuid::Uuid::from_bytes(bytes)))
}

/// Strategy for generating valid email addresses
pub fn email_strategy() -> impl Strategy<Value = String> {
    ("[a-z]{5,10}", "[a-z]{3,8}")
        .prop_map(|(local, domain)| format!("{}@{}.com", local, domain))
}

/// Strategy for local mobile numbers, with and without the country prefix
pub fn phone_strategy() -> impl Strategy<Value = String> {
    (any::<bool>(), 0u32..1_000_000_000u32).prop_map(|(international, line)| {
        if international {
            format!("+8801{:09}", line)
        } else {
            format!("01{:09}", line)
        }
    })
}

/// Strategy for generating names
pub fn name_strategy() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{2,10}".prop_map(|s| s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_wallet::actor::is_valid_phone;

    proptest! {
        #[test]
        fn positive_money_is_always_positive(money in positive_money_strategy()) {
            prop_assert!(money.amount() > Decimal::ZERO);
        }

        #[test]
        fn amounts_are_minor_unit_exact(amount in amount_strategy()) {
            prop_assert!(Money::new(amount, Currency::BDT).is_minor_unit_exact());
        }

        #[test]
        fn rate_is_within_range(rate in rate_strategy()) {
            prop_assert!(rate.as_per_mille() >= Decimal::ZERO);
            prop_assert!(rate.as_per_mille() <= Decimal::ONE_HUNDRED);
        }

        #[test]
        fn generated_phones_are_accepted(phone in phone_strategy()) {
            prop_assert!(is_valid_phone(&phone));
        }
    }
}
