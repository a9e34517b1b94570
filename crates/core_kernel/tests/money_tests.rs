//! Unit tests for the Money module
//!
//! Tests cover money creation, checked arithmetic, truncation to the
//! currency minor unit, and per-mille rates.

use core_kernel::{Currency, Money, MoneyError, Rate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

mod creation {
    use super::*;

    #[test]
    fn test_new_creates_money_with_correct_amount() {
        let m = Money::new(dec!(100.50), Currency::BDT);
        assert_eq!(m.amount(), dec!(100.50));
        assert_eq!(m.currency(), Currency::BDT);
    }

    #[test]
    fn test_new_rounds_to_four_decimal_places() {
        let m = Money::new(dec!(100.123456789), Currency::BDT);
        assert_eq!(m.amount(), dec!(100.1235));
    }

    #[test]
    fn test_from_minor_handles_jpy_no_decimals() {
        let m = Money::from_minor(10000, Currency::JPY);
        assert_eq!(m.amount(), dec!(10000));
    }

    #[test]
    fn test_zero_creates_zero_amount() {
        let m = Money::zero(Currency::BDT);
        assert!(m.is_zero());
        assert!(!m.is_positive());
        assert!(!m.is_negative());
    }
}

mod arithmetic {
    use super::*;

    #[test]
    fn test_checked_add() {
        let a = Money::new(dec!(100.25), Currency::BDT);
        let b = Money::new(dec!(50.75), Currency::BDT);
        assert_eq!(a.checked_add(&b).unwrap().amount(), dec!(151.00));
    }

    #[test]
    fn test_checked_sub_can_go_negative() {
        let a = Money::new(dec!(10), Currency::BDT);
        let b = Money::new(dec!(25), Currency::BDT);
        let diff = a.checked_sub(&b).unwrap();
        assert!(diff.is_negative());
        assert_eq!(diff.amount(), dec!(-15));
    }

    #[test]
    fn test_checked_sub_currency_mismatch() {
        let a = Money::new(dec!(10), Currency::BDT);
        let b = Money::new(dec!(10), Currency::INR);
        assert_eq!(
            a.checked_sub(&b),
            Err(MoneyError::CurrencyMismatch("BDT".into(), "INR".into()))
        );
    }

    #[test]
    fn test_add_past_decimal_range_is_an_error() {
        let large = Money::new(Decimal::MAX, Currency::BDT);
        let result = large.checked_add(&large);
        assert!(matches!(result, Err(MoneyError::Overflow(_))));
    }

    #[test]
    fn test_negation() {
        let m = Money::new(dec!(42.10), Currency::BDT);
        assert_eq!((-m).amount(), dec!(-42.10));
        assert_eq!((-(-m)), m);
    }

    #[test]
    fn test_covers() {
        let balance = Money::new(dec!(100), Currency::BDT);
        assert!(balance.covers(&Money::new(dec!(100), Currency::BDT)).unwrap());
        assert!(!balance.covers(&Money::new(dec!(100.01), Currency::BDT)).unwrap());
        assert!(balance.covers(&Money::new(dec!(1), Currency::USD)).is_err());
    }
}

mod rates {
    use super::*;

    #[test]
    fn test_fee_on_cash_out_amount() {
        // 20 per mille on 500 is 10
        let rate = Rate::per_mille(dec!(20)).unwrap();
        let fee = rate.apply_truncated(&Money::new(dec!(500), Currency::BDT)).unwrap();
        assert_eq!(fee.amount(), dec!(10));
    }

    #[test]
    fn test_fractional_rate() {
        let rate = Rate::per_mille(dec!(18.5)).unwrap();
        let fee = rate.apply_truncated(&Money::new(dec!(1000), Currency::BDT)).unwrap();
        assert_eq!(fee.amount(), dec!(18.5));
    }

    #[test]
    fn test_tiny_amount_truncates_to_zero() {
        let rate = Rate::per_mille(dec!(10)).unwrap();
        let fee = rate.apply_truncated(&Money::new(dec!(0.99), Currency::BDT)).unwrap();
        assert!(fee.is_zero());
    }

    #[test]
    fn test_zero_rate() {
        let fee = Rate::ZERO.apply_truncated(&Money::new(dec!(12345.67), Currency::BDT)).unwrap();
        assert!(fee.is_zero());
    }

    #[test]
    fn test_rate_display() {
        let rate = Rate::per_mille(dec!(20.0)).unwrap();
        assert_eq!(rate.to_string(), "20‰");
    }

    #[test]
    fn test_rate_serde_is_transparent() {
        let rate = Rate::per_mille(Decimal::new(15, 0)).unwrap();
        let json = serde_json::to_string(&rate).unwrap();
        let back: Rate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rate);
    }
}

mod display {
    use super::*;

    #[test]
    fn test_bdt_display() {
        let m = Money::new(dec!(1234.5), Currency::BDT);
        assert_eq!(m.to_string(), "৳ 1234.50");
    }

    #[test]
    fn test_currency_codes() {
        assert_eq!(Currency::BDT.code(), "BDT");
        assert_eq!(Currency::BDT.decimal_places(), 2);
        assert_eq!(Currency::JPY.decimal_places(), 0);
    }
}
