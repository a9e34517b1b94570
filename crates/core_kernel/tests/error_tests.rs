//! Tests for core_kernel error types

use core_kernel::error::CoreError;
use core_kernel::money::MoneyError;

#[test]
fn test_core_error_validation() {
    let error = CoreError::validation("Invalid input");

    match error {
        CoreError::Validation(msg) => assert_eq!(msg, "Invalid input"),
        _ => panic!("Expected Validation error"),
    }
}

#[test]
fn test_core_error_configuration() {
    let error = CoreError::configuration("fee rate out of range");

    match error {
        CoreError::Configuration(msg) => assert!(msg.contains("fee rate")),
        _ => panic!("Expected Configuration error"),
    }
}

#[test]
fn test_core_error_from_money_error() {
    let money_error = MoneyError::CurrencyMismatch("BDT".to_string(), "USD".to_string());
    let core_error: CoreError = money_error.into();

    match core_error {
        CoreError::Money(MoneyError::CurrencyMismatch(a, b)) => {
            assert_eq!(a, "BDT");
            assert_eq!(b, "USD");
        }
        _ => panic!("Expected Money error"),
    }
}

#[test]
fn test_core_error_display() {
    let error = CoreError::Money(MoneyError::InvalidRate("1200 is outside 0..=1000 per mille".into()));
    let rendered = error.to_string();
    assert!(rendered.starts_with("Money error"));
    assert!(rendered.contains("1200"));
}
