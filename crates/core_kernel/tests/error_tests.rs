//! Tests for core_kernel error types

use core_kernel::error::CoreError;
use core_kernel::money::MoneyError;
use core_kernel::ProcessId;

#[test]
fn test_core_error_validation() {
    let error = CoreError::validation("Invalid input");

    match error {
        CoreError::Validation(msg) => assert_eq!(msg, "Invalid input"),
        _ => panic!("Expected Validation error"),
    }
}

#[test]
fn test_core_error_from_money_error() {
    let money_error = MoneyError::CurrencyMismatch("USD".to_string(), "EUR".to_string());
    let core_error: CoreError = money_error.into();

    assert!(matches!(core_error, CoreError::Money(_)));
}

#[test]
fn test_core_error_from_identifier_parse() {
    let parse_error = "garbage".parse::<ProcessId>().unwrap_err();
    let core_error: CoreError = parse_error.into();

    assert!(matches!(core_error, CoreError::Identifier(_)));
    assert!(core_error.to_string().contains("Identifier error"));
}

#[test]
fn test_core_error_configuration() {
    let error = CoreError::configuration("Missing oracle id");
    assert_eq!(error.to_string(), "Configuration error: Missing oracle id");
}
