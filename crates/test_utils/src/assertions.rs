//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for domain types that give
//! more meaningful error messages than standard assertions.

use core_kernel::Money;
use domain_policy::{CallbackOutcome, FireInsuranceEvent, RecordingEventPublisher};

/// Asserts that two Money values are equal in both amount and currency
pub fn assert_money_eq(actual: &Money, expected: &Money) {
    assert_eq!(
        actual.currency(),
        expected.currency(),
        "Currency mismatch: actual={}, expected={}",
        actual,
        expected
    );
    assert_eq!(
        actual.amount(),
        expected.amount(),
        "Amount mismatch: actual={}, expected={}",
        actual,
        expected
    );
}

/// Asserts the exact sequence of published event types
pub fn assert_event_types(events: &RecordingEventPublisher, expected: &[&str]) {
    let actual = events.event_types();
    assert_eq!(
        actual, expected,
        "Event sequence mismatch: actual={:?}, expected={:?}",
        actual, expected
    );
}

/// Asserts that a callback settled a claim for `amount`
pub fn assert_settled(outcome: &CallbackOutcome, amount: &Money) {
    let settlement = outcome
        .settlement
        .as_ref()
        .unwrap_or_else(|| panic!("Expected a settlement for category {}", outcome.category));
    assert_money_eq(&settlement.amount, amount);
}

/// Asserts that a callback settled nothing
pub fn assert_not_settled(outcome: &CallbackOutcome) {
    assert!(
        outcome.settlement.is_none(),
        "Expected no settlement for category {}, got {:?}",
        outcome.category,
        outcome.settlement
    );
}

/// Asserts that every settlement event carries `amount`
pub fn assert_settlement_events_carry(events: &RecordingEventPublisher, amount: &Money) {
    let settlement_events: Vec<FireInsuranceEvent> = events
        .events()
        .into_iter()
        .filter(|e| e.payout_amount().is_some())
        .collect();
    assert!(!settlement_events.is_empty(), "Expected settlement events");
    for event in settlement_events {
        let carried = event.payout_amount().unwrap_or_else(|| Money::zero(amount.currency()));
        assert_money_eq(&carried, amount);
    }
}
