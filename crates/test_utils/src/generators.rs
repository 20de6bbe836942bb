//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data
//! that maintains domain invariants.

use core_kernel::{Currency, Money};
use domain_claims::FireCategory;
use proptest::prelude::*;

/// Strategy for generating valid Currency values
pub fn currency_strategy() -> impl Strategy<Value = Currency> {
    prop_oneof![
        Just(Currency::USD),
        Just(Currency::EUR),
        Just(Currency::GBP),
        Just(Currency::JPY),
        Just(Currency::CHF),
    ]
}

/// Strategy for generating valid positive amounts in minor units
pub fn positive_amount_minor_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000_000_000i64
}

/// Strategy for generating positive premiums in the given currency
pub fn premium_strategy(currency: Currency) -> impl Strategy<Value = Money> {
    positive_amount_minor_strategy().prop_map(move |amount| Money::from_minor(amount, currency))
}

/// Strategy for generating positive premiums in any currency
pub fn any_premium_strategy() -> impl Strategy<Value = Money> {
    (positive_amount_minor_strategy(), currency_strategy())
        .prop_map(|(amount, currency)| Money::from_minor(amount, currency))
}

/// Strategy for generating zero or negative premiums
pub fn non_positive_premium_strategy() -> impl Strategy<Value = Money> {
    (-1_000_000i64..=0i64).prop_map(|amount| Money::from_minor(amount, Currency::USD))
}

/// Strategy for generating insured object names
pub fn object_name_strategy() -> impl Strategy<Value = String> {
    "[a-z]{1,12}-[0-9]{1,4}"
}

/// Strategy for generating category codes that never trigger a payout
pub fn non_payout_code_strategy() -> impl Strategy<Value = char> {
    any::<char>().prop_filter("M and L trigger payouts", |c| *c != 'M' && *c != 'L')
}

/// Strategy for generating any fire category
pub fn category_strategy() -> impl Strategy<Value = FireCategory> {
    prop_oneof![
        Just(FireCategory::Medium),
        Just(FireCategory::Large),
        non_payout_code_strategy().prop_map(FireCategory::BelowThreshold),
    ]
}
