//! Tests for domain_claims

use rust_decimal_macros::dec;

use core_kernel::{ProcessId, Money, Currency};

use domain_claims::claim::{Claim, ClaimStatus};
use domain_claims::payout::{Payout, PayoutStatus};
use domain_claims::evaluation::{payout_amount, ClaimEvaluator, PayoutDecision};
use domain_claims::severity::FireCategory;
use domain_claims::ClaimError;

// ============================================================================
// Severity Tests
// ============================================================================

mod severity_tests {
    use super::*;

    #[test]
    fn test_category_serializes_as_single_character() {
        let json = serde_json::to_string(&FireCategory::Large).unwrap();
        assert_eq!(json, "\"L\"");
    }

    #[test]
    fn test_unknown_code_deserializes_below_threshold() {
        let category: FireCategory = serde_json::from_str("\"S\"").unwrap();
        assert_eq!(category, FireCategory::BelowThreshold('S'));
        assert!(!category.triggers_payout());
    }

    #[test]
    fn test_multi_character_code_is_rejected() {
        let result: Result<FireCategory, _> = serde_json::from_str("\"MM\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_error_carries_code() {
        assert_eq!(
            FireCategory::parse("large"),
            Err(ClaimError::InvalidCategoryCode("large".to_string()))
        );
    }
}

// ============================================================================
// Evaluation Tests
// ============================================================================

mod evaluation_tests {
    use super::*;

    #[test]
    fn test_settle_decision_for_medium_fire() {
        let premium = Money::new(dec!(100), Currency::USD);
        let decision = ClaimEvaluator::new().evaluate(premium, FireCategory::Medium).unwrap();

        assert_eq!(
            decision,
            PayoutDecision::Settle {
                category: FireCategory::Medium,
                amount: Money::new(dec!(500), Currency::USD),
            }
        );
    }

    #[test]
    fn test_fractional_premium_is_multiplied_exactly() {
        let premium = Money::new(dec!(12.34), Currency::EUR);
        let amount = payout_amount(premium, FireCategory::Large).unwrap();
        assert_eq!(amount.amount(), dec!(1234));
    }

    #[test]
    fn test_overflow_is_reported() {
        let premium = Money::new(rust_decimal::Decimal::MAX, Currency::USD);
        let result = payout_amount(premium, FireCategory::Large);
        assert!(matches!(result, Err(ClaimError::AmountOverflow { multiplier: 100, .. })));
    }
}

// ============================================================================
// Claim and Payout Tests
// ============================================================================

mod settlement_tests {
    use super::*;

    fn confirmed_claim(amount: Money) -> Claim {
        let mut claim = Claim::new(ProcessId::new_v7(), amount).unwrap();
        claim.confirm().unwrap();
        claim
    }

    #[test]
    fn test_claim_requires_positive_amount() {
        let result = Claim::new(ProcessId::new(), Money::zero(Currency::USD));
        assert!(matches!(result, Err(ClaimError::NonPositiveAmount(_))));
    }

    #[test]
    fn test_claim_confirm_once() {
        let mut claim = Claim::new(ProcessId::new(), Money::new(dec!(500), Currency::USD)).unwrap();
        assert_eq!(claim.status, ClaimStatus::Applied);

        claim.confirm().unwrap();
        assert!(claim.is_confirmed());
        assert!(claim.confirm().is_err());
    }

    #[test]
    fn test_payout_requires_confirmed_claim() {
        let claim = Claim::new(ProcessId::new(), Money::new(dec!(500), Currency::USD)).unwrap();
        let result = Payout::for_claim(&claim, claim.amount);
        assert!(matches!(result, Err(ClaimError::InvalidStatusTransition { .. })));
    }

    #[test]
    fn test_payout_amount_must_match_claim() {
        let claim = confirmed_claim(Money::new(dec!(500), Currency::USD));
        let result = Payout::for_claim(&claim, Money::new(dec!(499), Currency::USD));
        assert!(matches!(result, Err(ClaimError::AmountMismatch { .. })));
    }

    #[test]
    fn test_payout_process() {
        let claim = confirmed_claim(Money::new(dec!(500), Currency::USD));
        let mut payout = Payout::for_claim(&claim, claim.amount).unwrap();

        assert_eq!(payout.claim_id, claim.id);
        assert_eq!(payout.process_id, claim.process_id);
        assert_eq!(payout.status, PayoutStatus::Expected);
        assert!(payout.paid_at.is_none());

        payout.process().unwrap();
        assert!(payout.is_paid_out());
        assert!(payout.paid_at.is_some());
        assert!(payout.process().is_err());
    }

    #[test]
    fn test_status_string_round_trip() {
        for status in [ClaimStatus::Applied, ClaimStatus::Confirmed] {
            assert_eq!(ClaimStatus::parse(status.as_str()), Some(status));
        }
        for status in [PayoutStatus::Expected, PayoutStatus::PaidOut] {
            assert_eq!(PayoutStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(PayoutStatus::parse("pending"), None);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    fn other_code() -> impl Strategy<Value = char> {
        any::<char>().prop_filter("M and L pay out", |c| *c != 'M' && *c != 'L')
    }

    proptest! {
        #[test]
        fn payout_schedule_is_fixed(minor in 1i64..10_000_000_000i64, code in other_code()) {
            let premium = Money::from_minor(minor, Currency::USD);

            let medium = payout_amount(premium, FireCategory::Medium).unwrap();
            let large = payout_amount(premium, FireCategory::Large).unwrap();
            let other = payout_amount(premium, FireCategory::from(code)).unwrap();

            prop_assert_eq!(medium.amount(), premium.amount() * Decimal::from(5));
            prop_assert_eq!(large.amount(), premium.amount() * Decimal::from(100));
            prop_assert!(other.is_zero());
        }
    }
}
