//! Application Aggregate Tests
//!
//! Lifecycle transitions of the fire policy application and the
//! error taxonomy attached to them.

use core_kernel::{ActorId, Currency, Money, ProcessId};
use domain_policy::aggregate::{Application, NewApplication, PolicyState};
use domain_policy::error::{ErrorKind, PolicyError};
use rust_decimal_macros::dec;

// ============================================================================
// TEST FIXTURES
// ============================================================================

fn new_application() -> NewApplication {
    NewApplication {
        policy_holder: ActorId::new(),
        premium_amount: Money::new(dec!(100), Currency::USD),
        sum_insured_amount: Money::new(dec!(25000), Currency::USD),
        application_data: b"{}".to_vec(),
    }
}

fn applied() -> Application {
    Application::create(ProcessId::new_v7(), new_application())
}

// ============================================================================
// LIFECYCLE
// ============================================================================

mod lifecycle {
    use super::*;

    #[test]
    fn test_created_application_is_applied() {
        let app = applied();
        assert_eq!(app.state, PolicyState::Applied);
        assert!(!app.is_underwritten());
        assert_eq!(app.created_at, app.updated_at);
    }

    #[test]
    fn test_underwrite_then_expire() {
        let mut app = applied();
        app.underwrite().unwrap();
        assert!(app.is_underwritten());

        app.expire().unwrap();
        assert_eq!(app.state, PolicyState::Expired);
        assert!(!app.is_underwritten());
    }

    #[test]
    fn test_cannot_expire_unless_underwritten() {
        let mut app = applied();
        let err = app.expire().unwrap_err();
        assert!(matches!(
            err,
            PolicyError::InvalidStateTransition { ref from, ref to } if from == "applied" && to == "expired"
        ));
        assert_eq!(app.state, PolicyState::Applied);
    }

    #[test]
    fn test_expired_is_terminal() {
        let mut app = applied();
        app.underwrite().unwrap();
        app.expire().unwrap();

        assert!(app.underwrite().is_err());
        assert!(app.expire().is_err());
        assert_eq!(app.state, PolicyState::Expired);
    }

    #[test]
    fn test_underwrite_twice_rejected() {
        let mut app = applied();
        app.underwrite().unwrap();
        assert!(app.underwrite().is_err());
    }

    #[test]
    fn test_amounts_survive_transitions() {
        let mut app = applied();
        let premium = app.premium_amount;
        app.underwrite().unwrap();
        app.expire().unwrap();
        assert_eq!(app.premium_amount, premium);
    }
}

// ============================================================================
// STATE NAMES
// ============================================================================

mod state_names {
    use super::*;

    #[test]
    fn test_state_parse_matches_as_str() {
        for state in [PolicyState::Applied, PolicyState::Underwritten, PolicyState::Expired] {
            assert_eq!(PolicyState::parse(state.as_str()), Some(state));
        }
        assert_eq!(PolicyState::parse("in_force"), None);
    }

    #[test]
    fn test_state_display() {
        assert_eq!(PolicyState::Underwritten.to_string(), "underwritten");
    }
}

// ============================================================================
// ERROR TAXONOMY
// ============================================================================

mod error_taxonomy {
    use super::*;
    use core_kernel::{MoneyError, PortError, RequestId};

    #[test]
    fn test_lifecycle_errors_are_validation() {
        let pid = ProcessId::new_v7();
        let errors = [
            PolicyError::InvalidPremium("USD 0.00".into()),
            PolicyError::ActivePolicyExists { object_name: "house-1".into() },
            PolicyError::ExpiredOrUnknownPolicy { process_id: pid },
            PolicyError::NonExistingPolicy { process_id: pid },
            PolicyError::AlreadyExpired { process_id: pid },
        ];
        for error in errors {
            assert_eq!(error.kind(), ErrorKind::Validation, "{error}");
        }
    }

    #[test]
    fn test_codes() {
        let pid = ProcessId::new_v7();
        assert_eq!(PolicyError::AlreadyExpired { process_id: pid }.code(), "already_expired");
        assert_eq!(
            PolicyError::CorrelationMismatch {
                request_id: RequestId::new(),
                expected: pid,
                actual: ProcessId::new_v7(),
            }
            .code(),
            "correlation_mismatch"
        );
        assert_eq!(
            PolicyError::from(MoneyError::CurrencyMismatch("USD".into(), "EUR".into())).code(),
            "currency_mismatch"
        );
        assert_eq!(PolicyError::from(MoneyError::Overflow).code(), "money_error");
    }

    #[test]
    fn test_unauthorized_names_role() {
        let caller = ActorId::new();
        let err = PolicyError::unauthorized(caller, "oracle");
        assert_eq!(err.kind(), ErrorKind::Authorization);
        assert!(err.to_string().contains("oracle"));
    }

    #[test]
    fn test_port_failures_are_infrastructure() {
        let err = PolicyError::from(PortError::ServiceUnavailable { service: "ledger".into() });
        assert_eq!(err.kind(), ErrorKind::Infrastructure);
        assert_eq!(err.code(), "port_error");
    }
}
