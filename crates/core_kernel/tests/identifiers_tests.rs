//! Unit tests for the identifier newtypes

use core_kernel::{ProcessId, RequestId, ClaimId, PayoutId, ActorId, OracleId};
use uuid::Uuid;

mod process_id_tests {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        assert_ne!(ProcessId::new(), ProcessId::new());
    }

    #[test]
    fn test_new_v7_generates_time_ordered_ids() {
        let id1 = ProcessId::new_v7();
        std::thread::sleep(std::time::Duration::from_millis(1));
        let id2 = ProcessId::new_v7();
        assert!(id1 < id2);
    }

    #[test]
    fn test_from_str_without_prefix() {
        let uuid = Uuid::new_v4();
        let parsed: ProcessId = uuid.to_string().parse().unwrap();
        assert_eq!(*parsed.as_uuid(), uuid);
    }

    #[test]
    fn test_from_str_invalid() {
        assert!("PRC-not-a-uuid".parse::<ProcessId>().is_err());
    }

    #[test]
    fn test_serde_is_transparent() {
        let uuid = Uuid::new_v4();
        let id = ProcessId::from_uuid(uuid);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", uuid));
    }
}

#[test]
fn test_prefixes() {
    assert_eq!(ProcessId::prefix(), "PRC");
    assert_eq!(RequestId::prefix(), "REQ");
    assert_eq!(ClaimId::prefix(), "CLM");
    assert_eq!(PayoutId::prefix(), "PAY");
    assert_eq!(ActorId::prefix(), "ACT");
    assert_eq!(OracleId::prefix(), "ORC");
}

#[test]
fn test_uuid_round_trip_through_conversions() {
    let uuid = Uuid::new_v4();
    let actor = ActorId::from(uuid);
    let back: Uuid = actor.into();
    assert_eq!(uuid, back);
}
