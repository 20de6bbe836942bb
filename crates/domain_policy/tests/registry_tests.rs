//! Policy Registry Tests

use core_kernel::{ProcessId, RequestId};
use domain_policy::registry::{Correlation, OracleRequest, PolicyRegistry, RequestStatus};

fn with_request(object_name: &str) -> (PolicyRegistry, ProcessId, RequestId) {
    let mut registry = PolicyRegistry::new();
    let pid = ProcessId::new_v7();
    let rid = RequestId::new_v7();
    registry.activate(object_name, pid);
    registry.record_application(pid);
    registry.track_request(OracleRequest::new(rid, pid, object_name));
    (registry, pid, rid)
}

mod activity {
    use super::*;

    #[test]
    fn test_empty_registry_has_nothing_active() {
        let registry = PolicyRegistry::new();
        assert!(!registry.is_active("house-1"));
        assert_eq!(registry.active_policy("house-1"), None);
        assert_eq!(registry.active_count(), 0);
        assert_eq!(registry.application_count(), 0);
    }

    #[test]
    fn test_active_policy_is_exact() {
        let (registry, pid, _) = with_request("house-1");
        assert!(registry.is_active_policy("house-1", pid));
        assert!(!registry.is_active_policy("house-1", ProcessId::new_v7()));
        assert!(!registry.is_active_policy("house-2", pid));
    }

    #[test]
    fn test_deactivate_frees_object() {
        let (mut registry, pid, _) = with_request("house-1");
        assert_eq!(registry.deactivate("house-1"), Some(pid));
        assert!(!registry.is_active("house-1"));
        assert_eq!(registry.deactivate("house-1"), None);
    }

    #[test]
    fn test_application_index_is_append_only() {
        let (mut registry, first, _) = with_request("house-1");
        registry.deactivate("house-1");
        let second = ProcessId::new_v7();
        registry.record_application(second);

        assert_eq!(registry.application_count(), 2);
        assert_eq!(registry.application_at(0), Some(first));
        assert_eq!(registry.application_at(1), Some(second));
        assert_eq!(registry.application_at(2), None);
    }
}

mod correlation {
    use super::*;

    #[test]
    fn test_matching_request() {
        let (registry, pid, rid) = with_request("house-1");
        assert_eq!(registry.correlate(rid, pid), Correlation::Matches);
    }

    #[test]
    fn test_request_for_other_policy() {
        let (registry, pid, rid) = with_request("house-1");
        let other = ProcessId::new_v7();
        assert_eq!(registry.correlate(rid, other), Correlation::Mismatch { expected: pid });
    }

    #[test]
    fn test_unknown_request_is_untracked() {
        let (registry, pid, _) = with_request("house-1");
        assert_eq!(registry.correlate(RequestId::new_v7(), pid), Correlation::Untracked);
    }

    #[test]
    fn test_responded_request_is_closed() {
        let (mut registry, pid, rid) = with_request("house-1");
        registry.mark_responded(rid);

        let request = registry.request(rid).unwrap();
        assert_eq!(request.status, RequestStatus::Responded);
        assert!(request.responded_at.is_some());
        assert_eq!(registry.correlate(rid, pid), Correlation::Closed);
        assert!(registry.outstanding_requests().is_empty());
    }

    #[test]
    fn test_orphaning_only_touches_outstanding_requests() {
        let (mut registry, pid, answered) = with_request("house-1");
        registry.mark_responded(answered);
        let pending = RequestId::new_v7();
        registry.track_request(OracleRequest::new(pending, pid, "house-1"));

        assert_eq!(registry.orphan_requests(pid), 1);
        assert_eq!(registry.request(pending).unwrap().status, RequestStatus::Orphaned);
        assert_eq!(registry.request(answered).unwrap().status, RequestStatus::Responded);
        assert_eq!(registry.orphan_requests(pid), 0);
    }
}

mod restore {
    use super::*;

    #[test]
    fn test_restore_activates_underwritten_only() {
        let expired = ProcessId::new_v7();
        let current = ProcessId::new_v7();
        let other = ProcessId::new_v7();

        let registry = PolicyRegistry::restore(vec![
            (expired, "house-1".to_string(), false),
            (current, "house-1".to_string(), true),
            (other, "barn".to_string(), false),
        ]);

        assert_eq!(registry.application_count(), 3);
        assert_eq!(registry.application_at(0), Some(expired));
        assert_eq!(registry.active_policy("house-1"), Some(current));
        assert!(!registry.is_active("barn"));
        assert!(registry.outstanding_requests().is_empty());
    }
}
