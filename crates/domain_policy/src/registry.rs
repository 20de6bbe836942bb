//! Policy registry
//!
//! The only state shared between operations. It tracks which policy, if any,
//! is active for each insured object, keeps the debug application index, and
//! records oracle requests until their response arrives.
//!
//! The registry is owned by [`crate::services::FireInsuranceService`] and
//! lives as long as the service. It can be rebuilt from the ledger with
//! [`PolicyRegistry::restore`].

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ProcessId, RequestId};

/// Protocol state of an oracle request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    /// Dispatched, awaiting the callback
    Requested,
    /// Callback processed successfully
    Responded,
    /// Policy expired before the response; left to lapse without cancellation
    Orphaned,
}

/// Correlation record for one dispatched oracle request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleRequest {
    pub request_id: RequestId,
    pub process_id: ProcessId,
    pub object_name: String,
    pub status: RequestStatus,
    pub requested_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl OracleRequest {
    pub fn new(request_id: RequestId, process_id: ProcessId, object_name: impl Into<String>) -> Self {
        Self {
            request_id,
            process_id,
            object_name: object_name.into(),
            status: RequestStatus::Requested,
            requested_at: Utc::now(),
            responded_at: None,
        }
    }

    pub fn is_outstanding(&self) -> bool {
        self.status == RequestStatus::Requested
    }
}

/// Result of looking up a callback's request id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Correlation {
    /// Tracked and tied to the given process
    Matches,
    /// Tracked but tied to another process
    Mismatch { expected: ProcessId },
    /// Tracked but no longer outstanding (answered or orphaned)
    Closed,
    /// Not tracked, e.g. dispatched before a restart
    Untracked,
}

#[derive(Debug, Default)]
pub struct PolicyRegistry {
    active: HashMap<String, ProcessId>,
    applications: Vec<ProcessId>,
    requests: HashMap<RequestId, OracleRequest>,
}

impl PolicyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the registry from `(process_id, object_name, underwritten)`
    /// triples in ledger order
    ///
    /// Oracle requests are not restored; callbacks for them are treated as
    /// untracked.
    pub fn restore<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (ProcessId, String, bool)>,
    {
        let mut registry = Self::new();
        for (process_id, object_name, underwritten) in entries {
            registry.applications.push(process_id);
            if underwritten {
                registry.active.insert(object_name, process_id);
            }
        }
        registry
    }

    /// Returns true if the object has an active policy
    pub fn is_active(&self, object_name: &str) -> bool {
        self.active.contains_key(object_name)
    }

    /// Returns the active policy for the object, if any
    pub fn active_policy(&self, object_name: &str) -> Option<ProcessId> {
        self.active.get(object_name).copied()
    }

    /// Returns true if this exact policy is the object's active policy
    pub fn is_active_policy(&self, object_name: &str, process_id: ProcessId) -> bool {
        self.active_policy(object_name) == Some(process_id)
    }

    /// Marks the object as covered by `process_id`
    ///
    /// Callers check [`PolicyRegistry::is_active`] first; the returned
    /// previous value is `None` whenever they did.
    pub fn activate(&mut self, object_name: impl Into<String>, process_id: ProcessId) -> Option<ProcessId> {
        self.active.insert(object_name.into(), process_id)
    }

    pub fn deactivate(&mut self, object_name: &str) -> Option<ProcessId> {
        self.active.remove(object_name)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn record_application(&mut self, process_id: ProcessId) {
        self.applications.push(process_id);
    }

    pub fn application_count(&self) -> usize {
        self.applications.len()
    }

    pub fn application_at(&self, index: usize) -> Option<ProcessId> {
        self.applications.get(index).copied()
    }

    pub fn track_request(&mut self, request: OracleRequest) {
        self.requests.insert(request.request_id, request);
    }

    pub fn request(&self, request_id: RequestId) -> Option<&OracleRequest> {
        self.requests.get(&request_id)
    }

    /// Checks how a callback's identifiers relate to the tracked request
    pub fn correlate(&self, request_id: RequestId, process_id: ProcessId) -> Correlation {
        match self.requests.get(&request_id) {
            None => Correlation::Untracked,
            Some(request) if request.process_id != process_id => Correlation::Mismatch {
                expected: request.process_id,
            },
            Some(request) if !request.is_outstanding() => Correlation::Closed,
            Some(_) => Correlation::Matches,
        }
    }

    /// Moves a tracked request to `Responded`; untracked ids are ignored
    pub fn mark_responded(&mut self, request_id: RequestId) {
        if let Some(request) = self.requests.get_mut(&request_id) {
            request.status = RequestStatus::Responded;
            request.responded_at = Some(Utc::now());
        }
    }

    /// Marks every outstanding request of an expired policy as orphaned
    ///
    /// Nothing is sent to the oracle. A response that still arrives is
    /// rejected by the callback's active-policy check.
    pub fn orphan_requests(&mut self, process_id: ProcessId) -> usize {
        let mut orphaned = 0;
        for request in self.requests.values_mut() {
            if request.process_id == process_id && request.is_outstanding() {
                request.status = RequestStatus::Orphaned;
                orphaned += 1;
            }
        }
        orphaned
    }

    /// Requests still waiting for a callback, oldest first
    pub fn outstanding_requests(&self) -> Vec<OracleRequest> {
        let mut pending: Vec<_> = self
            .requests
            .values()
            .filter(|r| r.is_outstanding())
            .cloned()
            .collect();
        pending.sort_by_key(|r| r.requested_at);
        pending
    }
}
