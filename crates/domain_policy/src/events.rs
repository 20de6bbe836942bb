//! Domain events for the fire policy lifecycle
//!
//! Events are published to a side-channel [`EventPublisher`]. They are never
//! read back by the core.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ActorId, ClaimId, Money, PayoutId, ProcessId, RequestId};

/// Domain events emitted by the fire insurance service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FireInsuranceEvent {
    /// Policy applied for and underwritten
    PolicyCreated {
        holder: ActorId,
        object_name: String,
        policy_id: ProcessId,
        timestamp: DateTime<Utc>,
    },

    /// Policy expired
    PolicyExpired {
        object_name: String,
        policy_id: ProcessId,
        timestamp: DateTime<Utc>,
    },

    /// Oracle callback received, before any validation
    OracleCallbackReceived {
        request_id: RequestId,
        policy_id: ProcessId,
        raw_response: Vec<u8>,
        timestamp: DateTime<Utc>,
    },

    /// Claim created and confirmed
    ClaimConfirmed {
        policy_id: ProcessId,
        claim_id: ClaimId,
        payout_amount: Money,
        timestamp: DateTime<Utc>,
    },

    /// Payout created and processed
    PayoutExecuted {
        policy_id: ProcessId,
        claim_id: ClaimId,
        payout_id: PayoutId,
        payout_amount: Money,
        timestamp: DateTime<Utc>,
    },
}

impl FireInsuranceEvent {
    /// Returns the policy ID associated with this event
    pub fn policy_id(&self) -> ProcessId {
        match self {
            FireInsuranceEvent::PolicyCreated { policy_id, .. } => *policy_id,
            FireInsuranceEvent::PolicyExpired { policy_id, .. } => *policy_id,
            FireInsuranceEvent::OracleCallbackReceived { policy_id, .. } => *policy_id,
            FireInsuranceEvent::ClaimConfirmed { policy_id, .. } => *policy_id,
            FireInsuranceEvent::PayoutExecuted { policy_id, .. } => *policy_id,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            FireInsuranceEvent::PolicyCreated { timestamp, .. } => *timestamp,
            FireInsuranceEvent::PolicyExpired { timestamp, .. } => *timestamp,
            FireInsuranceEvent::OracleCallbackReceived { timestamp, .. } => *timestamp,
            FireInsuranceEvent::ClaimConfirmed { timestamp, .. } => *timestamp,
            FireInsuranceEvent::PayoutExecuted { timestamp, .. } => *timestamp,
        }
    }

    /// Returns the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            FireInsuranceEvent::PolicyCreated { .. } => "PolicyCreated",
            FireInsuranceEvent::PolicyExpired { .. } => "PolicyExpired",
            FireInsuranceEvent::OracleCallbackReceived { .. } => "OracleCallbackReceived",
            FireInsuranceEvent::ClaimConfirmed { .. } => "ClaimConfirmed",
            FireInsuranceEvent::PayoutExecuted { .. } => "PayoutExecuted",
        }
    }

    /// Payout amount for settlement events
    pub fn payout_amount(&self) -> Option<Money> {
        match self {
            FireInsuranceEvent::ClaimConfirmed { payout_amount, .. }
            | FireInsuranceEvent::PayoutExecuted { payout_amount, .. } => Some(*payout_amount),
            _ => None,
        }
    }
}

/// Side-channel sink for domain events
///
/// Publishing cannot fail from the core's point of view; sinks that can lose
/// events must log that themselves.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: FireInsuranceEvent);
}

/// Writes every event to the tracing log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingEventPublisher;

impl EventPublisher for TracingEventPublisher {
    fn publish(&self, event: FireInsuranceEvent) {
        match serde_json::to_string(&event) {
            Ok(payload) => tracing::info!(
                target: "fire_insurance::events",
                event_type = event.event_type(),
                policy_id = %event.policy_id(),
                %payload,
                "Domain event"
            ),
            Err(e) => tracing::warn!(
                target: "fire_insurance::events",
                event_type = event.event_type(),
                error = %e,
                "Domain event could not be serialized"
            ),
        }
    }
}

/// Keeps events in memory in publication order
#[derive(Debug, Default, Clone)]
pub struct RecordingEventPublisher {
    events: Arc<Mutex<Vec<FireInsuranceEvent>>>,
}

impl RecordingEventPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all recorded events
    pub fn events(&self) -> Vec<FireInsuranceEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn event_types(&self) -> Vec<&'static str> {
        self.events().iter().map(FireInsuranceEvent::event_type).collect()
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl EventPublisher for RecordingEventPublisher {
    fn publish(&self, event: FireInsuranceEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

/// Publishes every event to several sinks
pub struct FanoutEventPublisher {
    sinks: Vec<Arc<dyn EventPublisher>>,
}

impl FanoutEventPublisher {
    pub fn new(sinks: Vec<Arc<dyn EventPublisher>>) -> Self {
        Self { sinks }
    }
}

impl EventPublisher for FanoutEventPublisher {
    fn publish(&self, event: FireInsuranceEvent) {
        for sink in &self.sinks {
            sink.publish(event.clone());
        }
    }
}
