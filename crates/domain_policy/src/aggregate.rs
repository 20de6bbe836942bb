//! Application aggregate
//!
//! An application is the ledger's record of one fire policy. The ledger owns
//! storage; this type owns the lifecycle rules.
//!
//! # Invariants
//!
//! - `process_id`, holder and amounts never change after creation
//! - State moves forward only: `Applied -> Underwritten -> Expired`
//! - `Expired` is terminal

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{ActorId, Money, ProcessId};

use crate::error::PolicyError;

/// Policy lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PolicyState {
    /// Application recorded, not yet underwritten
    Applied,
    /// Coverage active
    Underwritten,
    /// Coverage ended (terminal)
    Expired,
}

impl PolicyState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyState::Applied => "applied",
            PolicyState::Underwritten => "underwritten",
            PolicyState::Expired => "expired",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "applied" => Some(PolicyState::Applied),
            "underwritten" => Some(PolicyState::Underwritten),
            "expired" => Some(PolicyState::Expired),
            _ => None,
        }
    }

    fn can_transition_to(&self, target: PolicyState) -> bool {
        use PolicyState::*;
        matches!((self, target), (Applied, Underwritten) | (Underwritten, Expired))
    }
}

impl fmt::Display for PolicyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input for creating an application through the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewApplication {
    pub policy_holder: ActorId,
    pub premium_amount: Money,
    pub sum_insured_amount: Money,
    /// Encoded [`crate::params::ApplicationData`]
    pub application_data: Vec<u8>,
}

/// A fire policy application as stored by the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub process_id: ProcessId,
    pub policy_holder: ActorId,
    pub premium_amount: Money,
    pub sum_insured_amount: Money,
    pub application_data: Vec<u8>,
    pub state: PolicyState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Application {
    /// Creates an application in the `Applied` state under a ledger-issued id
    pub fn create(process_id: ProcessId, new: NewApplication) -> Self {
        let now = Utc::now();
        Self {
            process_id,
            policy_holder: new.policy_holder,
            premium_amount: new.premium_amount,
            sum_insured_amount: new.sum_insured_amount,
            application_data: new.application_data,
            state: PolicyState::Applied,
            created_at: now,
            updated_at: now,
        }
    }

    /// Accepts the application and activates coverage
    pub fn underwrite(&mut self) -> Result<(), PolicyError> {
        self.transition(PolicyState::Underwritten)
    }

    /// Ends coverage
    pub fn expire(&mut self) -> Result<(), PolicyError> {
        self.transition(PolicyState::Expired)
    }

    pub fn is_underwritten(&self) -> bool {
        self.state == PolicyState::Underwritten
    }

    fn transition(&mut self, target: PolicyState) -> Result<(), PolicyError> {
        if !self.state.can_transition_to(target) {
            return Err(PolicyError::InvalidStateTransition {
                from: self.state.to_string(),
                to: target.to_string(),
            });
        }
        self.state = target;
        self.updated_at = Utc::now();
        Ok(())
    }
}
