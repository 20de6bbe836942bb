//! Claim records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, ProcessId, Money};
use crate::error::ClaimError;

/// Claim status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimStatus {
    /// Recorded against the policy, not yet confirmed
    Applied,
    /// Confirmed for payout
    Confirmed,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Applied => "applied",
            ClaimStatus::Confirmed => "confirmed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "applied" => Some(ClaimStatus::Applied),
            "confirmed" => Some(ClaimStatus::Confirmed),
            _ => None,
        }
    }
}

/// A payout obligation recognized after a qualifying oracle response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub id: ClaimId,
    pub process_id: ProcessId,
    pub amount: Money,
    pub status: ClaimStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Claim {
    /// Creates a new claim in the `Applied` state
    ///
    /// # Errors
    ///
    /// Returns `ClaimError::NonPositiveAmount` for zero or negative amounts;
    /// below-threshold fires never produce a claim.
    pub fn new(process_id: ProcessId, amount: Money) -> Result<Self, ClaimError> {
        if !amount.is_positive() {
            return Err(ClaimError::NonPositiveAmount(amount.to_string()));
        }
        let now = Utc::now();
        Ok(Self {
            id: ClaimId::new_v7(),
            process_id,
            amount,
            status: ClaimStatus::Applied,
            created_at: now,
            updated_at: now,
        })
    }

    /// Confirms the claim
    pub fn confirm(&mut self) -> Result<(), ClaimError> {
        if self.status != ClaimStatus::Applied {
            return Err(ClaimError::InvalidStatusTransition {
                from: format!("{:?}", self.status),
                to: format!("{:?}", ClaimStatus::Confirmed),
            });
        }
        self.status = ClaimStatus::Confirmed;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == ClaimStatus::Confirmed
    }
}
