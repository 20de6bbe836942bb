//! Payout records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, PayoutId, ProcessId, Money};
use crate::claim::Claim;
use crate::error::ClaimError;

/// Payout status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayoutStatus {
    /// Created against a confirmed claim
    Expected,
    /// Settled to the policy holder
    PaidOut,
}

impl PayoutStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayoutStatus::Expected => "expected",
            PayoutStatus::PaidOut => "paid_out",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "expected" => Some(PayoutStatus::Expected),
            "paid_out" => Some(PayoutStatus::PaidOut),
            _ => None,
        }
    }
}

/// The settled transfer for a confirmed claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub id: PayoutId,
    pub process_id: ProcessId,
    pub claim_id: ClaimId,
    pub amount: Money,
    pub status: PayoutStatus,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl Payout {
    /// Creates an expected payout against a confirmed claim
    pub fn for_claim(claim: &Claim, amount: Money) -> Result<Self, ClaimError> {
        if !claim.is_confirmed() {
            return Err(ClaimError::InvalidStatusTransition {
                from: format!("{:?}", claim.status),
                to: "PayoutCreated".to_string(),
            });
        }
        if amount != claim.amount {
            return Err(ClaimError::AmountMismatch {
                claim: claim.amount.to_string(),
                payout: amount.to_string(),
            });
        }
        Ok(Self {
            id: PayoutId::new_v7(),
            process_id: claim.process_id,
            claim_id: claim.id,
            amount,
            status: PayoutStatus::Expected,
            created_at: Utc::now(),
            paid_at: None,
        })
    }

    /// Marks the payout as settled
    pub fn process(&mut self) -> Result<(), ClaimError> {
        if self.status != PayoutStatus::Expected {
            return Err(ClaimError::InvalidStatusTransition {
                from: format!("{:?}", self.status),
                to: format!("{:?}", PayoutStatus::PaidOut),
            });
        }
        self.status = PayoutStatus::PaidOut;
        self.paid_at = Some(Utc::now());
        Ok(())
    }

    pub fn is_paid_out(&self) -> bool {
        self.status == PayoutStatus::PaidOut
    }
}
