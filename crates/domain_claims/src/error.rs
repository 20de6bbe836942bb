//! Claims domain errors

use thiserror::Error;

/// Errors that can occur in the claims domain
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClaimError {
    #[error("Invalid fire category code: {0:?}")]
    InvalidCategoryCode(String),

    #[error("Payout overflow: {premium} x {multiplier}")]
    AmountOverflow { premium: String, multiplier: u32 },

    #[error("Claim amount must be positive, got {0}")]
    NonPositiveAmount(String),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Payout of {payout} does not match claim amount {claim}")]
    AmountMismatch { claim: String, payout: String },
}
