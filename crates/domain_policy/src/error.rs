//! Policy domain errors
//!
//! Every failure aborts the triggering operation without committing any
//! registry change. Callers distinguish failures by variant, or coarsely by
//! [`ErrorKind`].

use thiserror::Error;

use core_kernel::{ActorId, MoneyError, PortError, ProcessId, RequestId};
use domain_claims::ClaimError;

use crate::params::SchemaError;

/// Errors that can occur in the policy domain
#[derive(Debug, Error)]
pub enum PolicyError {
    /// Premium must be strictly positive
    #[error("Invalid premium: {0} (must be greater than zero)")]
    InvalidPremium(String),

    /// The object already has an underwritten, unexpired policy
    #[error("Active policy already exists for object {object_name:?}")]
    ActivePolicyExists { object_name: String },

    /// Callback arrived for a policy that is unknown or no longer active
    #[error("Policy {process_id} is expired or unknown")]
    ExpiredOrUnknownPolicy { process_id: ProcessId },

    /// Expiration requested for a policy the ledger does not hold
    #[error("Policy {process_id} does not exist")]
    NonExistingPolicy { process_id: ProcessId },

    /// Expiration requested for a policy that is not active
    #[error("Policy {process_id} is already expired")]
    AlreadyExpired { process_id: ProcessId },

    /// Caller lacks the role required by the operation
    #[error("Caller {caller} is not authorized as {role}")]
    Unauthorized { caller: ActorId, role: String },

    /// A tracked oracle request points at a different policy
    #[error("Oracle request {request_id} belongs to {expected}, not {actual}")]
    CorrelationMismatch {
        request_id: RequestId,
        expected: ProcessId,
        actual: ProcessId,
    },

    /// Amounts disagree on currency or cannot be combined
    #[error("Money error: {0}")]
    Money(#[from] MoneyError),

    /// Debug enumeration index past the end of the application index
    #[error("Application index {index} out of range (count {count})")]
    ApplicationIndexOutOfRange { index: usize, count: usize },

    /// Invalid lifecycle transition
    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    /// Stored application data or an oracle payload could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[from] SchemaError),

    /// Claim or payout evaluation failed
    #[error("Claim error: {0}")]
    Claim(#[from] ClaimError),

    /// Ledger or oracle collaborator failed
    #[error("Port error: {0}")]
    Port(#[from] PortError),
}

/// Coarse error taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller-fixable input or state problem
    Validation,
    /// Caller lacks the required identity
    Authorization,
    /// Malformed stored data or oracle response
    Decode,
    /// Collaborator failure
    Infrastructure,
}

impl PolicyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PolicyError::InvalidPremium(_)
            | PolicyError::ActivePolicyExists { .. }
            | PolicyError::ExpiredOrUnknownPolicy { .. }
            | PolicyError::NonExistingPolicy { .. }
            | PolicyError::AlreadyExpired { .. }
            | PolicyError::CorrelationMismatch { .. }
            | PolicyError::Money(_)
            | PolicyError::ApplicationIndexOutOfRange { .. }
            | PolicyError::InvalidStateTransition { .. } => ErrorKind::Validation,
            PolicyError::Unauthorized { .. } => ErrorKind::Authorization,
            PolicyError::Decode(_) => ErrorKind::Decode,
            PolicyError::Claim(_) | PolicyError::Port(_) => ErrorKind::Infrastructure,
        }
    }

    /// Stable machine-readable name of the failure
    pub fn code(&self) -> &'static str {
        match self {
            PolicyError::InvalidPremium(_) => "invalid_premium",
            PolicyError::ActivePolicyExists { .. } => "active_policy_exists",
            PolicyError::ExpiredOrUnknownPolicy { .. } => "expired_or_unknown_policy",
            PolicyError::NonExistingPolicy { .. } => "non_existing_policy",
            PolicyError::AlreadyExpired { .. } => "already_expired",
            PolicyError::Unauthorized { .. } => "unauthorized",
            PolicyError::CorrelationMismatch { .. } => "correlation_mismatch",
            PolicyError::Money(MoneyError::CurrencyMismatch(_, _)) => "currency_mismatch",
            PolicyError::Money(_) => "money_error",
            PolicyError::ApplicationIndexOutOfRange { .. } => "application_index_out_of_range",
            PolicyError::InvalidStateTransition { .. } => "invalid_state_transition",
            PolicyError::Decode(_) => "decode_error",
            PolicyError::Claim(_) => "claim_error",
            PolicyError::Port(_) => "port_error",
        }
    }

    pub fn unauthorized(caller: ActorId, role: impl std::fmt::Display) -> Self {
        PolicyError::Unauthorized {
            caller,
            role: role.to_string(),
        }
    }
}
