//! Parametric Claims Domain
//!
//! Claims in this system are never adjudicated by hand. An oracle reports a
//! fire severity category for the insured object and the payout follows
//! from a fixed multiplier schedule applied to the premium.
//!
//! # Settlement Lifecycle
//!
//! ```text
//! Claim:  Applied -> Confirmed
//! Payout: Expected -> PaidOut
//! ```
//!
//! Both records are created and completed inside a single oracle callback,
//! so the intermediate states are never observable from outside.

pub mod severity;
pub mod evaluation;
pub mod claim;
pub mod payout;
pub mod error;

pub use severity::FireCategory;
pub use evaluation::{ClaimEvaluator, PayoutDecision, payout_amount, MEDIUM_FIRE_MULTIPLIER, LARGE_FIRE_MULTIPLIER};
pub use claim::{Claim, ClaimStatus};
pub use payout::{Payout, PayoutStatus};
pub use error::ClaimError;
