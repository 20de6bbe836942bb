//! Payout evaluation
//!
//! The schedule is fixed: no interpolation, no proration, no cap at the sum
//! insured.
//!
//! | category | payout          |
//! |----------|-----------------|
//! | `M`      | premium x 5     |
//! | `L`      | premium x 100   |
//! | other    | 0               |

use serde::{Deserialize, Serialize};

use core_kernel::Money;
use crate::error::ClaimError;
use crate::severity::FireCategory;

pub const MEDIUM_FIRE_MULTIPLIER: u32 = 5;
pub const LARGE_FIRE_MULTIPLIER: u32 = 100;

/// Computes the payout for a premium and an observed category
///
/// # Errors
///
/// Returns `ClaimError::AmountOverflow` if the multiplied premium does not fit
/// in a decimal.
pub fn payout_amount(premium: Money, category: FireCategory) -> Result<Money, ClaimError> {
    let multiplier = match category {
        FireCategory::Medium => MEDIUM_FIRE_MULTIPLIER,
        FireCategory::Large => LARGE_FIRE_MULTIPLIER,
        FireCategory::BelowThreshold(_) => return Ok(Money::zero(premium.currency())),
    };
    premium
        .checked_mul(multiplier)
        .map_err(|_| ClaimError::AmountOverflow {
            premium: premium.to_string(),
            multiplier,
        })
}

/// Outcome of evaluating an oracle response against a policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PayoutDecision {
    /// A claim and payout of this amount must be settled
    Settle { category: FireCategory, amount: Money },
    /// The fire was below the threshold; nothing is created
    NoClaim { category: FireCategory },
}

impl PayoutDecision {
    pub fn category(&self) -> FireCategory {
        match self {
            PayoutDecision::Settle { category, .. } => *category,
            PayoutDecision::NoClaim { category } => *category,
        }
    }

    pub fn amount(&self) -> Option<Money> {
        match self {
            PayoutDecision::Settle { amount, .. } => Some(*amount),
            PayoutDecision::NoClaim { .. } => None,
        }
    }
}

/// Stateless evaluator turning a category into a settlement decision
#[derive(Debug, Clone, Copy, Default)]
pub struct ClaimEvaluator;

impl ClaimEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Evaluates the schedule and decides whether anything must be settled
    pub fn evaluate(&self, premium: Money, category: FireCategory) -> Result<PayoutDecision, ClaimError> {
        let amount = payout_amount(premium, category)?;
        if amount.is_positive() {
            tracing::debug!(%category, %amount, "Fire category qualifies for payout");
            Ok(PayoutDecision::Settle { category, amount })
        } else {
            tracing::debug!(%category, "Fire category below payout threshold");
            Ok(PayoutDecision::NoClaim { category })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn premium() -> Money {
        Money::new(dec!(100), Currency::USD)
    }

    #[test]
    fn test_medium_fire_pays_five_times_premium() {
        let amount = payout_amount(premium(), FireCategory::Medium).unwrap();
        assert_eq!(amount.amount(), dec!(500));
    }

    #[test]
    fn test_large_fire_pays_hundred_times_premium() {
        let amount = payout_amount(premium(), FireCategory::Large).unwrap();
        assert_eq!(amount.amount(), dec!(10000));
    }

    #[test]
    fn test_small_fire_pays_nothing() {
        let amount = payout_amount(premium(), FireCategory::BelowThreshold('S')).unwrap();
        assert!(amount.is_zero());
        assert_eq!(amount.currency(), Currency::USD);
    }

    #[test]
    fn test_evaluator_no_claim_decision() {
        let decision = ClaimEvaluator::new()
            .evaluate(premium(), FireCategory::BelowThreshold('S'))
            .unwrap();
        assert_eq!(decision, PayoutDecision::NoClaim { category: FireCategory::BelowThreshold('S') });
        assert_eq!(decision.amount(), None);
    }
}
