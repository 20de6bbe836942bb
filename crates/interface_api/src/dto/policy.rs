//! Policy DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use core_kernel::{ActorId, ClaimId, Money, PayoutId, ProcessId, RequestId, MONEY_SCALE};
use domain_claims::{Claim, Payout};
use domain_policy::{ApplicationReceipt, PolicyView};

#[derive(Debug, Deserialize, Validate)]
pub struct ApplyForPolicyRequest {
    #[validate(length(min = 1, max = 200))]
    pub object_name: String,
    #[validate(custom(function = "within_money_scale"))]
    pub premium: Decimal,
    #[validate(custom(function = "within_money_scale"))]
    pub sum_insured: Decimal,
    /// Defaults to the product currency
    #[validate(length(equal = 3))]
    pub currency: Option<String>,
}

/// Rejects amounts that `Money` would round
fn within_money_scale(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.normalize().scale() > MONEY_SCALE {
        let mut error = ValidationError::new("money_scale");
        error.message = Some(format!("at most {MONEY_SCALE} decimal places").into());
        return Err(error);
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct ApplicationReceiptResponse {
    pub process_id: ProcessId,
    pub request_id: RequestId,
}

impl From<ApplicationReceipt> for ApplicationReceiptResponse {
    fn from(receipt: ApplicationReceipt) -> Self {
        Self {
            process_id: receipt.process_id,
            request_id: receipt.request_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PolicyListResponse {
    pub count: usize,
    pub process_ids: Vec<ProcessId>,
}

#[derive(Debug, Serialize)]
pub struct ClaimResponse {
    pub claim_id: ClaimId,
    pub amount: Money,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<Claim> for ClaimResponse {
    fn from(claim: Claim) -> Self {
        Self {
            claim_id: claim.id,
            amount: claim.amount,
            status: claim.status.as_str().to_string(),
            created_at: claim.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PayoutResponse {
    pub payout_id: PayoutId,
    pub claim_id: ClaimId,
    pub amount: Money,
    pub status: String,
    pub paid_at: Option<DateTime<Utc>>,
}

impl From<Payout> for PayoutResponse {
    fn from(payout: Payout) -> Self {
        Self {
            payout_id: payout.id,
            claim_id: payout.claim_id,
            amount: payout.amount,
            status: payout.status.as_str().to_string(),
            paid_at: payout.paid_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PolicyResponse {
    pub process_id: ProcessId,
    pub object_name: String,
    pub policy_holder: ActorId,
    pub state: String,
    pub active: bool,
    pub premium: Money,
    pub sum_insured: Money,
    pub claims: Vec<ClaimResponse>,
    pub payouts: Vec<PayoutResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PolicyView> for PolicyResponse {
    fn from(view: PolicyView) -> Self {
        let application = view.application;
        Self {
            process_id: application.process_id,
            object_name: view.object_name,
            policy_holder: application.policy_holder,
            state: application.state.as_str().to_string(),
            active: view.active,
            premium: application.premium_amount,
            sum_insured: application.sum_insured_amount,
            claims: view.claims.into_iter().map(Into::into).collect(),
            payouts: view.payouts.into_iter().map(Into::into).collect(),
            created_at: application.created_at,
            updated_at: application.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn request(premium: Decimal) -> ApplyForPolicyRequest {
        ApplyForPolicyRequest {
            object_name: "house-1".to_string(),
            premium,
            sum_insured: dec!(10000),
            currency: None,
        }
    }

    #[test]
    fn test_amount_within_money_scale_accepted() {
        assert!(request(dec!(0.0001)).validate().is_ok());
        assert!(request(dec!(100.50000)).validate().is_ok());
    }

    #[test]
    fn test_amount_below_smallest_step_rejected() {
        let errors = request(dec!(0.00004)).validate().unwrap_err();
        let fields = errors.field_errors();
        assert_eq!(fields["premium"][0].code, "money_scale");
        assert!(!fields.contains_key("sum_insured"));
    }
}
