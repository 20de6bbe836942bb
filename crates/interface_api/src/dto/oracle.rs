//! Oracle DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::{ClaimId, Money, OracleId, PayoutId, ProcessId, RequestId};
use domain_policy::{CallbackOutcome, OracleRequest, ProductConfig};

#[derive(Debug, Serialize)]
pub struct OracleInfoResponse {
    pub oracle_id: OracleId,
    pub product_name: String,
    pub product_version: String,
    pub callback: String,
    pub currency: String,
}

impl From<&ProductConfig> for OracleInfoResponse {
    fn from(product: &ProductConfig) -> Self {
        Self {
            oracle_id: product.oracle_id,
            product_name: product.product_name.clone(),
            product_version: product.product_version.clone(),
            callback: product.callback.clone(),
            currency: product.currency.code().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OutstandingRequestResponse {
    pub request_id: RequestId,
    pub process_id: ProcessId,
    pub object_name: String,
    pub requested_at: DateTime<Utc>,
}

impl From<OracleRequest> for OutstandingRequestResponse {
    fn from(request: OracleRequest) -> Self {
        Self {
            request_id: request.request_id,
            process_id: request.process_id,
            object_name: request.object_name,
            requested_at: request.requested_at,
        }
    }
}

/// Oracle answer; `response` is the encoded `fire.oracle_response` envelope
#[derive(Debug, Deserialize)]
pub struct OracleCallbackRequest {
    pub request_id: Uuid,
    pub process_id: Uuid,
    pub response: serde_json::Value,
}

#[derive(Debug, Serialize)]
pub struct CallbackResponse {
    pub process_id: ProcessId,
    pub fire_category: String,
    pub settled: bool,
    pub claim_id: Option<ClaimId>,
    pub payout_id: Option<PayoutId>,
    pub payout_amount: Option<Money>,
}

impl From<CallbackOutcome> for CallbackResponse {
    fn from(outcome: CallbackOutcome) -> Self {
        let settlement = outcome.settlement;
        Self {
            process_id: outcome.process_id,
            fire_category: outcome.category.to_string(),
            settled: settlement.is_some(),
            claim_id: settlement.map(|s| s.claim_id),
            payout_id: settlement.map(|s| s.payout_id),
            payout_amount: settlement.map(|s| s.amount),
        }
    }
}
