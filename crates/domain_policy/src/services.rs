//! Fire insurance service
//!
//! Orchestrates the policy lifecycle against the ledger and the oracle:
//!
//! ```text
//! apply_for_policy ──► create ─► underwrite ─► oracle request ─► registry
//!                                                   ┆
//!                                          (later, separately)
//!                                                   ┆
//! oracle_callback ◄─────────────────────────────────┘
//!       └─► evaluate ─► claim + confirm ─► payout + process
//!
//! expire_policy ─► ledger expire ─► registry
//! ```
//!
//! Every public operation holds the registry lock from start to finish, so
//! operations never interleave. Registry changes are applied only after all
//! collaborator calls of an operation have succeeded, and a failed apply or
//! settlement withdraws whatever it already wrote to the ledger.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

use core_kernel::{ActorId, ClaimId, Money, OracleId, PayoutId, PortError, ProcessId, RequestId};
use domain_claims::{Claim, ClaimEvaluator, FireCategory, Payout, PayoutDecision};

use crate::aggregate::{Application, NewApplication, PolicyState};
use crate::error::PolicyError;
use crate::events::{EventPublisher, FireInsuranceEvent};
use crate::params::{ApplicationData, OracleRequestParams, OracleResponse, ParameterSchema};
use crate::ports::{OraclePort, Role, UnderwritingPort};
use crate::product::ProductConfig;
use crate::registry::{Correlation, OracleRequest, PolicyRegistry};

/// Identifiers returned by a successful application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationReceipt {
    pub process_id: ProcessId,
    pub request_id: RequestId,
}

/// Claim and payout created by a qualifying callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub claim_id: ClaimId,
    pub payout_id: PayoutId,
    pub amount: Money,
}

/// Result of a processed oracle callback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackOutcome {
    pub process_id: ProcessId,
    pub category: FireCategory,
    /// `None` when the category was below the payout threshold
    pub settlement: Option<Settlement>,
}

/// Read model of a single policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyView {
    pub application: Application,
    pub object_name: String,
    /// True if this policy is the registry's active policy for its object
    pub active: bool,
    pub claims: Vec<Claim>,
    pub payouts: Vec<Payout>,
}

/// Service for the parametric fire insurance product
pub struct FireInsuranceService {
    underwriting: Arc<dyn UnderwritingPort>,
    oracle: Arc<dyn OraclePort>,
    events: Arc<dyn EventPublisher>,
    evaluator: ClaimEvaluator,
    product: ProductConfig,
    registry: Mutex<PolicyRegistry>,
}

impl FireInsuranceService {
    /// Creates a service with an empty registry
    pub fn new(
        underwriting: Arc<dyn UnderwritingPort>,
        oracle: Arc<dyn OraclePort>,
        events: Arc<dyn EventPublisher>,
        product: ProductConfig,
    ) -> Self {
        Self {
            underwriting,
            oracle,
            events,
            evaluator: ClaimEvaluator::new(),
            product,
            registry: Mutex::new(PolicyRegistry::new()),
        }
    }

    pub fn product(&self) -> &ProductConfig {
        &self.product
    }

    pub fn underwriting(&self) -> &Arc<dyn UnderwritingPort> {
        &self.underwriting
    }

    /// Rebuilds the registry from the ledger's applications
    ///
    /// Intended for startup, before the service handles requests. Returns the
    /// number of active policies found.
    ///
    /// # Errors
    ///
    /// Fails if the ledger is unreachable or any stored application data
    /// cannot be decoded.
    #[instrument(skip(self))]
    pub async fn restore(&self) -> Result<usize, PolicyError> {
        let mut registry = self.registry.lock().await;
        let applications = self.underwriting.list_applications().await?;

        let mut entries = Vec::with_capacity(applications.len());
        for application in applications {
            let data = ApplicationData::decode(&application.application_data)?;
            entries.push((application.process_id, data.object_name, application.is_underwritten()));
        }

        *registry = PolicyRegistry::restore(entries);
        let active = registry.active_count();
        info!(
            applications = registry.application_count(),
            active,
            "Policy registry restored from ledger"
        );
        Ok(active)
    }

    /// Applies for a policy on `object_name`, underwrites it and requests fire data
    ///
    /// # Errors
    ///
    /// - `InvalidPremium` if the premium is not strictly positive
    /// - `Money` if an amount is not in the product currency
    /// - `ActivePolicyExists` if the object is already covered
    /// - `Port` if the ledger or the oracle fails; the registry is unchanged
    ///   and an application already written to the ledger is withdrawn
    #[instrument(skip(self, premium, sum_insured), fields(holder = %holder))]
    pub async fn apply_for_policy(
        &self,
        holder: ActorId,
        object_name: &str,
        premium: Money,
        sum_insured: Money,
    ) -> Result<ApplicationReceipt, PolicyError> {
        let mut registry = self.registry.lock().await;

        if !premium.is_positive() {
            return Err(PolicyError::InvalidPremium(premium.to_string()));
        }
        let product_currency = Money::zero(self.product.currency);
        premium.ensure_same_currency(&product_currency)?;
        sum_insured.ensure_same_currency(&product_currency)?;

        if registry.is_active(object_name) {
            return Err(PolicyError::ActivePolicyExists {
                object_name: object_name.to_string(),
            });
        }

        let application_data = ApplicationData {
            policy_holder: holder,
            object_name: object_name.to_string(),
            premium,
        }
        .encode()?;
        let query = OracleRequestParams {
            object_name: object_name.to_string(),
        }
        .encode()?;

        let process_id = self
            .underwriting
            .create_application(NewApplication {
                policy_holder: holder,
                premium_amount: premium,
                sum_insured_amount: sum_insured,
                application_data,
            })
            .await?;
        let request_id = match self.underwrite_and_request(process_id, query).await {
            Ok(request_id) => request_id,
            Err(e) => {
                self.withdraw_application(process_id).await;
                return Err(e);
            }
        };

        registry.activate(object_name, process_id);
        registry.record_application(process_id);
        registry.track_request(OracleRequest::new(request_id, process_id, object_name));

        info!(%process_id, %request_id, object_name, "Fire policy underwritten");
        self.events.publish(FireInsuranceEvent::PolicyCreated {
            holder,
            object_name: object_name.to_string(),
            policy_id: process_id,
            timestamp: Utc::now(),
        });

        Ok(ApplicationReceipt { process_id, request_id })
    }

    async fn underwrite_and_request(&self, process_id: ProcessId, query: Vec<u8>) -> Result<RequestId, PolicyError> {
        self.underwriting.underwrite(process_id).await?;
        let request_id = self
            .oracle
            .request(process_id, query, &self.product.callback, self.product.oracle_id)
            .await?;
        Ok(request_id)
    }

    /// Removes the ledger record of an apply that failed after creation
    async fn withdraw_application(&self, process_id: ProcessId) {
        match self.underwriting.withdraw_application(process_id).await {
            Ok(()) => warn!(%process_id, "Application withdrawn after failed apply"),
            Err(e) => error!(%process_id, error = %e, "Failed to withdraw application, ledger record left behind"),
        }
    }

    /// Handles the oracle's answer for a policy
    ///
    /// The receipt event is published as soon as the caller is known to be
    /// the oracle, before the policy is validated.
    ///
    /// # Errors
    ///
    /// - `Unauthorized` unless the ledger vouches for `caller` as oracle
    /// - `ExpiredOrUnknownPolicy` if the policy is unknown or not active
    /// - `CorrelationMismatch` if `request_id` was issued for another policy
    /// - `Decode` if the stored data or the response is malformed
    #[instrument(skip(self, response), fields(%request_id, %process_id))]
    pub async fn oracle_callback(
        &self,
        caller: ActorId,
        request_id: RequestId,
        process_id: ProcessId,
        response: &[u8],
    ) -> Result<CallbackOutcome, PolicyError> {
        if !self.underwriting.is_authorized(caller, Role::Oracle).await? {
            warn!(%caller, "Oracle callback from unauthorized caller");
            return Err(PolicyError::unauthorized(caller, Role::Oracle));
        }

        let mut registry = self.registry.lock().await;

        self.events.publish(FireInsuranceEvent::OracleCallbackReceived {
            request_id,
            policy_id: process_id,
            raw_response: response.to_vec(),
            timestamp: Utc::now(),
        });

        let application = match self.underwriting.get_application(process_id).await {
            Ok(application) => application,
            Err(PortError::NotFound { .. }) => {
                return Err(PolicyError::ExpiredOrUnknownPolicy { process_id });
            }
            Err(e) => return Err(e.into()),
        };
        let data = ApplicationData::decode(&application.application_data)?;

        if !registry.is_active_policy(&data.object_name, process_id) {
            return Err(PolicyError::ExpiredOrUnknownPolicy { process_id });
        }

        match registry.correlate(request_id, process_id) {
            Correlation::Matches => {}
            Correlation::Mismatch { expected } => {
                return Err(PolicyError::CorrelationMismatch {
                    request_id,
                    expected,
                    actual: process_id,
                });
            }
            Correlation::Closed => warn!("Repeated callback for a closed oracle request"),
            Correlation::Untracked => debug!("Callback for an untracked oracle request"),
        }

        let category = OracleResponse::decode(response)?.fire_category;
        let decision = self.evaluator.evaluate(data.premium, category)?;

        let settlement = match decision {
            PayoutDecision::Settle { amount, .. } => Some(self.settle(process_id, amount).await?),
            PayoutDecision::NoClaim { .. } => {
                info!(%category, "Fire below payout threshold, no claim created");
                None
            }
        };

        registry.mark_responded(request_id);

        Ok(CallbackOutcome {
            process_id,
            category,
            settlement,
        })
    }

    /// Creates, confirms and pays out a claim for `amount`
    ///
    /// Either all four ledger steps succeed and both settlement events are
    /// published, or the claim is withdrawn and nothing is published.
    async fn settle(&self, process_id: ProcessId, amount: Money) -> Result<Settlement, PolicyError> {
        let claim_id = self.underwriting.create_claim(process_id, amount).await?;
        let payout_id = match self.confirm_and_pay(process_id, claim_id, amount).await {
            Ok(payout_id) => payout_id,
            Err(e) => {
                match self.underwriting.withdraw_claim(process_id, claim_id).await {
                    Ok(()) => warn!(%claim_id, error = %e, "Settlement failed, claim withdrawn"),
                    Err(undo) => error!(%claim_id, error = %e, undo_error = %undo, "Settlement failed, claim left behind"),
                }
                return Err(e);
            }
        };

        info!(%claim_id, %payout_id, %amount, "Claim confirmed and paid out");
        let timestamp = Utc::now();
        self.events.publish(FireInsuranceEvent::ClaimConfirmed {
            policy_id: process_id,
            claim_id,
            payout_amount: amount,
            timestamp,
        });
        self.events.publish(FireInsuranceEvent::PayoutExecuted {
            policy_id: process_id,
            claim_id,
            payout_id,
            payout_amount: amount,
            timestamp,
        });

        Ok(Settlement {
            claim_id,
            payout_id,
            amount,
        })
    }

    async fn confirm_and_pay(
        &self,
        process_id: ProcessId,
        claim_id: ClaimId,
        amount: Money,
    ) -> Result<PayoutId, PolicyError> {
        self.underwriting.confirm_claim(process_id, claim_id).await?;
        let payout_id = self.underwriting.create_payout(process_id, claim_id, amount).await?;
        self.underwriting.process_payout(process_id, payout_id).await?;
        Ok(payout_id)
    }

    /// Ends coverage for a policy
    ///
    /// Outstanding oracle requests are orphaned, not cancelled.
    ///
    /// # Errors
    ///
    /// - `NonExistingPolicy` if the ledger has no such policy or its stored
    ///   premium is not positive
    /// - `AlreadyExpired` if the policy is not the object's active policy
    #[instrument(skip(self), fields(%process_id))]
    pub async fn expire_policy(&self, process_id: ProcessId) -> Result<(), PolicyError> {
        let mut registry = self.registry.lock().await;

        let application = match self.underwriting.get_application(process_id).await {
            Ok(application) => application,
            Err(PortError::NotFound { .. }) => {
                return Err(PolicyError::NonExistingPolicy { process_id });
            }
            Err(e) => return Err(e.into()),
        };
        let data = ApplicationData::decode(&application.application_data)?;

        if !data.premium.is_positive() {
            return Err(PolicyError::NonExistingPolicy { process_id });
        }
        if !registry.is_active_policy(&data.object_name, process_id) {
            return Err(PolicyError::AlreadyExpired { process_id });
        }

        self.underwriting.expire(process_id).await?;

        registry.deactivate(&data.object_name);
        let orphaned = registry.orphan_requests(process_id);
        if orphaned > 0 {
            debug!(orphaned, "Outstanding oracle requests orphaned by expiration");
        }

        info!(object_name = %data.object_name, "Fire policy expired");
        self.events.publish(FireInsuranceEvent::PolicyExpired {
            object_name: data.object_name,
            policy_id: process_id,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    pub fn oracle_id(&self) -> OracleId {
        self.product.oracle_id
    }

    /// Number of applications in the debug index
    pub async fn applications(&self) -> usize {
        self.registry.lock().await.application_count()
    }

    /// Process id at `index` in the debug index
    pub async fn application_id(&self, index: usize) -> Result<ProcessId, PolicyError> {
        let registry = self.registry.lock().await;
        registry
            .application_at(index)
            .ok_or(PolicyError::ApplicationIndexOutOfRange {
                index,
                count: registry.application_count(),
            })
    }

    /// Oracle requests still waiting for a callback
    pub async fn outstanding_requests(&self) -> Vec<OracleRequest> {
        self.registry.lock().await.outstanding_requests()
    }

    /// Loads a policy together with its claims and payouts
    pub async fn policy(&self, process_id: ProcessId) -> Result<PolicyView, PolicyError> {
        let registry = self.registry.lock().await;

        let application = match self.underwriting.get_application(process_id).await {
            Ok(application) => application,
            Err(PortError::NotFound { .. }) => {
                return Err(PolicyError::NonExistingPolicy { process_id });
            }
            Err(e) => return Err(e.into()),
        };
        let data = ApplicationData::decode(&application.application_data)?;
        let active = application.state == PolicyState::Underwritten
            && registry.is_active_policy(&data.object_name, process_id);

        let claims = self.underwriting.claims_for(process_id).await?;
        let payouts = self.underwriting.payouts_for(process_id).await?;

        Ok(PolicyView {
            application,
            object_name: data.object_name,
            active,
            claims,
            payouts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::RecordingEventPublisher;
    use crate::ports::mock::{MockOraclePort, MockUnderwritingPort};
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    struct Fixture {
        service: FireInsuranceService,
        ledger: MockUnderwritingPort,
        oracle: MockOraclePort,
        events: RecordingEventPublisher,
        oracle_actor: ActorId,
        holder: ActorId,
    }

    async fn fixture() -> Fixture {
        let ledger = MockUnderwritingPort::new();
        let oracle = MockOraclePort::new();
        let events = RecordingEventPublisher::new();
        let oracle_actor = ActorId::new();
        ledger.grant(oracle_actor, Role::Oracle).await;

        let service = FireInsuranceService::new(
            Arc::new(ledger.clone()),
            Arc::new(oracle.clone()),
            Arc::new(events.clone()),
            ProductConfig::new(OracleId::new(), Currency::USD),
        );
        Fixture {
            service,
            ledger,
            oracle,
            events,
            oracle_actor,
            holder: ActorId::new(),
        }
    }

    fn usd(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::USD)
    }

    fn response(code: char) -> Vec<u8> {
        OracleResponse { fire_category: FireCategory::from(code) }.encode().unwrap()
    }

    impl Fixture {
        async fn apply_house(&self) -> ApplicationReceipt {
            self.service
                .apply_for_policy(self.holder, "house-1", usd(dec!(100)), usd(dec!(10000)))
                .await
                .unwrap()
        }
    }

    #[tokio::test]
    async fn test_apply_underwrites_and_requests_data() {
        let f = fixture().await;
        let receipt = f.apply_house().await;

        let app = f.ledger.get_application(receipt.process_id).await.unwrap();
        assert_eq!(app.state, PolicyState::Underwritten);

        let requests = f.oracle.requests().await;
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].request_id, receipt.request_id);
        assert_eq!(requests[0].callback, "oracle_callback");
        let query = OracleRequestParams::decode(&requests[0].payload).unwrap();
        assert_eq!(query.object_name, "house-1");

        assert_eq!(f.service.applications().await, 1);
        assert_eq!(f.service.application_id(0).await.unwrap(), receipt.process_id);
        assert_eq!(f.events.event_types(), vec!["PolicyCreated"]);
    }

    #[tokio::test]
    async fn test_second_apply_for_active_object_fails() {
        let f = fixture().await;
        f.apply_house().await;

        let result = f
            .service
            .apply_for_policy(f.holder, "house-1", usd(dec!(100)), usd(dec!(10000)))
            .await;
        assert!(matches!(result, Err(PolicyError::ActivePolicyExists { .. })));
        assert_eq!(f.ledger.application_count().await, 1);
    }

    #[tokio::test]
    async fn test_zero_premium_rejected() {
        let f = fixture().await;
        let result = f
            .service
            .apply_for_policy(f.holder, "house-1", usd(dec!(0)), usd(dec!(10000)))
            .await;
        assert!(matches!(result, Err(PolicyError::InvalidPremium(_))));
        assert_eq!(f.ledger.application_count().await, 0);
        assert!(f.events.events().is_empty());
    }

    #[tokio::test]
    async fn test_failed_underwriting_leaves_registry_untouched() {
        let f = fixture().await;
        f.ledger.fail_underwriting(true);

        let result = f
            .service
            .apply_for_policy(f.holder, "house-1", usd(dec!(100)), usd(dec!(10000)))
            .await;
        assert!(matches!(result, Err(PolicyError::Port(_))));
        assert_eq!(f.service.applications().await, 0);
        assert_eq!(f.ledger.application_count().await, 0);

        f.ledger.fail_underwriting(false);
        assert!(f
            .service
            .apply_for_policy(f.holder, "house-1", usd(dec!(100)), usd(dec!(10000)))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_oracle_outage_withdraws_underwritten_application() {
        let f = fixture().await;
        f.oracle.set_unavailable(true);

        let result = f
            .service
            .apply_for_policy(f.holder, "house-1", usd(dec!(100)), usd(dec!(10000)))
            .await;
        assert!(matches!(result, Err(PolicyError::Port(_))));
        assert_eq!(f.ledger.application_count().await, 0);
        assert!(f.events.events().is_empty());

        f.oracle.set_unavailable(false);
        let receipt = f.apply_house().await;
        f.service.expire_policy(receipt.process_id).await.unwrap();

        let restarted = FireInsuranceService::new(
            Arc::new(f.ledger.clone()),
            Arc::new(f.oracle.clone()),
            Arc::new(f.events.clone()),
            ProductConfig::new(OracleId::new(), Currency::USD),
        );
        assert_eq!(restarted.restore().await.unwrap(), 0);
        assert!(restarted
            .apply_for_policy(f.holder, "house-1", usd(dec!(100)), usd(dec!(10000)))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_failed_payout_withdraws_claim_and_publishes_nothing() {
        let f = fixture().await;
        let receipt = f.apply_house().await;
        f.ledger.fail_payouts(true);

        let result = f
            .service
            .oracle_callback(f.oracle_actor, receipt.request_id, receipt.process_id, &response('M'))
            .await;
        assert!(matches!(result, Err(PolicyError::Port(_))));
        assert_eq!(f.ledger.claim_count().await, 0);
        assert_eq!(f.ledger.payout_count().await, 0);
        assert_eq!(f.events.event_types(), vec!["PolicyCreated", "OracleCallbackReceived"]);
        assert_eq!(f.service.outstanding_requests().await.len(), 1);

        f.ledger.fail_payouts(false);
        let outcome = f
            .service
            .oracle_callback(f.oracle_actor, receipt.request_id, receipt.process_id, &response('M'))
            .await
            .unwrap();
        assert!(outcome.settlement.is_some());
        assert_eq!(f.ledger.claim_count().await, 1);
        assert_eq!(f.ledger.payout_count().await, 1);
    }

    #[tokio::test]
    async fn test_medium_fire_settles_five_times_premium() {
        let f = fixture().await;
        let receipt = f.apply_house().await;

        let outcome = f
            .service
            .oracle_callback(f.oracle_actor, receipt.request_id, receipt.process_id, &response('M'))
            .await
            .unwrap();

        let settlement = outcome.settlement.unwrap();
        assert_eq!(settlement.amount, usd(dec!(500)));
        assert_eq!(
            f.events.event_types(),
            vec!["PolicyCreated", "OracleCallbackReceived", "ClaimConfirmed", "PayoutExecuted"]
        );
        assert!(f.service.outstanding_requests().await.is_empty());
    }

    #[tokio::test]
    async fn test_callback_from_non_oracle_rejected() {
        let f = fixture().await;
        let receipt = f.apply_house().await;

        let result = f
            .service
            .oracle_callback(f.holder, receipt.request_id, receipt.process_id, &response('L'))
            .await;
        assert!(matches!(result, Err(PolicyError::Unauthorized { .. })));
        assert_eq!(f.events.event_types(), vec!["PolicyCreated"]);
    }

    #[tokio::test]
    async fn test_expire_twice_fails_already_expired() {
        let f = fixture().await;
        let receipt = f.apply_house().await;

        f.service.expire_policy(receipt.process_id).await.unwrap();
        let result = f.service.expire_policy(receipt.process_id).await;
        assert!(matches!(result, Err(PolicyError::AlreadyExpired { .. })));
    }

    #[tokio::test]
    async fn test_application_index_out_of_range() {
        let f = fixture().await;
        let result = f.service.application_id(3).await;
        assert!(matches!(
            result,
            Err(PolicyError::ApplicationIndexOutOfRange { index: 3, count: 0 })
        ));
    }
}
