//! Fire Policy Domain Ports
//!
//! The core depends on two collaborators it never implements itself:
//!
//! - **`UnderwritingPort`**: the ledger. It issues process ids, stores
//!   applications, records claims and payouts, and answers authorization
//!   questions.
//! - **`OraclePort`**: accepts a data request for a policy and returns a
//!   correlation id. The answer arrives later through
//!   [`crate::services::FireInsuranceService::oracle_callback`].
//!
//! # Adapters
//!
//! - `infra_db::adapters::PostgresUnderwritingAdapter` and
//!   `infra_db::adapters::OutboxOracleAdapter` for production
//! - [`mock::MockUnderwritingPort`] and [`mock::MockOraclePort`] for tests
//!   (feature `mock`)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{
    ActorId, ClaimId, DomainPort, HealthCheckable, Money, OracleId, PayoutId, PortError,
    ProcessId, RequestId,
};
use domain_claims::{Claim, Payout};

use crate::aggregate::{Application, NewApplication};

/// Roles the ledger can vouch for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The trusted data source allowed to answer requests
    Oracle,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Oracle => "oracle",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "oracle" => Some(Role::Oracle),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ledger capabilities the fire product is built on
#[async_trait]
pub trait UnderwritingPort: DomainPort + HealthCheckable {
    /// Stores a new application in the `Applied` state and issues its id
    async fn create_application(&self, application: NewApplication) -> Result<ProcessId, PortError>;

    async fn get_application(&self, process_id: ProcessId) -> Result<Application, PortError>;

    /// All applications in creation order
    async fn list_applications(&self) -> Result<Vec<Application>, PortError>;

    async fn underwrite(&self, process_id: ProcessId) -> Result<(), PortError>;

    async fn expire(&self, process_id: ProcessId) -> Result<(), PortError>;

    /// Removes an application that has not become a settled or expired
    /// policy, undoing an apply that failed part way
    async fn withdraw_application(&self, process_id: ProcessId) -> Result<(), PortError>;

    async fn create_claim(&self, process_id: ProcessId, amount: Money) -> Result<ClaimId, PortError>;

    async fn confirm_claim(&self, process_id: ProcessId, claim_id: ClaimId) -> Result<(), PortError>;

    async fn create_payout(
        &self,
        process_id: ProcessId,
        claim_id: ClaimId,
        amount: Money,
    ) -> Result<PayoutId, PortError>;

    async fn process_payout(&self, process_id: ProcessId, payout_id: PayoutId) -> Result<(), PortError>;

    /// Removes a claim together with its payouts, undoing a settlement that
    /// failed part way
    async fn withdraw_claim(&self, process_id: ProcessId, claim_id: ClaimId) -> Result<(), PortError>;

    async fn claims_for(&self, process_id: ProcessId) -> Result<Vec<Claim>, PortError>;

    async fn payouts_for(&self, process_id: ProcessId) -> Result<Vec<Payout>, PortError>;

    async fn is_authorized(&self, caller: ActorId, role: Role) -> Result<bool, PortError>;
}

/// Asynchronous data request gateway
#[async_trait]
pub trait OraclePort: DomainPort {
    /// Dispatches a request and returns immediately with its correlation id
    async fn request(
        &self,
        process_id: ProcessId,
        payload: Vec<u8>,
        callback: &str,
        oracle_id: OracleId,
    ) -> Result<RequestId, PortError>;
}

/// In-memory port implementations for testing
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::RwLock;

    use core_kernel::HealthCheckResult;

    #[derive(Debug, Default)]
    struct LedgerState {
        applications: HashMap<ProcessId, Application>,
        order: Vec<ProcessId>,
        claims: HashMap<ClaimId, Claim>,
        payouts: HashMap<PayoutId, Payout>,
        roles: HashSet<(ActorId, Role)>,
    }

    /// In-memory ledger
    #[derive(Debug, Default, Clone)]
    pub struct MockUnderwritingPort {
        state: Arc<RwLock<LedgerState>>,
        fail_underwrite: Arc<AtomicBool>,
        fail_payout: Arc<AtomicBool>,
    }

    impl MockUnderwritingPort {
        pub fn new() -> Self {
            Self::default()
        }

        /// Grants a role to an actor
        pub async fn grant(&self, actor: ActorId, role: Role) {
            self.state.write().await.roles.insert((actor, role));
        }

        /// Makes every subsequent `underwrite` call fail
        pub fn fail_underwriting(&self, fail: bool) {
            self.fail_underwrite.store(fail, Ordering::SeqCst);
        }

        /// Makes every subsequent `create_payout` call fail
        pub fn fail_payouts(&self, fail: bool) {
            self.fail_payout.store(fail, Ordering::SeqCst);
        }

        /// Replaces the stored application data, simulating a corrupted record
        pub async fn overwrite_application_data(&self, process_id: ProcessId, data: Vec<u8>) {
            if let Some(app) = self.state.write().await.applications.get_mut(&process_id) {
                app.application_data = data;
            }
        }

        pub async fn claim_count(&self) -> usize {
            self.state.read().await.claims.len()
        }

        pub async fn payout_count(&self) -> usize {
            self.state.read().await.payouts.len()
        }

        pub async fn application_count(&self) -> usize {
            self.state.read().await.applications.len()
        }
    }

    impl DomainPort for MockUnderwritingPort {}

    #[async_trait]
    impl HealthCheckable for MockUnderwritingPort {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult::healthy("mock-underwriting-port")
        }
    }

    fn transition_error(e: crate::error::PolicyError) -> PortError {
        PortError::conflict(e.to_string())
    }

    #[async_trait]
    impl UnderwritingPort for MockUnderwritingPort {
        async fn create_application(&self, application: NewApplication) -> Result<ProcessId, PortError> {
            let process_id = ProcessId::new_v7();
            let mut state = self.state.write().await;
            state.applications.insert(process_id, Application::create(process_id, application));
            state.order.push(process_id);
            Ok(process_id)
        }

        async fn get_application(&self, process_id: ProcessId) -> Result<Application, PortError> {
            self.state
                .read()
                .await
                .applications
                .get(&process_id)
                .cloned()
                .ok_or_else(|| PortError::not_found("Application", process_id))
        }

        async fn list_applications(&self) -> Result<Vec<Application>, PortError> {
            let state = self.state.read().await;
            Ok(state
                .order
                .iter()
                .filter_map(|id| state.applications.get(id).cloned())
                .collect())
        }

        async fn underwrite(&self, process_id: ProcessId) -> Result<(), PortError> {
            if self.fail_underwrite.load(Ordering::SeqCst) {
                return Err(PortError::ServiceUnavailable {
                    service: "mock-ledger".to_string(),
                });
            }
            let mut state = self.state.write().await;
            let app = state
                .applications
                .get_mut(&process_id)
                .ok_or_else(|| PortError::not_found("Application", process_id))?;
            app.underwrite().map_err(transition_error)
        }

        async fn expire(&self, process_id: ProcessId) -> Result<(), PortError> {
            let mut state = self.state.write().await;
            let app = state
                .applications
                .get_mut(&process_id)
                .ok_or_else(|| PortError::not_found("Application", process_id))?;
            app.expire().map_err(transition_error)
        }

        async fn withdraw_application(&self, process_id: ProcessId) -> Result<(), PortError> {
            let mut state = self.state.write().await;
            let app = state
                .applications
                .get(&process_id)
                .ok_or_else(|| PortError::not_found("Application", process_id))?;
            if app.state == crate::aggregate::PolicyState::Expired
                || state.claims.values().any(|c| c.process_id == process_id)
            {
                return Err(PortError::conflict(format!(
                    "Application {} can no longer be withdrawn",
                    process_id
                )));
            }
            state.applications.remove(&process_id);
            state.order.retain(|id| *id != process_id);
            Ok(())
        }

        async fn create_claim(&self, process_id: ProcessId, amount: Money) -> Result<ClaimId, PortError> {
            let claim = Claim::new(process_id, amount).map_err(|e| PortError::conflict(e.to_string()))?;
            let claim_id = claim.id;
            self.state.write().await.claims.insert(claim_id, claim);
            Ok(claim_id)
        }

        async fn confirm_claim(&self, process_id: ProcessId, claim_id: ClaimId) -> Result<(), PortError> {
            let mut state = self.state.write().await;
            let claim = state
                .claims
                .get_mut(&claim_id)
                .filter(|c| c.process_id == process_id)
                .ok_or_else(|| PortError::not_found("Claim", claim_id))?;
            claim.confirm().map_err(|e| PortError::conflict(e.to_string()))
        }

        async fn create_payout(
            &self,
            process_id: ProcessId,
            claim_id: ClaimId,
            amount: Money,
        ) -> Result<PayoutId, PortError> {
            if self.fail_payout.load(Ordering::SeqCst) {
                return Err(PortError::ServiceUnavailable {
                    service: "mock-ledger".to_string(),
                });
            }
            let mut state = self.state.write().await;
            let claim = state
                .claims
                .get(&claim_id)
                .filter(|c| c.process_id == process_id)
                .ok_or_else(|| PortError::not_found("Claim", claim_id))?;
            let payout = Payout::for_claim(claim, amount).map_err(|e| PortError::conflict(e.to_string()))?;
            let payout_id = payout.id;
            state.payouts.insert(payout_id, payout);
            Ok(payout_id)
        }

        async fn process_payout(&self, process_id: ProcessId, payout_id: PayoutId) -> Result<(), PortError> {
            let mut state = self.state.write().await;
            let payout = state
                .payouts
                .get_mut(&payout_id)
                .filter(|p| p.process_id == process_id)
                .ok_or_else(|| PortError::not_found("Payout", payout_id))?;
            payout.process().map_err(|e| PortError::conflict(e.to_string()))
        }

        async fn withdraw_claim(&self, process_id: ProcessId, claim_id: ClaimId) -> Result<(), PortError> {
            let mut state = self.state.write().await;
            if !state.claims.get(&claim_id).is_some_and(|c| c.process_id == process_id) {
                return Err(PortError::not_found("Claim", claim_id));
            }
            state.claims.remove(&claim_id);
            state.payouts.retain(|_, p| p.claim_id != claim_id);
            Ok(())
        }

        async fn claims_for(&self, process_id: ProcessId) -> Result<Vec<Claim>, PortError> {
            let state = self.state.read().await;
            let mut claims: Vec<_> = state
                .claims
                .values()
                .filter(|c| c.process_id == process_id)
                .cloned()
                .collect();
            claims.sort_by_key(|c| c.created_at);
            Ok(claims)
        }

        async fn payouts_for(&self, process_id: ProcessId) -> Result<Vec<Payout>, PortError> {
            let state = self.state.read().await;
            let mut payouts: Vec<_> = state
                .payouts
                .values()
                .filter(|p| p.process_id == process_id)
                .cloned()
                .collect();
            payouts.sort_by_key(|p| p.created_at);
            Ok(payouts)
        }

        async fn is_authorized(&self, caller: ActorId, role: Role) -> Result<bool, PortError> {
            Ok(self.state.read().await.roles.contains(&(caller, role)))
        }
    }

    /// A request captured by [`MockOraclePort`]
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct DispatchedRequest {
        pub request_id: RequestId,
        pub process_id: ProcessId,
        pub payload: Vec<u8>,
        pub callback: String,
        pub oracle_id: OracleId,
    }

    /// Oracle gateway that records requests instead of sending them
    #[derive(Debug, Default, Clone)]
    pub struct MockOraclePort {
        requests: Arc<RwLock<Vec<DispatchedRequest>>>,
        unavailable: Arc<AtomicBool>,
    }

    impl MockOraclePort {
        pub fn new() -> Self {
            Self::default()
        }

        /// Makes every subsequent request fail
        pub fn set_unavailable(&self, unavailable: bool) {
            self.unavailable.store(unavailable, Ordering::SeqCst);
        }

        pub async fn requests(&self) -> Vec<DispatchedRequest> {
            self.requests.read().await.clone()
        }
    }

    impl DomainPort for MockOraclePort {}

    #[async_trait]
    impl OraclePort for MockOraclePort {
        async fn request(
            &self,
            process_id: ProcessId,
            payload: Vec<u8>,
            callback: &str,
            oracle_id: OracleId,
        ) -> Result<RequestId, PortError> {
            if self.unavailable.load(Ordering::SeqCst) {
                return Err(PortError::ServiceUnavailable {
                    service: "mock-oracle".to_string(),
                });
            }
            let request_id = RequestId::new_v7();
            self.requests.write().await.push(DispatchedRequest {
                request_id,
                process_id,
                payload,
                callback: callback.to_string(),
                oracle_id,
            });
            Ok(request_id)
        }
    }
}
