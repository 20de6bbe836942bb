//! Test Data Builders
//!
//! [`ServiceHarness`] wires a [`FireInsuranceService`] to in-memory ports and
//! keeps handles on them so tests can inspect the ledger, the dispatched
//! oracle requests and the published events.

use std::sync::Arc;

use core_kernel::{ActorId, Currency, Money, OracleId, ProcessId, RequestId};
use domain_policy::ports::mock::{MockOraclePort, MockUnderwritingPort};
use domain_policy::{
    ApplicationReceipt, CallbackOutcome, FireInsuranceService, PolicyError, ProductConfig,
    RecordingEventPublisher, Role,
};

use crate::fixtures::{MoneyFixtures, ResponseFixtures};

/// Builder for [`ServiceHarness`]
pub struct ServiceHarnessBuilder {
    currency: Currency,
    oracle_id: OracleId,
    product_name: Option<String>,
}

impl Default for ServiceHarnessBuilder {
    fn default() -> Self {
        Self {
            currency: Currency::USD,
            oracle_id: OracleId::new(),
            product_name: None,
        }
    }
}

impl ServiceHarnessBuilder {
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    pub fn with_oracle_id(mut self, oracle_id: OracleId) -> Self {
        self.oracle_id = oracle_id;
        self
    }

    pub fn with_product_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = Some(name.into());
        self
    }

    /// Builds the harness and registers one oracle actor with the ledger
    pub async fn build(self) -> ServiceHarness {
        let ledger = MockUnderwritingPort::new();
        let oracle = MockOraclePort::new();
        let events = RecordingEventPublisher::new();
        let oracle_actor = ActorId::new();
        ledger.grant(oracle_actor, Role::Oracle).await;

        let mut product = ProductConfig::new(self.oracle_id, self.currency);
        if let Some(name) = self.product_name {
            product = product.with_product_name(name);
        }

        let service = FireInsuranceService::new(
            Arc::new(ledger.clone()),
            Arc::new(oracle.clone()),
            Arc::new(events.clone()),
            product,
        );

        ServiceHarness {
            service,
            ledger,
            oracle,
            events,
            oracle_actor,
            holder: ActorId::new(),
        }
    }
}

/// A service under test together with its in-memory collaborators
pub struct ServiceHarness {
    pub service: FireInsuranceService,
    pub ledger: MockUnderwritingPort,
    pub oracle: MockOraclePort,
    pub events: RecordingEventPublisher,
    /// Actor the ledger vouches for as oracle
    pub oracle_actor: ActorId,
    /// Default policy holder
    pub holder: ActorId,
}

impl ServiceHarness {
    pub fn builder() -> ServiceHarnessBuilder {
        ServiceHarnessBuilder::default()
    }

    /// A USD harness with default settings
    pub async fn new() -> Self {
        Self::builder().build().await
    }

    /// Applies with the reference premium and sum insured
    pub async fn apply(&self, object_name: &str) -> Result<ApplicationReceipt, PolicyError> {
        self.apply_with_premium(object_name, MoneyFixtures::usd_premium()).await
    }

    pub async fn apply_with_premium(
        &self,
        object_name: &str,
        premium: Money,
    ) -> Result<ApplicationReceipt, PolicyError> {
        self.service
            .apply_for_policy(self.holder, object_name, premium, MoneyFixtures::usd_sum_insured())
            .await
    }

    /// Delivers a category from the registered oracle actor
    pub async fn respond(
        &self,
        receipt: &ApplicationReceipt,
        category: char,
    ) -> Result<CallbackOutcome, PolicyError> {
        self.callback(receipt.request_id, receipt.process_id, &ResponseFixtures::category(category))
            .await
    }

    /// Delivers raw response bytes from the registered oracle actor
    pub async fn callback(
        &self,
        request_id: RequestId,
        process_id: ProcessId,
        response: &[u8],
    ) -> Result<CallbackOutcome, PolicyError> {
        self.service
            .oracle_callback(self.oracle_actor, request_id, process_id, response)
            .await
    }
}
