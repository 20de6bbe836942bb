//! PostgreSQL Underwriting Adapter
//!
//! Implements [`UnderwritingPort`] on top of [`LedgerRepository`]. Domain
//! rules (positive claim amounts, payouts only for confirmed claims) are
//! checked with the domain types before anything is written; state changes
//! are guarded again in SQL.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresUnderwritingAdapter;
//! use domain_policy::UnderwritingPort;
//! use std::sync::Arc;
//!
//! let ledger: Arc<dyn UnderwritingPort> = Arc::new(PostgresUnderwritingAdapter::new(pool));
//! ```

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{
    ActorId, AdapterHealth, ClaimId, DomainPort, HealthCheckResult, HealthCheckable, Money,
    PayoutId, PortError, ProcessId,
};
use domain_claims::{Claim, Payout};
use domain_policy::{Application, NewApplication, PolicyState, Role, UnderwritingPort};

use crate::repositories::LedgerRepository;

/// PostgreSQL-backed implementation of the UnderwritingPort trait
#[derive(Debug, Clone)]
pub struct PostgresUnderwritingAdapter {
    repository: LedgerRepository,
    pool: PgPool,
}

impl PostgresUnderwritingAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: LedgerRepository::new(pool.clone()),
            pool,
        }
    }

    /// Returns the underlying repository, e.g. for granting roles
    pub fn repository(&self) -> &LedgerRepository {
        &self.repository
    }

    /// Grants a role to an actor
    #[instrument(skip(self))]
    pub async fn grant(&self, actor: ActorId, role: Role) -> Result<(), PortError> {
        self.repository.grant_role(actor, role.as_str()).await?;
        Ok(())
    }
}

impl DomainPort for PostgresUnderwritingAdapter {}

#[async_trait]
impl HealthCheckable for PostgresUnderwritingAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        probe(&self.pool, "postgres-underwriting-adapter").await
    }
}

/// Runs `SELECT 1` and reports the latency
pub(crate) async fn probe(pool: &PgPool, adapter_id: &str) -> HealthCheckResult {
    let start = std::time::Instant::now();
    let result = sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    let (status, message) = match result {
        Ok(_) => (AdapterHealth::Healthy, None),
        Err(e) => (AdapterHealth::Unhealthy, Some(format!("Database error: {}", e))),
    };
    HealthCheckResult {
        adapter_id: adapter_id.to_string(),
        status,
        latency_ms,
        message,
        checked_at: Utc::now(),
    }
}

fn rule_violation(e: impl std::fmt::Display) -> PortError {
    PortError::conflict(e.to_string())
}

#[async_trait]
impl UnderwritingPort for PostgresUnderwritingAdapter {
    #[instrument(skip(self, application), fields(holder = %application.policy_holder))]
    async fn create_application(&self, application: NewApplication) -> Result<ProcessId, PortError> {
        let application = Application::create(ProcessId::new_v7(), application);
        self.repository.insert_application(&application).await?;
        debug!(process_id = %application.process_id, "Application stored");
        Ok(application.process_id)
    }

    #[instrument(skip(self), fields(%process_id))]
    async fn get_application(&self, process_id: ProcessId) -> Result<Application, PortError> {
        let row = self.repository.get_application(process_id).await?;
        Ok(Application::try_from(row)?)
    }

    async fn list_applications(&self) -> Result<Vec<Application>, PortError> {
        let rows = self.repository.list_applications().await?;
        let applications = rows
            .into_iter()
            .map(Application::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(applications)
    }

    #[instrument(skip(self), fields(%process_id))]
    async fn underwrite(&self, process_id: ProcessId) -> Result<(), PortError> {
        self.repository
            .transition_application(process_id, PolicyState::Applied, PolicyState::Underwritten)
            .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(%process_id))]
    async fn expire(&self, process_id: ProcessId) -> Result<(), PortError> {
        self.repository
            .transition_application(process_id, PolicyState::Underwritten, PolicyState::Expired)
            .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(%process_id))]
    async fn withdraw_application(&self, process_id: ProcessId) -> Result<(), PortError> {
        self.repository.delete_application(process_id).await?;
        debug!(%process_id, "Application withdrawn");
        Ok(())
    }

    #[instrument(skip(self), fields(%process_id, %amount))]
    async fn create_claim(&self, process_id: ProcessId, amount: Money) -> Result<ClaimId, PortError> {
        let claim = Claim::new(process_id, amount).map_err(rule_violation)?;
        self.repository.insert_claim(&claim).await?;
        Ok(claim.id)
    }

    #[instrument(skip(self), fields(%process_id, %claim_id))]
    async fn confirm_claim(&self, process_id: ProcessId, claim_id: ClaimId) -> Result<(), PortError> {
        self.repository.confirm_claim(process_id, claim_id).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(%process_id, %claim_id, %amount))]
    async fn create_payout(
        &self,
        process_id: ProcessId,
        claim_id: ClaimId,
        amount: Money,
    ) -> Result<PayoutId, PortError> {
        let claim = Claim::try_from(self.repository.get_claim(process_id, claim_id).await?)?;
        let payout = Payout::for_claim(&claim, amount).map_err(rule_violation)?;
        self.repository.insert_payout(&payout).await?;
        Ok(payout.id)
    }

    #[instrument(skip(self), fields(%process_id, %payout_id))]
    async fn process_payout(&self, process_id: ProcessId, payout_id: PayoutId) -> Result<(), PortError> {
        self.repository.process_payout(process_id, payout_id).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(%process_id, %claim_id))]
    async fn withdraw_claim(&self, process_id: ProcessId, claim_id: ClaimId) -> Result<(), PortError> {
        self.repository.delete_claim(process_id, claim_id).await?;
        Ok(())
    }

    async fn claims_for(&self, process_id: ProcessId) -> Result<Vec<Claim>, PortError> {
        let rows = self.repository.claims_for(process_id).await?;
        Ok(rows.into_iter().map(Claim::try_from).collect::<Result<Vec<_>, _>>()?)
    }

    async fn payouts_for(&self, process_id: ProcessId) -> Result<Vec<Payout>, PortError> {
        let rows = self.repository.payouts_for(process_id).await?;
        Ok(rows.into_iter().map(Payout::try_from).collect::<Result<Vec<_>, _>>()?)
    }

    async fn is_authorized(&self, caller: ActorId, role: Role) -> Result<bool, PortError> {
        Ok(self.repository.has_role(caller, role.as_str()).await?)
    }
}
