//! Outbox Oracle Adapter
//!
//! Implements [`OraclePort`] by writing the request to the `oracle_requests`
//! table. The request id is issued here and returned at once; delivery and
//! the callback happen outside this process.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{info, instrument};

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, OracleId, PortError, ProcessId, RequestId};
use domain_policy::OraclePort;

use crate::repositories::{OutboxRepository, PendingOracleRequest};

use super::ledger::probe;

#[derive(Debug, Clone)]
pub struct OutboxOracleAdapter {
    repository: OutboxRepository,
    pool: PgPool,
}

impl OutboxOracleAdapter {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: OutboxRepository::new(pool.clone()),
            pool,
        }
    }

    /// Requests the relay has not delivered yet
    pub async fn pending(&self, limit: i64) -> Result<Vec<PendingOracleRequest>, PortError> {
        Ok(self.repository.pending(limit).await?)
    }

    pub async fn mark_dispatched(&self, request_id: RequestId) -> Result<bool, PortError> {
        Ok(self.repository.mark_dispatched(request_id).await?)
    }
}

impl DomainPort for OutboxOracleAdapter {}

#[async_trait]
impl HealthCheckable for OutboxOracleAdapter {
    async fn health_check(&self) -> HealthCheckResult {
        probe(&self.pool, "outbox-oracle-adapter").await
    }
}

#[async_trait]
impl OraclePort for OutboxOracleAdapter {
    #[instrument(skip(self, payload), fields(%process_id, %oracle_id))]
    async fn request(
        &self,
        process_id: ProcessId,
        payload: Vec<u8>,
        callback: &str,
        oracle_id: OracleId,
    ) -> Result<RequestId, PortError> {
        let request_id = RequestId::new_v7();
        self.repository
            .enqueue(request_id, process_id, oracle_id, callback, &payload)
            .await?;
        info!(%request_id, "Oracle request queued");
        Ok(request_id)
    }
}
