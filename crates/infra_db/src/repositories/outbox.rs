//! Oracle request outbox
//!
//! Requests are written in the same database as the ledger and picked up by
//! an external relay, which marks them dispatched once delivered.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{OracleId, ProcessId, RequestId};

use crate::error::DatabaseError;

/// Repository for the `oracle_requests` table
#[derive(Debug, Clone)]
pub struct OutboxRepository {
    pool: PgPool,
}

impl OutboxRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn enqueue(
        &self,
        request_id: RequestId,
        process_id: ProcessId,
        oracle_id: OracleId,
        callback: &str,
        payload: &[u8],
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO oracle_requests (request_id, process_id, oracle_id, callback, payload)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(*request_id.as_uuid())
        .bind(*process_id.as_uuid())
        .bind(*oracle_id.as_uuid())
        .bind(callback)
        .bind(payload)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Undispatched requests, oldest first
    pub async fn pending(&self, limit: i64) -> Result<Vec<PendingOracleRequest>, DatabaseError> {
        let rows = sqlx::query_as::<_, PendingOracleRequest>(
            r#"
            SELECT request_id, process_id, oracle_id, callback, payload, created_at
            FROM oracle_requests
            WHERE dispatched_at IS NULL
            ORDER BY created_at
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Returns false if the request was unknown or already dispatched
    pub async fn mark_dispatched(&self, request_id: RequestId) -> Result<bool, DatabaseError> {
        let result = sqlx::query(
            "UPDATE oracle_requests SET dispatched_at = now() WHERE request_id = $1 AND dispatched_at IS NULL",
        )
        .bind(*request_id.as_uuid())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}

/// A request waiting in the outbox
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PendingOracleRequest {
    pub request_id: Uuid,
    pub process_id: Uuid,
    pub oracle_id: Uuid,
    pub callback: String,
    pub payload: Vec<u8>,
    pub created_at: DateTime<Utc>,
}
