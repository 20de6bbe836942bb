//! Ledger repository
//!
//! Applications, claims, payouts and actor roles of the fire product.
//! Status changes are single conditional `UPDATE`s; a statement that touches
//! no row is resolved into either `NotFound` or `StaleState`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::{ActorId, ClaimId, Currency, Money, PayoutId, ProcessId};
use domain_claims::{Claim, ClaimStatus, Payout, PayoutStatus};
use domain_policy::{Application, PolicyState};

use crate::error::DatabaseError;

/// Repository for the fire ledger tables
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: PgPool,
}

impl LedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts an application exactly as given
    pub async fn insert_application(&self, application: &Application) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO fire_applications (
                process_id, policy_holder, premium_amount, sum_insured_amount,
                currency, application_data, state, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(*application.process_id.as_uuid())
        .bind(*application.policy_holder.as_uuid())
        .bind(application.premium_amount.amount())
        .bind(application.sum_insured_amount.amount())
        .bind(application.premium_amount.currency().code())
        .bind(&application.application_data)
        .bind(application.state.as_str())
        .bind(application.created_at)
        .bind(application.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get_application(&self, process_id: ProcessId) -> Result<ApplicationRow, DatabaseError> {
        sqlx::query_as::<_, ApplicationRow>(
            r#"
            SELECT process_id, policy_holder, premium_amount, sum_insured_amount,
                   currency, application_data, state, created_at, updated_at
            FROM fire_applications
            WHERE process_id = $1
            "#,
        )
        .bind(*process_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Application", process_id))
    }

    /// All applications, oldest first
    pub async fn list_applications(&self) -> Result<Vec<ApplicationRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, ApplicationRow>(
            r#"
            SELECT process_id, policy_holder, premium_amount, sum_insured_amount,
                   currency, application_data, state, created_at, updated_at
            FROM fire_applications
            ORDER BY created_at, process_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Moves an application from `from` to `to`
    pub async fn transition_application(
        &self,
        process_id: ProcessId,
        from: PolicyState,
        to: PolicyState,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE fire_applications
            SET state = $3, updated_at = now()
            WHERE process_id = $1 AND state = $2
            "#,
        )
        .bind(*process_id.as_uuid())
        .bind(from.as_str())
        .bind(to.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let id = *process_id.as_uuid();
            return Err(self
                .missing_or_stale("fire_applications", "process_id", "Application", id, from.as_str())
                .await);
        }
        Ok(())
    }

    /// Deletes an application that is not expired and has no claims
    pub async fn delete_application(&self, process_id: ProcessId) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM oracle_requests WHERE process_id = $1")
            .bind(*process_id.as_uuid())
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query(
            r#"
            DELETE FROM fire_applications
            WHERE process_id = $1
              AND state <> $2
              AND NOT EXISTS (SELECT 1 FROM fire_claims WHERE process_id = $1)
            "#,
        )
        .bind(*process_id.as_uuid())
        .bind(PolicyState::Expired.as_str())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            let id = *process_id.as_uuid();
            return Err(self
                .missing_or_stale("fire_applications", "process_id", "Application", id, "unsettled")
                .await);
        }
        tx.commit().await?;
        Ok(())
    }

    pub async fn insert_claim(&self, claim: &Claim) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO fire_claims (claim_id, process_id, amount, currency, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(*claim.id.as_uuid())
        .bind(*claim.process_id.as_uuid())
        .bind(claim.amount.amount())
        .bind(claim.amount.currency().code())
        .bind(claim.status.as_str())
        .bind(claim.created_at)
        .bind(claim.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Loads a claim that belongs to `process_id`
    pub async fn get_claim(&self, process_id: ProcessId, claim_id: ClaimId) -> Result<ClaimRow, DatabaseError> {
        sqlx::query_as::<_, ClaimRow>(
            r#"
            SELECT claim_id, process_id, amount, currency, status, created_at, updated_at
            FROM fire_claims
            WHERE claim_id = $1 AND process_id = $2
            "#,
        )
        .bind(*claim_id.as_uuid())
        .bind(*process_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("Claim", claim_id))
    }

    pub async fn confirm_claim(&self, process_id: ProcessId, claim_id: ClaimId) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE fire_claims
            SET status = $3, updated_at = now()
            WHERE claim_id = $1 AND process_id = $2 AND status = $4
            "#,
        )
        .bind(*claim_id.as_uuid())
        .bind(*process_id.as_uuid())
        .bind(ClaimStatus::Confirmed.as_str())
        .bind(ClaimStatus::Applied.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let expected = ClaimStatus::Applied.as_str();
            return Err(self
                .missing_or_stale("fire_claims", "claim_id", "Claim", *claim_id.as_uuid(), expected)
                .await);
        }
        Ok(())
    }

    pub async fn insert_payout(&self, payout: &Payout) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO fire_payouts (payout_id, process_id, claim_id, amount, currency, status, created_at, paid_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(*payout.id.as_uuid())
        .bind(*payout.process_id.as_uuid())
        .bind(*payout.claim_id.as_uuid())
        .bind(payout.amount.amount())
        .bind(payout.amount.currency().code())
        .bind(payout.status.as_str())
        .bind(payout.created_at)
        .bind(payout.paid_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn process_payout(&self, process_id: ProcessId, payout_id: PayoutId) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE fire_payouts
            SET status = $3, paid_at = now()
            WHERE payout_id = $1 AND process_id = $2 AND status = $4
            "#,
        )
        .bind(*payout_id.as_uuid())
        .bind(*process_id.as_uuid())
        .bind(PayoutStatus::PaidOut.as_str())
        .bind(PayoutStatus::Expected.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            let expected = PayoutStatus::Expected.as_str();
            return Err(self
                .missing_or_stale("fire_payouts", "payout_id", "Payout", *payout_id.as_uuid(), expected)
                .await);
        }
        Ok(())
    }

    /// Deletes a claim and every payout recorded against it
    pub async fn delete_claim(&self, process_id: ProcessId, claim_id: ClaimId) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM fire_payouts WHERE claim_id = $1 AND process_id = $2")
            .bind(*claim_id.as_uuid())
            .bind(*process_id.as_uuid())
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM fire_claims WHERE claim_id = $1 AND process_id = $2")
            .bind(*claim_id.as_uuid())
            .bind(*process_id.as_uuid())
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Claim", claim_id));
        }
        tx.commit().await?;
        Ok(())
    }

    pub async fn claims_for(&self, process_id: ProcessId) -> Result<Vec<ClaimRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, ClaimRow>(
            r#"
            SELECT claim_id, process_id, amount, currency, status, created_at, updated_at
            FROM fire_claims
            WHERE process_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(*process_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn payouts_for(&self, process_id: ProcessId) -> Result<Vec<PayoutRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, PayoutRow>(
            r#"
            SELECT payout_id, process_id, claim_id, amount, currency, status, created_at, paid_at
            FROM fire_payouts
            WHERE process_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(*process_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn has_role(&self, actor: ActorId, role: &str) -> Result<bool, DatabaseError> {
        let granted = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM actor_roles WHERE actor_id = $1 AND role = $2)",
        )
        .bind(*actor.as_uuid())
        .bind(role)
        .fetch_one(&self.pool)
        .await?;
        Ok(granted)
    }

    /// Grants a role; granting twice is a no-op
    pub async fn grant_role(&self, actor: ActorId, role: &str) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO actor_roles (actor_id, role) VALUES ($1, $2)
            ON CONFLICT (actor_id, role) DO NOTHING
            "#,
        )
        .bind(*actor.as_uuid())
        .bind(role)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Explains why a conditional update touched no row
    async fn missing_or_stale(
        &self,
        table: &'static str,
        key: &'static str,
        entity: &'static str,
        id: Uuid,
        expected: &'static str,
    ) -> DatabaseError {
        let query = format!("SELECT EXISTS (SELECT 1 FROM {table} WHERE {key} = $1)");
        match sqlx::query_scalar::<_, bool>(&query).bind(id).fetch_one(&self.pool).await {
            Ok(true) => DatabaseError::stale(entity, id, expected),
            Ok(false) => DatabaseError::not_found(entity, id),
            Err(e) => DatabaseError::from(e),
        }
    }
}

fn money(amount: Decimal, currency: &str) -> Result<Money, DatabaseError> {
    let currency: Currency = currency.parse().map_err(DatabaseError::serialization)?;
    Ok(Money::new(amount, currency))
}

/// Database row for `fire_applications`
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ApplicationRow {
    pub process_id: Uuid,
    pub policy_holder: Uuid,
    pub premium_amount: Decimal,
    pub sum_insured_amount: Decimal,
    pub currency: String,
    pub application_data: Vec<u8>,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ApplicationRow> for Application {
    type Error = DatabaseError;

    fn try_from(row: ApplicationRow) -> Result<Self, Self::Error> {
        let state = PolicyState::parse(&row.state)
            .ok_or_else(|| DatabaseError::serialization(format!("unknown policy state '{}'", row.state)))?;
        Ok(Application {
            process_id: ProcessId::from_uuid(row.process_id),
            policy_holder: ActorId::from_uuid(row.policy_holder),
            premium_amount: money(row.premium_amount, &row.currency)?,
            sum_insured_amount: money(row.sum_insured_amount, &row.currency)?,
            application_data: row.application_data,
            state,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Database row for `fire_claims`
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClaimRow {
    pub claim_id: Uuid,
    pub process_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ClaimRow> for Claim {
    type Error = DatabaseError;

    fn try_from(row: ClaimRow) -> Result<Self, Self::Error> {
        let status = ClaimStatus::parse(&row.status)
            .ok_or_else(|| DatabaseError::serialization(format!("unknown claim status '{}'", row.status)))?;
        Ok(Claim {
            id: ClaimId::from_uuid(row.claim_id),
            process_id: ProcessId::from_uuid(row.process_id),
            amount: money(row.amount, &row.currency)?,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Database row for `fire_payouts`
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PayoutRow {
    pub payout_id: Uuid,
    pub process_id: Uuid,
    pub claim_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

impl TryFrom<PayoutRow> for Payout {
    type Error = DatabaseError;

    fn try_from(row: PayoutRow) -> Result<Self, Self::Error> {
        let status = PayoutStatus::parse(&row.status)
            .ok_or_else(|| DatabaseError::serialization(format!("unknown payout status '{}'", row.status)))?;
        Ok(Payout {
            id: PayoutId::from_uuid(row.payout_id),
            process_id: ProcessId::from_uuid(row.process_id),
            claim_id: ClaimId::from_uuid(row.claim_id),
            amount: money(row.amount, &row.currency)?,
            status,
            created_at: row.created_at,
            paid_at: row.paid_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn application_row(state: &str, currency: &str) -> ApplicationRow {
        ApplicationRow {
            process_id: Uuid::now_v7(),
            policy_holder: Uuid::new_v4(),
            premium_amount: dec!(100),
            sum_insured_amount: dec!(20000),
            currency: currency.to_string(),
            application_data: b"{}".to_vec(),
            state: state.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_application_row_conversion() {
        let row = application_row("underwritten", "USD");
        let id = row.process_id;
        let app = Application::try_from(row).unwrap();
        assert_eq!(app.process_id, ProcessId::from_uuid(id));
        assert_eq!(app.state, PolicyState::Underwritten);
        assert_eq!(app.premium_amount, Money::new(dec!(100), Currency::USD));
    }

    #[test]
    fn test_unknown_state_is_serialization_error() {
        let err = Application::try_from(application_row("in_force", "USD")).unwrap_err();
        assert!(matches!(err, DatabaseError::SerializationError(_)));
    }

    #[test]
    fn test_unknown_currency_is_serialization_error() {
        let err = Application::try_from(application_row("applied", "XYZ")).unwrap_err();
        assert!(matches!(err, DatabaseError::SerializationError(_)));
    }

    #[test]
    fn test_payout_row_conversion() {
        let row = PayoutRow {
            payout_id: Uuid::now_v7(),
            process_id: Uuid::now_v7(),
            claim_id: Uuid::now_v7(),
            amount: dec!(500),
            currency: "EUR".to_string(),
            status: "paid_out".to_string(),
            created_at: Utc::now(),
            paid_at: Some(Utc::now()),
        };
        let payout = Payout::try_from(row).unwrap();
        assert!(payout.is_paid_out());
        assert_eq!(payout.amount.currency(), Currency::EUR);
    }
}
