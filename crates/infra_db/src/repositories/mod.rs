//! Repository implementations for the fire ledger and the oracle outbox
//!
//! Repositories encapsulate SQL and map between database rows and domain
//! types. All statements are runtime-checked `sqlx::query` calls, so the
//! crate builds without a live database.

pub mod ledger;
pub mod outbox;

pub use ledger::{ApplicationRow, ClaimRow, LedgerRepository, PayoutRow};
pub use outbox::{OutboxRepository, PendingOracleRequest};
