//! Domain Adapters
//!
//! Implementations of the fire policy ports backed by PostgreSQL.
//!
//! - [`PostgresUnderwritingAdapter`]: the ledger (`UnderwritingPort`)
//! - [`OutboxOracleAdapter`]: oracle requests via an outbox table (`OraclePort`)
//!
//! Database errors are translated to `PortError` at this boundary:
//! `NotFound` stays `NotFound`, constraint and state violations become
//! `Conflict`, connection problems become `Connection`.

pub mod ledger;
pub mod oracle;

pub use ledger::PostgresUnderwritingAdapter;
pub use oracle::OutboxOracleAdapter;
