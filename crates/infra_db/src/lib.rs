//! Infrastructure Database Layer
//!
//! PostgreSQL persistence for the fire insurance product using SQLx:
//! the ledger behind `UnderwritingPort` and the oracle request outbox behind
//! `OraclePort`.
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig};
//! use infra_db::adapters::{OutboxOracleAdapter, PostgresUnderwritingAdapter};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/fire_insurance")).await?;
//! run_migrations(&pool).await?;
//! let ledger = PostgresUnderwritingAdapter::new(pool.clone());
//! let oracle = OutboxOracleAdapter::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod repositories;
pub mod adapters;

pub use pool::{create_pool, run_migrations, DatabaseConfig, DatabasePool};
pub use error::DatabaseError;
pub use adapters::{OutboxOracleAdapter, PostgresUnderwritingAdapter};
