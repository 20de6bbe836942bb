//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! fire insurance test suite.
//!
//! # Modules
//!
//! - `fixtures`: Pre-built test data and encoded oracle payloads
//! - `builders`: A service harness wired to in-memory ports
//! - `assertions`: Custom assertion helpers for domain types
//! - `generators`: Property-based test data generators

pub mod fixtures;
pub mod builders;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use assertions::*;
pub use generators::*;
