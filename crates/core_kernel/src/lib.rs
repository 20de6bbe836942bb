//! Core Kernel - Foundational types for the parametric fire insurance system
//!
//! This crate provides the building blocks shared by every other crate:
//! - Money types with precise decimal arithmetic
//! - Strongly-typed identifiers for processes, requests, claims and payouts
//! - Port error and health types for the hexagonal adapters

pub mod money;
pub mod identifiers;
pub mod ports;
pub mod error;

pub use money::{Money, Currency, MoneyError, MONEY_SCALE};
pub use identifiers::{
    ProcessId, RequestId, ClaimId, PayoutId, ActorId, OracleId,
};
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
    OperationMetadata,
};
pub use error::CoreError;
