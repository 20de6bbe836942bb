//! Parametric Fire Policy Domain
//!
//! Insures named objects against fire. A policy holder applies with a
//! premium, the policy is underwritten immediately and fire severity data is
//! requested from an oracle. When the oracle answers with a qualifying
//! category, a claim and a payout are settled automatically.
//!
//! # Architecture
//!
//! The domain owns no infrastructure. The ledger and the oracle are reached
//! through the ports in [`ports`], and events leave through an
//! [`events::EventPublisher`]. The only in-process state is the
//! [`registry::PolicyRegistry`].
//!
//! # Policy Lifecycle
//!
//! ```text
//! Applied -> Underwritten -> Expired
//! ```
//!
//! At most one policy per object is underwritten at any time.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_policy::{FireInsuranceService, ProductConfig};
//!
//! let service = FireInsuranceService::new(ledger, oracle, events, ProductConfig::new(oracle_id, Currency::USD));
//! let receipt = service.apply_for_policy(holder, "house-1", premium, sum_insured).await?;
//!
//! // later, from the oracle
//! let outcome = service.oracle_callback(oracle, receipt.request_id, receipt.process_id, &response).await?;
//! ```

pub mod aggregate;
pub mod registry;
pub mod params;
pub mod events;
pub mod error;
pub mod ports;
pub mod product;
pub mod services;

pub use aggregate::{Application, NewApplication, PolicyState};
pub use registry::{Correlation, OracleRequest, PolicyRegistry, RequestStatus};
pub use params::{ApplicationData, OracleRequestParams, OracleResponse, ParameterSchema, SchemaError};
pub use events::{EventPublisher, FanoutEventPublisher, FireInsuranceEvent, RecordingEventPublisher, TracingEventPublisher};
pub use error::{ErrorKind, PolicyError};
pub use ports::{OraclePort, Role, UnderwritingPort};
pub use product::{ProductConfig, DEFAULT_CALLBACK, DEFAULT_PRODUCT_NAME};
pub use services::{ApplicationReceipt, CallbackOutcome, FireInsuranceService, PolicyView, Settlement};
