//! Typed parameter schemas
//!
//! Payloads that cross the ledger or oracle boundary travel as opaque bytes.
//! Each payload kind has an explicit field list and is wrapped in a
//! versioned envelope:
//!
//! ```json
//! { "kind": "fire.oracle_request", "version": 1, "data": { "object_name": "house-1" } }
//! ```
//!
//! Decoding checks the kind and version before looking at the fields, so a
//! response can never be mistaken for stored application data.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::{ActorId, Money};
use domain_claims::FireCategory;

/// Errors raised while encoding or decoding a schema payload
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Malformed {kind} payload: {message}")]
    Malformed { kind: &'static str, message: String },

    #[error("Expected payload kind {expected}, found {found}")]
    KindMismatch { expected: &'static str, found: String },

    #[error("Unsupported {kind} version {found} (expected {expected})")]
    UnsupportedVersion {
        kind: &'static str,
        expected: u16,
        found: u16,
    },
}

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    kind: &'a str,
    version: u16,
    data: &'a T,
}

#[derive(Deserialize)]
struct Envelope {
    kind: String,
    version: u16,
    data: serde_json::Value,
}

/// A payload kind with a fixed field list
pub trait ParameterSchema: Serialize + DeserializeOwned {
    const KIND: &'static str;
    const VERSION: u16;

    fn encode(&self) -> Result<Vec<u8>, SchemaError> {
        serde_json::to_vec(&EnvelopeRef {
            kind: Self::KIND,
            version: Self::VERSION,
            data: self,
        })
        .map_err(|e| SchemaError::Malformed {
            kind: Self::KIND,
            message: e.to_string(),
        })
    }

    fn decode(bytes: &[u8]) -> Result<Self, SchemaError> {
        let envelope: Envelope = serde_json::from_slice(bytes).map_err(|e| SchemaError::Malformed {
            kind: Self::KIND,
            message: e.to_string(),
        })?;
        if envelope.kind != Self::KIND {
            return Err(SchemaError::KindMismatch {
                expected: Self::KIND,
                found: envelope.kind,
            });
        }
        if envelope.version != Self::VERSION {
            return Err(SchemaError::UnsupportedVersion {
                kind: Self::KIND,
                expected: Self::VERSION,
                found: envelope.version,
            });
        }
        serde_json::from_value(envelope.data).map_err(|e| SchemaError::Malformed {
            kind: Self::KIND,
            message: e.to_string(),
        })
    }
}

/// Query sent to the oracle: which object to report on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OracleRequestParams {
    pub object_name: String,
}

impl ParameterSchema for OracleRequestParams {
    const KIND: &'static str = "fire.oracle_request";
    const VERSION: u16 = 1;
}

/// Application data stored with the policy in the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApplicationData {
    pub policy_holder: ActorId,
    pub object_name: String,
    pub premium: Money,
}

impl ParameterSchema for ApplicationData {
    const KIND: &'static str = "fire.application";
    const VERSION: u16 = 1;
}

/// Oracle answer: the observed fire category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OracleResponse {
    pub fire_category: FireCategory,
}

impl ParameterSchema for OracleResponse {
    const KIND: &'static str = "fire.oracle_response";
    const VERSION: u16 = 1;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoded_request_has_envelope() {
        let bytes = OracleRequestParams { object_name: "house-1".into() }.encode().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(value["kind"], "fire.oracle_request");
        assert_eq!(value["version"], 1);
        assert_eq!(value["data"]["object_name"], "house-1");
    }

    #[test]
    fn test_kind_mismatch() {
        let bytes = OracleRequestParams { object_name: "house-1".into() }.encode().unwrap();
        let err = OracleResponse::decode(&bytes).unwrap_err();
        assert!(matches!(err, SchemaError::KindMismatch { expected: "fire.oracle_response", .. }));
    }
}
