//! Product configuration

use serde::{Deserialize, Serialize};

use core_kernel::{Currency, OracleId};

pub const DEFAULT_PRODUCT_NAME: &str = "FireInsurance";
pub const DEFAULT_CALLBACK: &str = "oracle_callback";

/// Static settings of the fire insurance product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductConfig {
    pub product_name: String,
    pub product_version: String,
    /// Oracle that answers fire severity requests
    pub oracle_id: OracleId,
    /// Callback name handed to the oracle with every request
    pub callback: String,
    /// Currency in which premiums are accepted
    pub currency: Currency,
}

impl ProductConfig {
    pub fn new(oracle_id: OracleId, currency: Currency) -> Self {
        Self {
            product_name: DEFAULT_PRODUCT_NAME.to_string(),
            product_version: env!("CARGO_PKG_VERSION").to_string(),
            oracle_id,
            callback: DEFAULT_CALLBACK.to_string(),
            currency,
        }
    }

    pub fn with_product_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = name.into();
        self
    }
}
