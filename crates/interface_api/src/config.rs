//! API configuration

use serde::Deserialize;
use std::time::Duration;
use uuid::Uuid;

use core_kernel::{CoreError, Currency, OracleId};
use domain_policy::{ProductConfig, DEFAULT_PRODUCT_NAME};
use infra_db::DatabaseConfig;

/// API configuration
///
/// Every field can be set through an `API_`-prefixed environment variable,
/// e.g. `API_ORACLE_ID`. Unset fields keep their defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// JWT secret for authentication
    pub jwt_secret: String,
    /// JWT expiration in seconds
    pub jwt_expiration_secs: u64,
    /// Database URL
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    /// Seconds to wait for a free pooled connection
    pub db_acquire_timeout_secs: u64,
    pub db_idle_timeout_secs: u64,
    pub db_max_lifetime_secs: u64,
    /// Log level
    pub log_level: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
    /// Oracle that answers fire severity requests
    pub oracle_id: Option<Uuid>,
    /// Actor granted the oracle role at startup
    pub oracle_actor: Option<Uuid>,
    pub product_name: String,
    /// Currency code premiums must be paid in
    pub currency: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            jwt_secret: "change-me-in-production".to_string(),
            jwt_expiration_secs: 3600,
            database_url: "postgres://localhost/fire_insurance".to_string(),
            db_max_connections: 10,
            db_min_connections: 2,
            db_acquire_timeout_secs: 30,
            db_idle_timeout_secs: 600,
            db_max_lifetime_secs: 1800,
            log_level: "info".to_string(),
            log_json: false,
            oracle_id: None,
            oracle_actor: None,
            product_name: DEFAULT_PRODUCT_NAME.to_string(),
            currency: "USD".to_string(),
        }
    }
}

impl ApiConfig {
    /// Loads configuration from environment
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("API"))
            .build()?
            .try_deserialize()
    }

    /// Returns the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Ledger pool settings
    pub fn database_config(&self) -> DatabaseConfig {
        DatabaseConfig::new(&self.database_url)
            .max_connections(self.db_max_connections)
            .min_connections(self.db_min_connections)
            .acquire_timeout(Duration::from_secs(self.db_acquire_timeout_secs))
            .idle_timeout(Duration::from_secs(self.db_idle_timeout_secs))
            .max_lifetime(Duration::from_secs(self.db_max_lifetime_secs))
    }

    /// Builds the product settings for the fire insurance service
    ///
    /// # Errors
    ///
    /// Fails if no oracle id is configured or the currency code is unknown.
    pub fn product_config(&self) -> Result<ProductConfig, CoreError> {
        let oracle_id = self
            .oracle_id
            .map(OracleId::from_uuid)
            .ok_or_else(|| CoreError::configuration("API_ORACLE_ID is not set"))?;
        let currency: Currency = self.currency.parse()?;
        Ok(ProductConfig::new(oracle_id, currency).with_product_name(self.product_name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_config_requires_oracle() {
        let err = ApiConfig::default().product_config().unwrap_err();
        assert!(matches!(err, CoreError::Configuration(_)));
    }

    #[test]
    fn test_product_config_from_settings() {
        let oracle = Uuid::new_v4();
        let config = ApiConfig {
            oracle_id: Some(oracle),
            currency: "eur".to_string(),
            product_name: "FireInsuranceEU".to_string(),
            ..ApiConfig::default()
        };
        let product = config.product_config().unwrap();
        assert_eq!(product.oracle_id, OracleId::from_uuid(oracle));
        assert_eq!(product.currency, Currency::EUR);
        assert_eq!(product.product_name, "FireInsuranceEU");
    }

    #[test]
    fn test_database_config_carries_pool_settings() {
        let config = ApiConfig {
            database_url: "postgres://ledger/fire".to_string(),
            db_max_connections: 32,
            db_min_connections: 4,
            db_acquire_timeout_secs: 5,
            ..ApiConfig::default()
        };
        let db = config.database_config();
        assert_eq!(db.url, "postgres://ledger/fire");
        assert_eq!(db.max_connections, 32);
        assert_eq!(db.min_connections, 4);
        assert_eq!(db.acquire_timeout, Duration::from_secs(5));
        assert_eq!(db.idle_timeout, Duration::from_secs(600));
        assert_eq!(db.max_lifetime, Duration::from_secs(1800));
    }

    #[test]
    fn test_unknown_currency_rejected() {
        let config = ApiConfig {
            oracle_id: Some(Uuid::new_v4()),
            currency: "DOGE".to_string(),
            ..ApiConfig::default()
        };
        assert!(matches!(config.product_config(), Err(CoreError::Money(_))));
    }
}
