//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for the fire insurance product.
//! These fixtures are consistent and predictable for unit tests.

use core_kernel::{ActorId, Currency, Money};
use domain_claims::FireCategory;
use domain_policy::{ApplicationData, OracleResponse, ParameterSchema};
use rust_decimal_macros::dec;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// The premium used throughout the reference scenarios
    pub fn usd_premium() -> Money {
        Money::new(dec!(100), Currency::USD)
    }

    pub fn usd_sum_insured() -> Money {
        Money::new(dec!(10000), Currency::USD)
    }

    pub fn usd_zero() -> Money {
        Money::zero(Currency::USD)
    }

    /// Creates a EUR amount for currency mismatch tests
    pub fn eur_100() -> Money {
        Money::new(dec!(100), Currency::EUR)
    }
}

/// Fixture for insured object names
pub struct ObjectFixtures;

impl ObjectFixtures {
    pub fn house() -> &'static str {
        "house-1"
    }

    pub fn barn() -> &'static str {
        "barn-7"
    }
}

/// Encoded oracle answers
pub struct ResponseFixtures;

impl ResponseFixtures {
    /// Encodes a response for an arbitrary category code
    pub fn category(code: char) -> Vec<u8> {
        OracleResponse {
            fire_category: FireCategory::from(code),
        }
        .encode()
        .expect("oracle response fixture encodes")
    }

    pub fn medium() -> Vec<u8> {
        Self::category('M')
    }

    pub fn large() -> Vec<u8> {
        Self::category('L')
    }

    pub fn small() -> Vec<u8> {
        Self::category('S')
    }

    /// A payload that is not an envelope at all
    pub fn garbage() -> Vec<u8> {
        b"\x00fire?".to_vec()
    }
}

/// Encoded application data, e.g. for simulating corrupted ledger records
pub struct ApplicationDataFixtures;

impl ApplicationDataFixtures {
    pub fn encoded(holder: ActorId, object_name: &str, premium: Money) -> Vec<u8> {
        ApplicationData {
            policy_holder: holder,
            object_name: object_name.to_string(),
            premium,
        }
        .encode()
        .expect("application data fixture encodes")
    }

    /// Application data whose premium decodes as zero
    pub fn zero_premium(holder: ActorId, object_name: &str) -> Vec<u8> {
        Self::encoded(holder, object_name, MoneyFixtures::usd_zero())
    }
}
