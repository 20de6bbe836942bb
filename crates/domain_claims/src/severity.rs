//! Fire severity categories reported by the oracle

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ClaimError;

/// Coarse classification of observed fire damage
///
/// The oracle reports a single character code. `M` and `L` are the only
/// codes that trigger a payout; every other code (conventionally `S` for a
/// small fire) falls below the deductible and is kept verbatim for audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FireCategory {
    /// Medium fire (`M`)
    Medium,
    /// Large fire (`L`)
    Large,
    /// Any other code
    BelowThreshold(char),
}

impl FireCategory {
    /// Returns the single character code for this category
    pub fn code(&self) -> char {
        match self {
            FireCategory::Medium => 'M',
            FireCategory::Large => 'L',
            FireCategory::BelowThreshold(code) => *code,
        }
    }

    /// Parses a category from its textual code, which must be exactly one character
    pub fn parse(code: &str) -> Result<Self, ClaimError> {
        let mut chars = code.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(FireCategory::from(c)),
            _ => Err(ClaimError::InvalidCategoryCode(code.to_string())),
        }
    }

    pub fn triggers_payout(&self) -> bool {
        !matches!(self, FireCategory::BelowThreshold(_))
    }
}

impl From<char> for FireCategory {
    fn from(code: char) -> Self {
        match code {
            'M' => FireCategory::Medium,
            'L' => FireCategory::Large,
            other => FireCategory::BelowThreshold(other),
        }
    }
}

impl TryFrom<String> for FireCategory {
    type Error = ClaimError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        FireCategory::parse(&value)
    }
}

impl From<FireCategory> for String {
    fn from(category: FireCategory) -> Self {
        category.code().to_string()
    }
}

impl fmt::Display for FireCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_map_to_categories() {
        assert_eq!(FireCategory::from('M'), FireCategory::Medium);
        assert_eq!(FireCategory::from('L'), FireCategory::Large);
        assert_eq!(FireCategory::from('S'), FireCategory::BelowThreshold('S'));
    }

    #[test]
    fn test_codes_are_case_sensitive() {
        assert_eq!(FireCategory::from('m'), FireCategory::BelowThreshold('m'));
    }

    #[test]
    fn test_parse_rejects_empty_and_multi_char() {
        assert!(FireCategory::parse("").is_err());
        assert!(FireCategory::parse("ML").is_err());
    }
}
