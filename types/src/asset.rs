//! Asset identifier.

use crate::error::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a fungible asset held by the ledger (e.g. `"STAKE"`).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AssetId(String);

impl AssetId {
    /// Create an asset id, rejecting empty or whitespace-only names.
    pub fn new(raw: impl Into<String>) -> Result<Self, TypesError> {
        let s = raw.into();
        if s.trim().is_empty() {
            return Err(TypesError::InvalidAssetId("asset id must not be empty".into()));
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_ids() {
        assert!(AssetId::new("").is_err());
        assert!(AssetId::new("   ").is_err());
        assert_eq!(AssetId::new("STAKE").unwrap().as_str(), "STAKE");
    }
}
