//! Ledger configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::Path;

use trickle_types::{AccountId, AssetId};
use trickle_utils::LogFormat;

use crate::LedgerError;

/// Configuration for an accrual ledger.
///
/// Can be loaded from a TOML file via [`LedgerConfig::from_toml_file`] or
/// built programmatically (e.g. for tests).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Initial emission rate in reward units per second.
    #[serde(default = "default_emission_rate")]
    pub emission_rate: u64,

    /// Account under which the ledger holds deposits and the reward reserve.
    #[serde(default = "default_custodian")]
    pub custodian: AccountId,

    /// Asset accepted as stake.
    #[serde(default = "default_stake_asset")]
    pub stake_asset: String,

    /// Asset paid out as reward.
    #[serde(default = "default_reward_asset")]
    pub reward_asset: String,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_emission_rate() -> u64 {
    1
}

fn default_custodian() -> AccountId {
    AccountId::ZERO
}

fn default_stake_asset() -> String {
    "STAKE".to_string()
}

fn default_reward_asset() -> String {
    "REWARD".to_string()
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl LedgerConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| LedgerError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, LedgerError> {
        toml::from_str(s).map_err(|e| LedgerError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> Result<String, LedgerError> {
        toml::to_string_pretty(self).map_err(|e| LedgerError::Config(e.to_string()))
    }

    /// Check every field for a usable value.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.emission_rate == 0 {
            return Err(LedgerError::Config("emission_rate must be positive".into()));
        }
        if self.custodian.is_zero() {
            return Err(LedgerError::Config("custodian must not be the zero account".into()));
        }
        let stake = self.stake_asset_id()?;
        let reward = self.reward_asset_id()?;
        if stake == reward {
            return Err(LedgerError::Config(format!(
                "stake and reward asset must differ, both are {stake}"
            )));
        }
        self.log_format()?;
        Ok(())
    }

    pub fn stake_asset_id(&self) -> Result<AssetId, LedgerError> {
        AssetId::new(self.stake_asset.clone()).map_err(|e| LedgerError::Config(e.to_string()))
    }

    pub fn reward_asset_id(&self) -> Result<AssetId, LedgerError> {
        AssetId::new(self.reward_asset.clone()).map_err(|e| LedgerError::Config(e.to_string()))
    }

    pub fn log_format(&self) -> Result<LogFormat, LedgerError> {
        self.log_format
            .parse::<LogFormat>()
            .map_err(|e| LedgerError::Config(e.to_string()))
    }

    /// Install the global tracing subscriber described by this config.
    pub fn init_logging(&self) -> Result<(), LedgerError> {
        trickle_utils::init_logging(self.log_format()?, &self.log_level)
            .map_err(|e| LedgerError::Config(e.to_string()))
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            emission_rate: default_emission_rate(),
            custodian: default_custodian(),
            stake_asset: default_stake_asset(),
            reward_asset: default_reward_asset(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn custodian_hex() -> String {
        "09".repeat(32)
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = LedgerConfig::default();
        let toml_str = config.to_toml_string().unwrap();
        let parsed = LedgerConfig::from_toml_str(&toml_str).expect("should parse");
        assert_eq!(parsed.emission_rate, config.emission_rate);
        assert_eq!(parsed.custodian, config.custodian);
        assert_eq!(parsed.stake_asset, config.stake_asset);
    }

    #[test]
    fn minimal_toml_uses_defaults() {
        let config = LedgerConfig::from_toml_str("").expect("empty toml should use defaults");
        assert_eq!(config.emission_rate, 1);
        assert_eq!(config.stake_asset, "STAKE");
        assert_eq!(config.reward_asset, "REWARD");
        assert_eq!(config.log_format, "human");
        // The zero custodian is a placeholder that validation rejects.
        assert!(matches!(config.validate(), Err(LedgerError::Config(_))));
    }

    #[test]
    fn partial_toml_overrides() {
        let toml = format!(
            r#"
            emission_rate = 250
            custodian = "{}"
            log_format = "json"
        "#,
            custodian_hex()
        );
        let config = LedgerConfig::from_toml_str(&toml).expect("should parse");
        assert_eq!(config.emission_rate, 250);
        assert_eq!(config.custodian, AccountId::new([9; 32]));
        assert_eq!(config.log_format().unwrap(), LogFormat::Json);
        assert_eq!(config.log_level, "info"); // default
        config.validate().unwrap();
    }

    #[test]
    fn malformed_custodian_is_a_config_error() {
        let result = LedgerConfig::from_toml_str(r#"custodian = "not-hex""#);
        assert!(matches!(result, Err(LedgerError::Config(_))));
    }

    #[test]
    fn validate_rejects_zero_rate_and_shared_asset() {
        let mut config = LedgerConfig {
            custodian: AccountId::new([9; 32]),
            ..LedgerConfig::default()
        };
        config.validate().unwrap();

        config.emission_rate = 0;
        assert!(config.validate().is_err());

        config.emission_rate = 5;
        config.reward_asset = config.stake_asset.clone();
        assert!(config.validate().is_err());

        config.reward_asset = "REWARD".into();
        config.log_format = "xml".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "emission_rate = 42").unwrap();
        writeln!(file, "custodian = \"{}\"", custodian_hex()).unwrap();
        let config = LedgerConfig::from_toml_file(file.path()).unwrap();
        assert_eq!(config.emission_rate, 42);
        config.validate().unwrap();
    }

    #[test]
    fn missing_file_returns_config_error() {
        let result = LedgerConfig::from_toml_file("/nonexistent/trickle.toml");
        assert!(matches!(result, Err(LedgerError::Config(_))));
    }
}
