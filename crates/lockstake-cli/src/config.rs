// crates/lockstake-cli/src/config.rs
//
// Runtime configuration for the Lockstake CLI.
// Loaded from a TOML file or populated with sensible defaults.

use serde::Deserialize;
use std::fs;

use lockstake_core::{AccountId, Amount};
use lockstake_economics::params::DEFAULT_MAX_STAKE_TOKENS;
use lockstake_economics::{AdminSettings, StakingParams, StrategyKind};

/// Runtime configuration for the CLI.
#[derive(Debug, Clone, Deserialize)]
pub struct LockstakeConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    /// `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Multiplier strategy: "tiered" or "logarithmic".
    #[serde(default)]
    pub strategy: StrategyKind,

    /// Cooldown and penalty parameters.
    #[serde(default)]
    pub params: StakingParams,

    /// Administrative settings the engine reads.
    #[serde(default)]
    pub admin: AdminConfig,
}

/// The `[admin]` table. Amounts are whole tokens because TOML integers
/// stop at 64 bits.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    #[serde(default)]
    pub paused: bool,

    /// Treasury account: a 64-character hex key, or a label hashed into one.
    #[serde(default = "default_treasury")]
    pub treasury: String,

    /// Per-account stake cap in whole LST.
    #[serde(default = "default_max_stake_tokens")]
    pub max_stake_tokens: u64,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_treasury() -> String {
    "treasury".to_string()
}

fn default_max_stake_tokens() -> u64 {
    DEFAULT_MAX_STAKE_TOKENS as u64
}

impl Default for LockstakeConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            strategy: StrategyKind::default(),
            params: StakingParams::default(),
            admin: AdminConfig::default(),
        }
    }
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            paused: false,
            treasury: default_treasury(),
            max_stake_tokens: default_max_stake_tokens(),
        }
    }
}

impl LockstakeConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from TOML text and validate the parameters.
    pub fn parse(contents: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: LockstakeConfig = toml::from_str(contents)?;
        config.params.validate()?;
        Ok(config)
    }
}

impl AdminConfig {
    /// Convert to the engine's settings.
    pub fn to_settings(&self) -> Result<AdminSettings, Box<dyn std::error::Error>> {
        Ok(AdminSettings {
            paused: self.paused,
            treasury: resolve_account(&self.treasury),
            max_stake: Amount::from_tokens(u128::from(self.max_stake_tokens))?,
        })
    }
}

/// A hex key if `name` parses as one, otherwise the id derived from the label.
pub fn resolve_account(name: &str) -> AccountId {
    AccountId::from_hex(name).unwrap_or_else(|| AccountId::from_label(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = LockstakeConfig::parse("").unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.strategy, StrategyKind::Tiered);
        assert_eq!(config.params, StakingParams::default());
        let settings = config.admin.to_settings().unwrap();
        assert_eq!(settings, AdminSettings::default());
    }

    #[test]
    fn test_parse_full_file() {
        let toml = r#"
            log_level = "debug"
            strategy = "logarithmic"

            [params]
            cooldown_period = 86400
            early_unstake_penalty_bps = 1500

            [admin]
            paused = true
            treasury = "dao-treasury"
            max_stake_tokens = 50000
        "#;
        let config = LockstakeConfig::parse(toml).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.strategy, StrategyKind::Logarithmic);
        assert_eq!(config.params.cooldown_period, 86_400);
        assert_eq!(config.params.early_unstake_penalty_bps, 1_500);
        // Unset fields keep their defaults.
        assert_eq!(config.params.early_unstake_cooldown, 7 * 86_400);

        let settings = config.admin.to_settings().unwrap();
        assert!(settings.paused);
        assert_eq!(settings.treasury, AccountId::from_label("dao-treasury"));
        assert_eq!(settings.max_stake, Amount::from_tokens(50_000).unwrap());
    }

    #[test]
    fn test_invalid_params_rejected() {
        let toml = "[params]\nearly_unstake_penalty_bps = 20000\n";
        assert!(LockstakeConfig::parse(toml).is_err());
    }

    #[test]
    fn test_unknown_strategy_rejected() {
        assert!(LockstakeConfig::parse("strategy = \"sigmoid\"").is_err());
    }

    #[test]
    fn test_resolve_account_hex_and_label() {
        let key = AccountId::from_label("x");
        assert_eq!(resolve_account(&key.to_hex()), key);
        assert_eq!(resolve_account("x"), key);
    }
}
