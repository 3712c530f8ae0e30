// crates/lockstake-economics/src/params.rs
//
// Tunable protocol parameters and the administrative settings the core
// reads. Both deserialize from TOML with every field defaulted.

use serde::{Deserialize, Serialize};

use lockstake_core::{days, AccountId, Amount, BasisPoints, Seconds, StakeError, BASIS_POINTS};

/// Delay between `initiate_unstake` and `unstake`: 2 days.
pub const DEFAULT_COOLDOWN_PERIOD: Seconds = days(2);

/// Delay between `initiate_early_unstake` and `early_unstake`: 7 days.
pub const DEFAULT_EARLY_UNSTAKE_COOLDOWN: Seconds = days(7);

/// Share of an early exit sent to the treasury: 20%.
pub const DEFAULT_EARLY_UNSTAKE_PENALTY_BPS: BasisPoints = 2_000;

/// Smallest accepted `increase_lockup` delta: 7 days.
pub const DEFAULT_MIN_LOCKUP_INCREASE: Seconds = days(7);

/// Default per-account stake cap: 10,000,000 LST.
pub const DEFAULT_MAX_STAKE_TOKENS: u128 = 10_000_000;

/// Protocol timing and penalty parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingParams {
    /// Seconds a withdrawal request waits before it can be executed.
    #[serde(default = "default_cooldown_period")]
    pub cooldown_period: Seconds,

    /// Seconds an early-exit request waits before it can be executed.
    #[serde(default = "default_early_unstake_cooldown")]
    pub early_unstake_cooldown: Seconds,

    /// Penalty charged on early exit, in basis points of the exiting amount.
    #[serde(default = "default_early_unstake_penalty_bps")]
    pub early_unstake_penalty_bps: BasisPoints,

    /// Smallest lockup extension accepted by `increase_lockup`.
    #[serde(default = "default_min_lockup_increase")]
    pub min_lockup_increase: Seconds,
}

fn default_cooldown_period() -> Seconds {
    DEFAULT_COOLDOWN_PERIOD
}

fn default_early_unstake_cooldown() -> Seconds {
    DEFAULT_EARLY_UNSTAKE_COOLDOWN
}

fn default_early_unstake_penalty_bps() -> BasisPoints {
    DEFAULT_EARLY_UNSTAKE_PENALTY_BPS
}

fn default_min_lockup_increase() -> Seconds {
    DEFAULT_MIN_LOCKUP_INCREASE
}

impl Default for StakingParams {
    fn default() -> Self {
        Self {
            cooldown_period: default_cooldown_period(),
            early_unstake_cooldown: default_early_unstake_cooldown(),
            early_unstake_penalty_bps: default_early_unstake_penalty_bps(),
            min_lockup_increase: default_min_lockup_increase(),
        }
    }
}

impl StakingParams {
    /// Reject parameter sets the engine cannot honour.
    pub fn validate(&self) -> Result<(), StakeError> {
        if self.early_unstake_penalty_bps > BASIS_POINTS {
            return Err(StakeError::InvalidParams(format!(
                "early_unstake_penalty_bps {} exceeds {}",
                self.early_unstake_penalty_bps, BASIS_POINTS
            )));
        }
        if self.min_lockup_increase == 0 {
            return Err(StakeError::InvalidParams(
                "min_lockup_increase must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Settings owned by the administrative surface. The core only reads them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSettings {
    /// When set, every mutating operation is rejected.
    #[serde(default)]
    pub paused: bool,

    /// Recipient of early-exit penalties and applied penalties.
    #[serde(default = "default_treasury")]
    pub treasury: AccountId,

    /// Per-account cap on staked principal.
    #[serde(default = "default_max_stake")]
    pub max_stake: Amount,
}

fn default_treasury() -> AccountId {
    AccountId::from_label("treasury")
}

fn default_max_stake() -> Amount {
    Amount::from_tokens(DEFAULT_MAX_STAKE_TOKENS).unwrap_or(Amount::MAX)
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            paused: false,
            treasury: default_treasury(),
            max_stake: default_max_stake(),
        }
    }
}
