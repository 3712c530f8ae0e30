// crates/lockstake-economics/src/multiplier.rs
//
// Reward multiplier computation: (amount, lockup) -> basis points.
//
// The multiplier has two additive parts:
//   1. Duration component, linearly interpolated between four anchors:
//        30d -> 10_500,  90d -> 11_000,  180d -> 12_500,  365d -> 15_000
//   2. Amount bonus, capped at the width of the duration range (4_500 bps).
//
// Two amount-bonus formulas exist. `TieredBonus` is the default; it places
// the amount in one of five bonus tiers. `LogarithmicBonus` grows with each
// doubling of the stake over the minimum. Both sit behind
// `MultiplierStrategy` so a deployment can pick one explicitly.
//
// All division truncates toward zero. Recorded multiplier values depend on
// that, so do not "improve" the rounding.

use serde::{Deserialize, Serialize};
use std::fmt;

use lockstake_core::{checked_days, days, Amount, BasisPoints, Seconds, StakeError, BASIS_POINTS, WEI_PER_TOKEN};

/// Shortest allowed lockup: 30 days.
pub const MIN_LOCKUP: Seconds = days(30);

/// Longest allowed lockup: 365 days.
pub const MAX_LOCKUP: Seconds = days(365);

/// Multiplier of a position that earns no boost (1.00x).
pub const BASE_MULTIPLIER: BasisPoints = BASIS_POINTS;

/// Smallest stake accepted by the calculator: 1,000 LST.
pub const MIN_STAKE_WEI: u128 = 1_000 * WEI_PER_TOKEN;

/// Duration anchors, ascending. Exact anchor durations return the anchor
/// value; anything between two anchors is interpolated.
pub const DURATION_ANCHORS: [(Seconds, BasisPoints); 4] = [
    (days(30), 10_500),
    (days(90), 11_000),
    (days(180), 12_500),
    (days(365), 15_000),
];

/// Ceiling of the amount bonus: the width of the duration range.
pub const MAX_AMOUNT_BONUS: BasisPoints =
    DURATION_ANCHORS[3].1 - DURATION_ANCHORS[0].1;

/// Lower bounds (whole LST) of the five bonus tiers. Below the first
/// threshold a stake earns no amount bonus.
pub const TIER_THRESHOLDS_TOKENS: [u128; 5] = [2_000, 4_000, 6_000, 8_000, 10_000];

/// Share of `MAX_AMOUNT_BONUS` each tier step adds, in bps.
pub const TIER_STEP_BPS: BasisPoints = 2_000;

/// Bonus added per doubling of the stake over the minimum (logarithmic
/// strategy).
pub const LOG_STEP_BPS: BasisPoints = 1_500;

/// The minimum stake as an `Amount`.
pub fn min_stake() -> Amount {
    // MIN_STAKE_WEI is far below the 96-bit ceiling.
    Amount::from_wei(MIN_STAKE_WEI).unwrap_or(Amount::MAX)
}

/// Reject lockups outside `[MIN_LOCKUP, MAX_LOCKUP]`.
pub fn validate_lockup(lockup: Seconds) -> Result<(), StakeError> {
    if !(MIN_LOCKUP..=MAX_LOCKUP).contains(&lockup) {
        return Err(StakeError::InvalidLockupPeriod {
            lockup,
            min: MIN_LOCKUP,
            max: MAX_LOCKUP,
        });
    }
    Ok(())
}

/// Duration component of the multiplier.
///
/// # Errors
/// `InvalidLockupPeriod` if `lockup` is outside the allowed range.
pub fn duration_multiplier(lockup: Seconds) -> Result<BasisPoints, StakeError> {
    validate_lockup(lockup)?;

    for pair in DURATION_ANCHORS.windows(2) {
        let (d0, v0) = pair[0];
        let (d1, v1) = pair[1];
        if lockup == d0 {
            return Ok(v0);
        }
        if lockup < d1 {
            let span = u128::from(v1 - v0) * u128::from(lockup - d0) / u128::from(d1 - d0);
            return Ok(v0 + span as BasisPoints);
        }
    }

    // Only the final anchor is left.
    Ok(DURATION_ANCHORS[DURATION_ANCHORS.len() - 1].1)
}

/// Index (0..=5) of the bonus tier `amount` falls into.
pub fn tier_index(amount: Amount) -> u32 {
    TIER_THRESHOLDS_TOKENS
        .iter()
        .filter(|&&t| amount.wei() >= t * WEI_PER_TOKEN)
        .count() as u32
}

/// A formula turning (amount, lockup) into a multiplier.
pub trait MultiplierStrategy: Send + Sync + fmt::Debug {
    /// Short name used in configuration and logs.
    fn name(&self) -> &'static str;

    /// The amount bonus in bps, never above `MAX_AMOUNT_BONUS`. Only called
    /// with amounts at or above the minimum stake.
    fn amount_bonus(&self, amount: Amount) -> BasisPoints;

    /// Full multiplier for a stake.
    ///
    /// # Errors
    /// - `InvalidLockupPeriod` if `lockup` is outside 30..=365 days.
    /// - `MinimumStakeAmountRequired` if `amount` is below 1,000 LST.
    fn multiplier(&self, amount: Amount, lockup: Seconds) -> Result<BasisPoints, StakeError> {
        let duration = duration_multiplier(lockup)?;
        if amount.wei() < MIN_STAKE_WEI {
            return Err(StakeError::MinimumStakeAmountRequired {
                amount,
                min: min_stake(),
            });
        }
        Ok(duration + self.amount_bonus(amount).min(MAX_AMOUNT_BONUS))
    }
}

/// Five-tier additive bonus. Tier `i` adds `i * 2000 / 10000` of the
/// duration range, so the top tier adds the full 4_500 bps.
#[derive(Debug, Clone, Copy, Default)]
pub struct TieredBonus;

impl MultiplierStrategy for TieredBonus {
    fn name(&self) -> &'static str {
        "tiered"
    }

    fn amount_bonus(&self, amount: Amount) -> BasisPoints {
        let tier_bps = tier_index(amount) * TIER_STEP_BPS;
        MAX_AMOUNT_BONUS * tier_bps / BASIS_POINTS
    }
}

/// Logarithmic bonus: `1500 * floor(log2(amount / min_stake))`, capped.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogarithmicBonus;

impl MultiplierStrategy for LogarithmicBonus {
    fn name(&self) -> &'static str {
        "logarithmic"
    }

    fn amount_bonus(&self, amount: Amount) -> BasisPoints {
        let ratio = amount.wei() / MIN_STAKE_WEI;
        if ratio == 0 {
            return 0;
        }
        (ratio.ilog2() * LOG_STEP_BPS).min(MAX_AMOUNT_BONUS)
    }
}

/// Selectable strategy, as named in configuration files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    #[default]
    Tiered,
    Logarithmic,
}

impl StrategyKind {
    pub fn build(self) -> Box<dyn MultiplierStrategy> {
        match self {
            StrategyKind::Tiered => Box::new(TieredBonus),
            StrategyKind::Logarithmic => Box::new(LogarithmicBonus),
        }
    }
}

/// Multiplier under the default (tiered) strategy.
pub fn multiplier(amount: Amount, lockup: Seconds) -> Result<BasisPoints, StakeError> {
    TieredBonus.multiplier(amount, lockup)
}

/// The multiplier cached on a position.
///
/// Positions reduced below the minimum stake by a penalty keep their
/// lockup but fall back to `BASE_MULTIPLIER` instead of failing.
pub fn position_multiplier(
    strategy: &dyn MultiplierStrategy,
    amount: Amount,
    lockup: Seconds,
) -> Result<BasisPoints, StakeError> {
    if amount.is_zero() {
        return Ok(0);
    }
    if amount.wei() < MIN_STAKE_WEI {
        validate_lockup(lockup)?;
        return Ok(BASE_MULTIPLIER);
    }
    strategy.multiplier(amount, lockup)
}

/// One row of a multiplier sweep.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepRow {
    pub tokens: u128,
    pub lockup_days: u64,
    pub multiplier: BasisPoints,
}

/// Evaluate `strategy` over every (amount, lockup) combination.
///
/// Rows are ordered by lockup, then amount.
pub fn sweep(
    strategy: &dyn MultiplierStrategy,
    token_amounts: &[u128],
    lockup_days: &[u64],
) -> Result<Vec<SweepRow>, StakeError> {
    let mut rows = Vec::with_capacity(token_amounts.len() * lockup_days.len());
    for &d in lockup_days {
        for &tokens in token_amounts {
            let amount = Amount::from_tokens(tokens)?;
            rows.push(SweepRow {
                tokens,
                lockup_days: d,
                multiplier: strategy.multiplier(amount, checked_days(d)?)?,
            });
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(n: u128) -> Amount {
        Amount::from_tokens(n).unwrap()
    }

    #[test]
    fn test_anchor_values_exact() {
        assert_eq!(duration_multiplier(days(30)).unwrap(), 10_500);
        assert_eq!(duration_multiplier(days(90)).unwrap(), 11_000);
        assert_eq!(duration_multiplier(days(180)).unwrap(), 12_500);
        assert_eq!(duration_multiplier(days(365)).unwrap(), 15_000);
    }

    #[test]
    fn test_interpolation_truncates() {
        // 60d: halfway between 30d and 90d
        assert_eq!(duration_multiplier(days(60)).unwrap(), 10_750);
        // 135d: halfway between 90d and 180d
        assert_eq!(duration_multiplier(days(135)).unwrap(), 11_750);
        // 31d: 10_500 + 500 * 1 / 60 = 10_508.33 -> 10_508
        assert_eq!(duration_multiplier(days(31)).unwrap(), 10_508);
        // 200d: 12_500 + 2_500 * 20 / 185 = 12_770.27 -> 12_770
        assert_eq!(duration_multiplier(days(200)).unwrap(), 12_770);
        // One second past an anchor still interpolates.
        assert_eq!(duration_multiplier(days(90) + 1).unwrap(), 11_000);
    }

    #[test]
    fn test_lockup_out_of_range_rejected() {
        assert!(matches!(
            duration_multiplier(days(30) - 1),
            Err(StakeError::InvalidLockupPeriod { .. })
        ));
        assert!(matches!(
            duration_multiplier(days(365) + 1),
            Err(StakeError::InvalidLockupPeriod { .. })
        ));
        assert!(multiplier(tokens(5_000), 0).is_err());
    }

    #[test]
    fn test_tier_index() {
        assert_eq!(tier_index(tokens(1_000)), 0);
        assert_eq!(tier_index(tokens(1_999)), 0);
        assert_eq!(tier_index(tokens(2_000)), 1);
        assert_eq!(tier_index(tokens(5_000)), 2);
        assert_eq!(tier_index(tokens(9_999)), 4);
        assert_eq!(tier_index(tokens(10_000)), 5);
        assert_eq!(tier_index(tokens(1_000_000)), 5);
    }

    #[test]
    fn test_multiplier_matrix() {
        let m = multiplier(tokens(1_000), days(30)).unwrap();
        assert!((10_500..=10_700).contains(&m));
        assert_eq!(m, 10_500);

        assert_eq!(multiplier(tokens(10_000), days(365)).unwrap(), 19_500);
        assert_eq!(multiplier(tokens(2_000), days(30)).unwrap(), 11_400);
        assert_eq!(multiplier(tokens(5_000), days(90)).unwrap(), 12_800);
        assert_eq!(multiplier(tokens(50_000), days(180)).unwrap(), 17_000);
    }

    #[test]
    fn test_below_minimum_rejected() {
        for lockup in [days(30), days(90), days(365)] {
            assert!(matches!(
                multiplier(tokens(999), lockup),
                Err(StakeError::MinimumStakeAmountRequired { .. })
            ));
        }
    }

    #[test]
    fn test_logarithmic_bonus() {
        let log = LogarithmicBonus;
        assert_eq!(log.amount_bonus(tokens(1_000)), 0);
        assert_eq!(log.amount_bonus(tokens(2_000)), 1_500);
        assert_eq!(log.amount_bonus(tokens(5_000)), 3_000);
        assert_eq!(log.amount_bonus(tokens(8_000)), 4_500);
        assert_eq!(log.amount_bonus(tokens(1_000_000)), MAX_AMOUNT_BONUS);
        assert_eq!(log.multiplier(tokens(8_000), days(365)).unwrap(), 19_500);
    }

    #[test]
    fn test_position_multiplier_below_minimum_is_base() {
        let strategy = TieredBonus;
        assert_eq!(
            position_multiplier(&strategy, tokens(500), days(90)).unwrap(),
            BASE_MULTIPLIER
        );
        assert_eq!(position_multiplier(&strategy, Amount::ZERO, days(90)).unwrap(), 0);
        assert_eq!(
            position_multiplier(&strategy, tokens(1_000), days(90)).unwrap(),
            11_000
        );
    }

    #[test]
    fn test_multiplier_monotonic_in_lockup() {
        let mut prev = 0;
        for d in 30..=365 {
            let m = multiplier(tokens(1_000), days(d)).unwrap();
            assert!(m >= prev, "multiplier dropped at {} days", d);
            prev = m;
        }
    }

    #[test]
    fn test_sweep_rows() {
        let rows = sweep(&TieredBonus, &[1_000, 10_000], &[30, 365]).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(
            rows[0],
            SweepRow { tokens: 1_000, lockup_days: 30, multiplier: 10_500 }
        );
        assert_eq!(rows[3].multiplier, 19_500);
        assert!(sweep(&TieredBonus, &[999], &[30]).is_err());
    }

    #[test]
    fn test_sweep_rejects_day_count_overflow() {
        // 2^57 + 30 days wraps to exactly 30 days of seconds.
        assert_eq!(
            sweep(&TieredBonus, &[1_000], &[30 + (1u64 << 57)]),
            Err(StakeError::ArithmeticOverflow { context: "day count" })
        );
    }

    #[test]
    fn test_strategy_kind_builds() {
        assert_eq!(StrategyKind::Tiered.build().name(), "tiered");
        assert_eq!(StrategyKind::Logarithmic.build().name(), "logarithmic");
        assert_eq!(StrategyKind::default(), StrategyKind::Tiered);
    }
}
