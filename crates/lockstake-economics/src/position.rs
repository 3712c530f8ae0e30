// crates/lockstake-economics/src/position.rs
//
// The per-account stake record and the lifecycle state derived from it.
//
// Lifecycle (derived, never stored):
//   NoStake -> Locked -> Unlocked -> Cooldown -> Ready -> (NoStake)
//
// Locked positions may also carry an early-exit queue, which has its own
// cooldown and pays out minus a penalty.

use serde::{Deserialize, Serialize};
use std::fmt;

use lockstake_core::{Amount, BasisPoints, Seconds, Timestamp};

/// A single account's stake.
///
/// Created on first stake and reset to `Default` when the principal
/// returns to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakePosition {
    /// Staked principal, including any queued for withdrawal.
    pub amount: Amount,
    /// Anchor from which `effective_lockup` runs. Recomputed whenever
    /// principal is added.
    pub weighted_start: Timestamp,
    /// Lock duration from `weighted_start`, in seconds.
    pub effective_lockup: Seconds,
    /// Cached multiplier for (amount, effective_lockup).
    pub effective_multiplier: BasisPoints,
    /// Principal queued for ordinary withdrawal.
    pub cooldown_amount: Amount,
    /// When the ordinary cooldown began (0 if none).
    pub cooldown_start: Timestamp,
    /// Principal queued for penalized early exit.
    pub early_cooldown_amount: Amount,
    /// When the early-exit cooldown began (0 if none).
    pub early_cooldown_start: Timestamp,
    pub last_update: Timestamp,
}

impl StakePosition {
    pub fn is_empty(&self) -> bool {
        self.amount.is_zero()
    }

    /// Timestamp at which the lock expires.
    pub fn unlock_time(&self) -> Timestamp {
        self.weighted_start.saturating_add(self.effective_lockup)
    }

    pub fn is_locked(&self, now: Timestamp) -> bool {
        !self.is_empty() && now < self.unlock_time()
    }

    /// Principal not queued in either cooldown.
    pub fn free_amount(&self) -> Amount {
        self.amount
            .saturating_sub(self.cooldown_amount)
            .saturating_sub(self.early_cooldown_amount)
    }

    /// Any cooldown (ordinary or early-exit) holds principal.
    pub fn has_active_cooldown(&self) -> bool {
        !self.cooldown_amount.is_zero() || !self.early_cooldown_amount.is_zero()
    }

    /// Drop an early-exit queue whose lock has expired. Early exit only
    /// applies to locked principal; once the lock lapses the queued amount
    /// is free again and leaves through the ordinary cooldown.
    pub fn release_lapsed_early_exit(mut self, now: Timestamp) -> Self {
        if !self.early_cooldown_amount.is_zero() && !self.is_locked(now) {
            self.early_cooldown_amount = Amount::ZERO;
            self.early_cooldown_start = 0;
        }
        self
    }

    /// When the ordinary cooldown matures, if one is running.
    pub fn cooldown_ready_at(&self, cooldown_period: Seconds) -> Option<Timestamp> {
        if self.cooldown_amount.is_zero() {
            return None;
        }
        Some(self.cooldown_start.saturating_add(cooldown_period))
    }

    /// When the early-exit cooldown matures, if one is running.
    pub fn early_ready_at(&self, early_cooldown_period: Seconds) -> Option<Timestamp> {
        if self.early_cooldown_amount.is_zero() {
            return None;
        }
        Some(self.early_cooldown_start.saturating_add(early_cooldown_period))
    }

    /// Derive the lifecycle state at `now`.
    pub fn state(&self, now: Timestamp, cooldown_period: Seconds) -> StakeState {
        if self.is_empty() {
            return StakeState::NoStake;
        }
        if let Some(ready_at) = self.cooldown_ready_at(cooldown_period) {
            return if now < ready_at {
                StakeState::Cooldown
            } else {
                StakeState::Ready
            };
        }
        if now < self.unlock_time() {
            StakeState::Locked
        } else {
            StakeState::Unlocked
        }
    }
}

/// Lifecycle state of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StakeState {
    /// No principal staked.
    NoStake,
    /// Principal staked and the lock has not expired.
    Locked,
    /// Lock expired; principal may be queued for withdrawal.
    Unlocked,
    /// Principal queued and the cooldown is still running.
    Cooldown,
    /// Cooldown finished; queued principal can be withdrawn.
    Ready,
}

impl fmt::Display for StakeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StakeState::NoStake => write!(f, "NoStake"),
            StakeState::Locked => write!(f, "Locked"),
            StakeState::Unlocked => write!(f, "Unlocked"),
            StakeState::Cooldown => write!(f, "Cooldown"),
            StakeState::Ready => write!(f, "Ready"),
        }
    }
}

/// Everything an indexer or UI shows for one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StakeSummary {
    pub state: StakeState,
    pub total_staked: Amount,
    pub unlocked_amount: Amount,
    pub locked_amount: Amount,
    pub cooldown_amount: Amount,
    pub ready_amount: Amount,
    pub early_exit_amount: Amount,
    pub multiplier: BasisPoints,
    pub effective_lockup: Seconds,
    pub unlock_time: Timestamp,
    pub time_until_unlock: Seconds,
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockstake_core::days;

    fn position(amount: u128, start: Timestamp, lockup: Seconds) -> StakePosition {
        StakePosition {
            amount: Amount::from_tokens(amount).unwrap(),
            weighted_start: start,
            effective_lockup: lockup,
            ..StakePosition::default()
        }
    }

    #[test]
    fn test_empty_position_is_no_stake() {
        assert_eq!(StakePosition::default().state(0, days(2)), StakeState::NoStake);
    }

    #[test]
    fn test_locked_then_unlocked() {
        let p = position(1_000, 100, days(30));
        assert_eq!(p.state(100, days(2)), StakeState::Locked);
        assert_eq!(p.state(100 + days(30) - 1, days(2)), StakeState::Locked);
        assert_eq!(p.state(100 + days(30), days(2)), StakeState::Unlocked);
    }

    #[test]
    fn test_cooldown_then_ready() {
        let mut p = position(1_000, 0, days(30));
        p.cooldown_amount = Amount::from_tokens(400).unwrap();
        p.cooldown_start = days(31);
        assert_eq!(p.state(days(32), days(2)), StakeState::Cooldown);
        assert_eq!(p.state(days(33), days(2)), StakeState::Ready);
        assert_eq!(p.cooldown_ready_at(days(2)), Some(days(33)));
    }

    #[test]
    fn test_free_amount_excludes_both_queues() {
        let mut p = position(1_000, 0, days(30));
        p.cooldown_amount = Amount::from_tokens(300).unwrap();
        p.early_cooldown_amount = Amount::from_tokens(200).unwrap();
        assert_eq!(p.free_amount(), Amount::from_tokens(500).unwrap());
        assert!(p.has_active_cooldown());
    }

    #[test]
    fn test_early_exit_queue_lapses_with_lock() {
        let mut p = position(1_000, 0, days(30));
        p.early_cooldown_amount = Amount::from_tokens(1_000).unwrap();
        p.early_cooldown_start = days(29);

        let held = p.release_lapsed_early_exit(days(30) - 1);
        assert_eq!(held.early_cooldown_amount, Amount::from_tokens(1_000).unwrap());
        assert_eq!(held.free_amount(), Amount::ZERO);

        let lapsed = p.release_lapsed_early_exit(days(30));
        assert_eq!(lapsed.early_cooldown_amount, Amount::ZERO);
        assert_eq!(lapsed.early_cooldown_start, 0);
        assert_eq!(lapsed.free_amount(), Amount::from_tokens(1_000).unwrap());
        assert!(!lapsed.has_active_cooldown());
    }
}
