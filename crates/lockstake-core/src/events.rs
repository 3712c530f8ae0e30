// crates/lockstake-core/src/events.rs
//
// Notifications emitted after every committed state change. Indexers and
// UIs consume these for exact amounts; they never need to diff positions.

use serde::{Deserialize, Serialize};

use crate::identity::AccountId;
use crate::token::{Amount, BasisPoints, Seconds, Timestamp};

/// A staking notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum StakingEvent {
    /// A new position was opened.
    Staked {
        account: AccountId,
        amount: Amount,
        multiplier: BasisPoints,
        lockup: Seconds,
    },
    /// Principal was added to an existing position.
    AmountIncreased {
        account: AccountId,
        delta: Amount,
        new_total: Amount,
        new_multiplier: BasisPoints,
    },
    /// The lockup of an existing position was extended.
    LockupIncreased {
        account: AccountId,
        delta: Seconds,
        new_lockup: Seconds,
        new_multiplier: BasisPoints,
    },
    /// Part of an unlocked position was queued for withdrawal.
    UnstakeInitiated {
        account: AccountId,
        timestamp: Timestamp,
        new_cooldown_total: Amount,
    },
    /// Cooled-down principal was withdrawn.
    Unstaked { account: AccountId, amount: Amount },
    /// Principal left a locked position through the penalized exit.
    EarlyUnstake {
        account: AccountId,
        payout: Amount,
        penalty: Amount,
    },
    /// The penalty authority deducted principal.
    PenaltyApplied {
        account: AccountId,
        actual_penalty: Amount,
    },
}

impl StakingEvent {
    /// The account the event concerns.
    pub fn account(&self) -> &AccountId {
        match self {
            StakingEvent::Staked { account, .. }
            | StakingEvent::AmountIncreased { account, .. }
            | StakingEvent::LockupIncreased { account, .. }
            | StakingEvent::UnstakeInitiated { account, .. }
            | StakingEvent::Unstaked { account, .. }
            | StakingEvent::EarlyUnstake { account, .. }
            | StakingEvent::PenaltyApplied { account, .. } => account,
        }
    }

    /// Event name as exposed to indexers.
    pub fn name(&self) -> &'static str {
        match self {
            StakingEvent::Staked { .. } => "Staked",
            StakingEvent::AmountIncreased { .. } => "AmountIncreased",
            StakingEvent::LockupIncreased { .. } => "LockupIncreased",
            StakingEvent::UnstakeInitiated { .. } => "UnstakeInitiated",
            StakingEvent::Unstaked { .. } => "Unstaked",
            StakingEvent::EarlyUnstake { .. } => "EarlyUnstake",
            StakingEvent::PenaltyApplied { .. } => "PenaltyApplied",
        }
    }
}
