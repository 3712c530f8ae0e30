// crates/lockstake-core/src/error.rs
//
// Error taxonomy for the Lockstake staking ledger.

use thiserror::Error;

use crate::identity::Role;
use crate::token::{Amount, Seconds, Timestamp};

/// Broad category of a [`StakeError`], for hosts that map failures to
/// status codes without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad arguments: zero or out-of-range amounts, invalid lockups.
    InvalidInput,
    /// The position is not in a state that permits the operation.
    Precondition,
    /// The caller lacks the required role.
    Unauthorized,
    /// Overflow detected, or a value does not fit its storage width.
    Arithmetic,
    /// The external token ledger refused a transfer.
    Ledger,
    /// Operation rejected by a runtime guard (pause, reentrancy).
    Guard,
}

/// Error type for every staking operation.
///
/// Every error is returned before the stored position is touched, so an
/// `Err` always means the ledger is exactly as it was before the call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StakeError {
    // ── Input validation ─────────────────────────────────────────────────────
    #[error("amount must be greater than zero")]
    ZeroAmount,

    #[error("invalid lockup period: {lockup} seconds (allowed {min}..={max})")]
    InvalidLockupPeriod { lockup: Seconds, min: Seconds, max: Seconds },

    #[error("lockup increase of {delta} seconds is below the minimum of {min} seconds")]
    LockupIncreaseTooSmall { delta: Seconds, min: Seconds },

    #[error("stake of {amount} is below the minimum stake of {min}")]
    MinimumStakeAmountRequired { amount: Amount, min: Amount },

    #[error("stake total {total} would exceed the maximum stake of {max}")]
    MaximumStakeExceeded { total: Amount, max: Amount },

    #[error("value {value} does not fit the 96-bit stake amount width")]
    StakeAmountTooLarge { value: u128 },

    // ── State preconditions ──────────────────────────────────────────────────
    #[error("no stake found for account")]
    NoStakeFound,

    #[error("account already has an active stake; use increase-amount or increase-lockup")]
    ExistingStakeFound,

    #[error("stake is still locked until {unlock_time}")]
    StakeLocked { unlock_time: Timestamp },

    #[error("stake is already unlocked (unlocked at {unlock_time})")]
    StakeNotLocked { unlock_time: Timestamp },

    #[error("operation not allowed while a cooldown is active")]
    ActiveCooldown,

    #[error("no cooldown has been started")]
    NoCooldownStarted,

    #[error("cooldown not finished; withdrawal available at {ready_at}")]
    CooldownNotElapsed { ready_at: Timestamp },

    #[error("requested {requested} exceeds available stake {available}")]
    InsufficientAvailableStake { requested: Amount, available: Amount },

    #[error("requested {requested} exceeds cooldown balance {available}")]
    InsufficientCooldownAmount { requested: Amount, available: Amount },

    #[error("no stake available to penalize")]
    InsufficientStakeForPenalty,

    // ── Authorization ────────────────────────────────────────────────────────
    #[error("caller lacks the {role} role")]
    Unauthorized { role: Role },

    // ── Arithmetic safety ────────────────────────────────────────────────────
    #[error("weighted average calculation overflowed")]
    WeightedCalculationOverflow,

    #[error("arithmetic overflow in {context}")]
    ArithmeticOverflow { context: &'static str },

    // ── Collaborators ────────────────────────────────────────────────────────
    #[error("insufficient token balance: need {need}, have {have}")]
    InsufficientBalance { need: Amount, have: Amount },

    #[error("token ledger error: {0}")]
    Ledger(String),

    /// A multi-leg settlement failed and undoing the applied legs failed
    /// too. The ledger is left partly moved.
    #[error("settlement failed ({cause}) and could not be reversed ({reversal})")]
    SettlementUnreversed {
        cause: Box<StakeError>,
        reversal: Box<StakeError>,
    },

    // ── Runtime guards ───────────────────────────────────────────────────────
    #[error("staking is paused")]
    Paused,

    #[error("reentrant call for an account with an operation already in progress")]
    ReentrantCall,

    #[error("invalid parameters: {0}")]
    InvalidParams(String),
}

impl StakeError {
    /// Classify this error into its taxonomy bucket.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StakeError::ZeroAmount
            | StakeError::InvalidLockupPeriod { .. }
            | StakeError::LockupIncreaseTooSmall { .. }
            | StakeError::MinimumStakeAmountRequired { .. }
            | StakeError::MaximumStakeExceeded { .. }
            | StakeError::InvalidParams(_) => ErrorKind::InvalidInput,

            StakeError::NoStakeFound
            | StakeError::ExistingStakeFound
            | StakeError::StakeLocked { .. }
            | StakeError::StakeNotLocked { .. }
            | StakeError::ActiveCooldown
            | StakeError::NoCooldownStarted
            | StakeError::CooldownNotElapsed { .. }
            | StakeError::InsufficientAvailableStake { .. }
            | StakeError::InsufficientCooldownAmount { .. }
            | StakeError::InsufficientStakeForPenalty => ErrorKind::Precondition,

            StakeError::Unauthorized { .. } => ErrorKind::Unauthorized,

            StakeError::StakeAmountTooLarge { .. }
            | StakeError::WeightedCalculationOverflow
            | StakeError::ArithmeticOverflow { .. } => ErrorKind::Arithmetic,

            StakeError::InsufficientBalance { .. }
            | StakeError::Ledger(_)
            | StakeError::SettlementUnreversed { .. } => ErrorKind::Ledger,

            StakeError::Paused | StakeError::ReentrantCall => ErrorKind::Guard,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(StakeError::ZeroAmount.kind(), ErrorKind::InvalidInput);
        assert_eq!(StakeError::ExistingStakeFound.kind(), ErrorKind::Precondition);
        assert_eq!(
            StakeError::Unauthorized { role: Role::PenaltyAuthority }.kind(),
            ErrorKind::Unauthorized
        );
        assert_eq!(StakeError::WeightedCalculationOverflow.kind(), ErrorKind::Arithmetic);
        assert_eq!(StakeError::ReentrantCall.kind(), ErrorKind::Guard);
        let unreversed = StakeError::SettlementUnreversed {
            cause: Box::new(StakeError::Ledger("refused".into())),
            reversal: Box::new(StakeError::Ledger("frozen".into())),
        };
        assert_eq!(unreversed.kind(), ErrorKind::Ledger);
    }

    #[test]
    fn test_messages_carry_amounts() {
        let err = StakeError::InsufficientAvailableStake {
            requested: Amount::from_tokens(5).unwrap(),
            available: Amount::from_tokens(2).unwrap(),
        };
        let msg = err.to_string();
        assert!(msg.contains("5 LST"));
        assert!(msg.contains("2 LST"));
    }
}
