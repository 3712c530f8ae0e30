// crates/lockstake-economics/src/weighted.rs
//
// Weighted-average combination of an existing position with new principal.
//
// When principal is added to a live position, the unlock anchor moves toward
// `now` in proportion to the new amount, and the lockup becomes the
// amount-weighted mix of the existing *remaining* lockup and the incoming
// lockup. Two protections apply:
//
//   - Expired stake: once a position has unlocked, nothing is averaged. The
//     start becomes `now` and the lockup is the incoming lockup outright.
//     Averaging against an expired anchor would let a large fresh deposit
//     inherit an already-elapsed lock.
//   - Floor: the combined lockup is never shorter than the existing
//     remaining lockup or the incoming lockup, then capped at MAX_LOCKUP.

use lockstake_core::{Amount, Seconds, StakeError, Timestamp};
use tracing::debug;

use crate::multiplier::{validate_lockup, MAX_LOCKUP};

/// The existing side of a combination.
#[derive(Debug, Clone, Copy)]
pub struct ExistingCommitment {
    pub amount: Amount,
    pub weighted_start: Timestamp,
    pub lockup: Seconds,
}

/// Result of a combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Combined {
    pub start: Timestamp,
    pub lockup: Seconds,
}

/// `numerator / divisor`, rounded up when the remainder exceeds half the
/// divisor. Start-time and lockup weighting both go through here so they
/// break ties identically.
pub fn div_round_half_up(numerator: u128, divisor: u128) -> u128 {
    let quotient = numerator / divisor;
    let remainder = numerator % divisor;
    if remainder > divisor / 2 {
        quotient + 1
    } else {
        quotient
    }
}

/// Combine `existing` with `new_amount` committed for `new_lockup` at `now`.
///
/// # Errors
/// - `ZeroAmount` if `new_amount` is zero.
/// - `InvalidLockupPeriod` if `new_lockup` is out of range.
/// - `WeightedCalculationOverflow` if any weighted sum overflows.
pub fn combine(
    existing: ExistingCommitment,
    new_amount: Amount,
    new_lockup: Seconds,
    now: Timestamp,
) -> Result<Combined, StakeError> {
    if new_amount.is_zero() {
        return Err(StakeError::ZeroAmount);
    }
    validate_lockup(new_lockup)?;

    let total = existing
        .amount
        .wei()
        .checked_add(new_amount.wei())
        .ok_or(StakeError::WeightedCalculationOverflow)?;
    if total == 0 {
        return Err(StakeError::ZeroAmount);
    }

    let unlock_at = existing
        .weighted_start
        .checked_add(existing.lockup)
        .ok_or(StakeError::WeightedCalculationOverflow)?;

    if now >= unlock_at {
        debug!(unlock_at, now, new_lockup, "existing stake expired; relocking from now");
        return Ok(Combined {
            start: now,
            lockup: new_lockup,
        });
    }

    let remaining = unlock_at - now;
    let existing_amount = existing.amount.wei();
    let added = new_amount.wei();

    let start_sum = weighted_sum(existing.weighted_start, existing_amount, now, added)?;
    let start = u64::try_from(div_round_half_up(start_sum, total))
        .map_err(|_| StakeError::WeightedCalculationOverflow)?;

    let lockup_sum = weighted_sum(remaining, existing_amount, new_lockup, added)?;
    let raw_lockup = u64::try_from(div_round_half_up(lockup_sum, total))
        .map_err(|_| StakeError::WeightedCalculationOverflow)?;

    let lockup = raw_lockup.max(remaining).max(new_lockup).min(MAX_LOCKUP);

    debug!(
        start,
        raw_lockup,
        remaining,
        lockup,
        "weighted combination of existing and new principal"
    );

    Ok(Combined { start, lockup })
}

/// `a * wa + b * wb` with overflow detection.
fn weighted_sum(a: u64, wa: u128, b: u64, wb: u128) -> Result<u128, StakeError> {
    let left = u128::from(a)
        .checked_mul(wa)
        .ok_or(StakeError::WeightedCalculationOverflow)?;
    let right = u128::from(b)
        .checked_mul(wb)
        .ok_or(StakeError::WeightedCalculationOverflow)?;
    left.checked_add(right)
        .ok_or(StakeError::WeightedCalculationOverflow)
}
