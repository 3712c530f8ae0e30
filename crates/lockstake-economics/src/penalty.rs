// crates/lockstake-economics/src/penalty.rs
//
// Penalty application by the penalty authority.
//
// A penalty removes principal from a position regardless of its lock or
// cooldown state. The request is clamped to the staked amount, and both
// withdrawal queues are then clamped so they never claim more principal than
// is left: the ordinary cooldown first, the early-exit queue from whatever
// remains after it. Deducted tokens flow to the treasury.

use lockstake_core::{AccountId, Amount, Role, StakeError, StakingEvent, Timestamp};
use tracing::{info, warn};

use crate::position::StakePosition;
use crate::staking::StakingEngine;

/// Remove up to `requested` from `position`.
///
/// Returns the reduced position (multiplier not yet recomputed) and the
/// amount actually deducted.
pub fn deduct_penalty(mut position: StakePosition, requested: Amount) -> (StakePosition, Amount) {
    let actual = requested.min(position.amount);
    position.amount = position.amount.saturating_sub(actual);

    position.cooldown_amount = position.cooldown_amount.min(position.amount);
    if position.cooldown_amount.is_zero() {
        position.cooldown_start = 0;
    }

    let room = position.amount.saturating_sub(position.cooldown_amount);
    position.early_cooldown_amount = position.early_cooldown_amount.min(room);
    if position.early_cooldown_amount.is_zero() {
        position.early_cooldown_start = 0;
    }

    (position, actual)
}

impl StakingEngine {
    /// Deduct up to `requested` from `account`'s position. Only callers
    /// holding `Role::PenaltyAuthority` may do this. Returns the amount
    /// actually deducted.
    ///
    /// Penalties are still accepted while staking is paused.
    ///
    /// # Errors
    /// - `Unauthorized` if `caller` lacks the penalty role.
    /// - `InsufficientStakeForPenalty` if nothing can be deducted.
    /// - Any ledger error from paying the treasury.
    pub fn apply_penalty(
        &self,
        caller: &AccountId,
        account: &AccountId,
        requested: Amount,
        now: Timestamp,
    ) -> Result<Amount, StakeError> {
        if !self.roles.has_role(Role::PenaltyAuthority, caller) {
            warn!(caller = %caller, account = %account, "unauthorized penalty attempt");
            return Err(StakeError::Unauthorized {
                role: Role::PenaltyAuthority,
            });
        }
        let _guard = self.in_flight.enter(*account)?;

        let position = self.snapshot_at(account, now);
        let (reduced, actual) = deduct_penalty(position, requested);
        if actual.is_zero() {
            return Err(StakeError::InsufficientStakeForPenalty);
        }
        // `reduce` recomputes the multiplier; hand it the pre-penalty
        // principal so it subtracts exactly `actual`.
        let restored = StakePosition {
            amount: position.amount,
            ..reduced
        };
        let updated = self.reduce(restored, actual, now)?;

        self.ledger.credit(&self.settings.treasury, actual)?;
        self.commit(account, updated);

        info!(
            caller = %caller,
            account = %account,
            requested = %requested,
            actual = %actual,
            remaining = %updated.amount,
            "penalty applied"
        );
        self.emit(StakingEvent::PenaltyApplied {
            account: *account,
            actual_penalty: actual,
        });
        Ok(actual)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use lockstake_core::days;

    use crate::ledger::InMemoryLedger;
    use crate::params::{AdminSettings, StakingParams};
    use crate::roles::RoleRegistry;

    const T0: Timestamp = 1_700_000_000;

    fn tokens(n: u128) -> Amount {
        Amount::from_tokens(n).unwrap()
    }

    fn setup() -> (StakingEngine, Arc<InMemoryLedger>, AccountId, AccountId) {
        let ledger = Arc::new(InMemoryLedger::new());
        let alice = AccountId::from_label("alice");
        let slasher = AccountId::from_label("slasher");
        ledger.mint(&alice, tokens(50_000)).unwrap();
        let roles = RoleRegistry::new().with_member(Role::PenaltyAuthority, slasher);
        let engine = StakingEngine::new(
            StakingParams::default(),
            AdminSettings::default(),
            ledger.clone(),
            Arc::new(roles),
        )
        .unwrap();
        (engine, ledger, alice, slasher)
    }

    #[test]
    fn test_deduct_clamps_both_queues() {
        let position = StakePosition {
            amount: tokens(1_000),
            cooldown_amount: tokens(600),
            cooldown_start: T0,
            early_cooldown_amount: tokens(300),
            early_cooldown_start: T0,
            ..StakePosition::default()
        };
        let (reduced, actual) = deduct_penalty(position, tokens(500));
        assert_eq!(actual, tokens(500));
        assert_eq!(reduced.amount, tokens(500));
        assert_eq!(reduced.cooldown_amount, tokens(500));
        assert_eq!(reduced.early_cooldown_amount, Amount::ZERO);
        assert_eq!(reduced.early_cooldown_start, 0);
        assert_eq!(reduced.cooldown_start, T0);
    }

    #[test]
    fn test_deduct_more_than_staked() {
        let position = StakePosition {
            amount: tokens(1_000),
            cooldown_amount: tokens(1_000),
            cooldown_start: T0,
            ..StakePosition::default()
        };
        let (reduced, actual) = deduct_penalty(position, tokens(5_000));
        assert_eq!(actual, tokens(1_000));
        assert!(reduced.is_empty());
        assert_eq!(reduced.cooldown_amount, Amount::ZERO);
        assert_eq!(reduced.cooldown_start, 0);
    }

    #[test]
    fn test_unauthorized_caller_rejected() {
        let (engine, _, alice, _) = setup();
        engine.stake(&alice, tokens(1_000), days(30), T0).unwrap();
        assert_eq!(
            engine.apply_penalty(&alice, &alice, tokens(10), T0),
            Err(StakeError::Unauthorized {
                role: Role::PenaltyAuthority
            })
        );
        assert_eq!(engine.get_total_staked(&alice), tokens(1_000));
    }

    #[test]
    fn test_penalty_on_missing_stake() {
        let (engine, _, alice, slasher) = setup();
        assert_eq!(
            engine.apply_penalty(&slasher, &alice, tokens(10), T0),
            Err(StakeError::InsufficientStakeForPenalty)
        );
    }

    #[test]
    fn test_penalty_pays_treasury_and_recomputes_multiplier() {
        let (engine, ledger, alice, slasher) = setup();
        engine.stake(&alice, tokens(4_000), days(30), T0).unwrap();
        let actual = engine
            .apply_penalty(&slasher, &alice, tokens(1_000), T0 + days(1))
            .unwrap();
        assert_eq!(actual, tokens(1_000));
        assert_eq!(ledger.balance_of(&engine.settings().treasury), tokens(1_000));

        let position = engine.get_position(&alice);
        assert_eq!(position.amount, tokens(3_000));
        // 3_000 LST sits in tier 1.
        assert_eq!(position.effective_multiplier, 10_500 + 900);
        assert_eq!(position.unlock_time(), T0 + days(30));
    }

    #[test]
    fn test_penalty_below_minimum_falls_back_to_base() {
        let (engine, _, alice, slasher) = setup();
        engine.stake(&alice, tokens(1_000), days(90), T0).unwrap();
        engine.apply_penalty(&slasher, &alice, tokens(1), T0).unwrap();
        assert_eq!(engine.get_position(&alice).effective_multiplier, 10_000);
    }
}
