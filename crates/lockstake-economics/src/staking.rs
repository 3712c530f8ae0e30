// crates/lockstake-economics/src/staking.rs
//
// The staking state machine: stake, increase-amount, increase-lockup,
// initiate-unstake, unstake, and the penalized early-exit path, plus the
// read-only queries used by indexers and UIs.
//
// Every mutating operation follows the same shape:
//   1. enter the per-account guard (rejects reentrant calls),
//   2. take a snapshot of the position and validate against it,
//   3. build the updated position on the snapshot,
//   4. move tokens through the ledger,
//   5. commit the updated position and emit the notification.
// Any error before step 5 leaves the store untouched.
//
// Withdrawal requests accumulate: the first `initiate_unstake` starts the
// cooldown clock and later requests add to the same window without
// restarting it. The early-exit queue behaves the same way, but only holds
// while the position is locked: once the lock lapses the queued principal is
// released and leaves through the ordinary cooldown.

use std::sync::{Arc, Mutex, PoisonError};

use lockstake_core::{
    AccountId, Amount, EventSink, LedgerOp, RoleAuthority, Seconds, StakeError, StakingEvent,
    Timestamp, TokenLedger,
};
use tracing::{debug, info};

use crate::guard::InFlight;
use crate::multiplier::{position_multiplier, validate_lockup, MultiplierStrategy, TieredBonus, MAX_LOCKUP};
use crate::params::{AdminSettings, StakingParams};
use crate::position::{StakePosition, StakeState, StakeSummary};
use crate::sink::NullSink;
use crate::store::PositionStore;
use crate::weighted::{combine, ExistingCommitment};

/// Outcome of an executed early exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EarlyExit {
    /// Paid to the staker.
    pub payout: Amount,
    /// Sent to the treasury.
    pub penalty: Amount,
}

/// The staking engine. Owns every stake position.
pub struct StakingEngine {
    pub(crate) store: Mutex<PositionStore>,
    pub(crate) in_flight: InFlight,
    pub(crate) params: StakingParams,
    pub(crate) settings: AdminSettings,
    pub(crate) strategy: Box<dyn MultiplierStrategy>,
    pub(crate) ledger: Arc<dyn TokenLedger>,
    pub(crate) roles: Arc<dyn RoleAuthority>,
    pub(crate) events: Arc<dyn EventSink>,
}

impl StakingEngine {
    /// Create an engine with the default (tiered) multiplier strategy and
    /// no event consumer.
    ///
    /// # Errors
    /// `InvalidParams` if `params` fail validation.
    pub fn new(
        params: StakingParams,
        settings: AdminSettings,
        ledger: Arc<dyn TokenLedger>,
        roles: Arc<dyn RoleAuthority>,
    ) -> Result<Self, StakeError> {
        params.validate()?;
        Ok(Self {
            store: Mutex::new(PositionStore::new()),
            in_flight: InFlight::new(),
            params,
            settings,
            strategy: Box::new(TieredBonus),
            ledger,
            roles,
            events: Arc::new(NullSink),
        })
    }

    pub fn with_strategy(mut self, strategy: Box<dyn MultiplierStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn params(&self) -> &StakingParams {
        &self.params
    }

    pub fn settings(&self) -> &AdminSettings {
        &self.settings
    }

    pub fn strategy(&self) -> &dyn MultiplierStrategy {
        self.strategy.as_ref()
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    pub(crate) fn snapshot(&self, account: &AccountId) -> StakePosition {
        self.store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(account)
    }

    /// Snapshot with any early-exit queue whose lock has expired released.
    pub(crate) fn snapshot_at(&self, account: &AccountId, now: Timestamp) -> StakePosition {
        self.snapshot(account).release_lapsed_early_exit(now)
    }

    pub(crate) fn commit(&self, account: &AccountId, position: StakePosition) {
        self.store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .put(*account, position);
    }

    pub(crate) fn emit(&self, event: StakingEvent) {
        self.events.emit(event);
    }

    fn ensure_not_paused(&self) -> Result<(), StakeError> {
        if self.settings.paused {
            return Err(StakeError::Paused);
        }
        Ok(())
    }

    fn ensure_within_cap(&self, total: Amount) -> Result<(), StakeError> {
        if total > self.settings.max_stake {
            return Err(StakeError::MaximumStakeExceeded {
                total,
                max: self.settings.max_stake,
            });
        }
        Ok(())
    }

    /// Position with `amount` removed and the multiplier brought back in
    /// line. Returns the empty position if nothing is left.
    pub(crate) fn reduce(
        &self,
        mut position: StakePosition,
        amount: Amount,
        now: Timestamp,
    ) -> Result<StakePosition, StakeError> {
        position.amount = position
            .amount
            .checked_sub(amount)
            .ok_or(StakeError::ArithmeticOverflow { context: "principal reduction" })?;
        if position.amount.is_zero() {
            return Ok(StakePosition::default());
        }
        position.effective_multiplier =
            position_multiplier(self.strategy.as_ref(), position.amount, position.effective_lockup)?;
        position.last_update = now;
        Ok(position)
    }

    // ── Operations ───────────────────────────────────────────────────────────

    /// Open a new position of `amount` locked for `lockup` seconds.
    ///
    /// # Errors
    /// - `ExistingStakeFound` if the account already has a position.
    /// - `ZeroAmount`, `MaximumStakeExceeded`, `InvalidLockupPeriod`,
    ///   `MinimumStakeAmountRequired` on bad input.
    /// - Any ledger error from debiting the caller.
    pub fn stake(
        &self,
        account: &AccountId,
        amount: Amount,
        lockup: Seconds,
        now: Timestamp,
    ) -> Result<StakePosition, StakeError> {
        self.ensure_not_paused()?;
        let _guard = self.in_flight.enter(*account)?;

        if !self.snapshot(account).is_empty() {
            return Err(StakeError::ExistingStakeFound);
        }
        if amount.is_zero() {
            return Err(StakeError::ZeroAmount);
        }
        self.ensure_within_cap(amount)?;

        let multiplier = self.strategy.multiplier(amount, lockup)?;
        let position = StakePosition {
            amount,
            weighted_start: now,
            effective_lockup: lockup,
            effective_multiplier: multiplier,
            last_update: now,
            ..StakePosition::default()
        };

        self.ledger.debit(account, amount)?;
        self.commit(account, position);

        info!(account = %account, amount = %amount, multiplier, lockup, "stake opened");
        self.emit(StakingEvent::Staked {
            account: *account,
            amount,
            multiplier,
            lockup,
        });
        Ok(position)
    }

    /// Add `delta` principal to an existing position. The lockup duration
    /// is carried over; only the start anchor moves, unless the position has
    /// already unlocked, in which case it relocks from `now`.
    pub fn increase_amount(
        &self,
        account: &AccountId,
        delta: Amount,
        now: Timestamp,
    ) -> Result<StakePosition, StakeError> {
        self.ensure_not_paused()?;
        let _guard = self.in_flight.enter(*account)?;

        if delta.is_zero() {
            return Err(StakeError::ZeroAmount);
        }
        let position = self.snapshot_at(account, now);
        if position.is_empty() {
            return Err(StakeError::NoStakeFound);
        }
        if position.has_active_cooldown() {
            return Err(StakeError::ActiveCooldown);
        }

        let new_total = position.amount.checked_add(delta)?;
        self.ensure_within_cap(new_total)?;

        let combined = combine(
            ExistingCommitment {
                amount: position.amount,
                weighted_start: position.weighted_start,
                lockup: position.effective_lockup,
            },
            delta,
            position.effective_lockup,
            now,
        )?;
        let multiplier = position_multiplier(self.strategy.as_ref(), new_total, combined.lockup)?;

        let updated = StakePosition {
            amount: new_total,
            weighted_start: combined.start,
            effective_lockup: combined.lockup,
            effective_multiplier: multiplier,
            last_update: now,
            ..position
        };

        self.ledger.debit(account, delta)?;
        self.commit(account, updated);

        info!(
            account = %account,
            delta = %delta,
            new_total = %new_total,
            multiplier,
            lockup = combined.lockup,
            "stake amount increased"
        );
        self.emit(StakingEvent::AmountIncreased {
            account: *account,
            delta,
            new_total,
            new_multiplier: multiplier,
        });
        Ok(updated)
    }

    /// Extend the lock by `delta` seconds measured from `now`.
    ///
    /// A live position keeps its remaining lock and adds `delta` on top; an
    /// expired one relocks for `delta` alone. Either way the start anchor
    /// becomes `now` and the result is capped at 365 days.
    pub fn increase_lockup(
        &self,
        account: &AccountId,
        delta: Seconds,
        now: Timestamp,
    ) -> Result<StakePosition, StakeError> {
        self.ensure_not_paused()?;
        let _guard = self.in_flight.enter(*account)?;

        let position = self.snapshot_at(account, now);
        if position.is_empty() {
            return Err(StakeError::NoStakeFound);
        }
        if position.has_active_cooldown() {
            return Err(StakeError::ActiveCooldown);
        }
        if delta < self.params.min_lockup_increase {
            return Err(StakeError::LockupIncreaseTooSmall {
                delta,
                min: self.params.min_lockup_increase,
            });
        }

        let unlock_at = position.unlock_time();
        let uncapped = if now >= unlock_at {
            delta
        } else {
            (unlock_at - now)
                .checked_add(delta)
                .ok_or(StakeError::ArithmeticOverflow { context: "lockup extension" })?
        };
        let new_lockup = uncapped.min(MAX_LOCKUP);
        validate_lockup(new_lockup)?;

        let multiplier = position_multiplier(self.strategy.as_ref(), position.amount, new_lockup)?;
        let updated = StakePosition {
            weighted_start: now,
            effective_lockup: new_lockup,
            effective_multiplier: multiplier,
            last_update: now,
            ..position
        };
        self.commit(account, updated);

        info!(account = %account, delta, new_lockup, multiplier, "stake lockup increased");
        self.emit(StakingEvent::LockupIncreased {
            account: *account,
            delta,
            new_lockup,
            new_multiplier: multiplier,
        });
        Ok(updated)
    }

    /// Queue `amount` of an unlocked position for withdrawal.
    pub fn initiate_unstake(
        &self,
        account: &AccountId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<StakePosition, StakeError> {
        self.ensure_not_paused()?;
        let _guard = self.in_flight.enter(*account)?;

        if amount.is_zero() {
            return Err(StakeError::ZeroAmount);
        }
        let mut position = self.snapshot_at(account, now);
        if position.is_empty() {
            return Err(StakeError::NoStakeFound);
        }
        if now < position.unlock_time() {
            return Err(StakeError::StakeLocked {
                unlock_time: position.unlock_time(),
            });
        }
        let available = position.free_amount();
        if amount > available {
            return Err(StakeError::InsufficientAvailableStake {
                requested: amount,
                available,
            });
        }

        if position.cooldown_amount.is_zero() {
            position.cooldown_start = now;
        }
        position.cooldown_amount = position.cooldown_amount.checked_add(amount)?;
        position.last_update = now;
        self.commit(account, position);

        info!(
            account = %account,
            amount = %amount,
            cooldown_total = %position.cooldown_amount,
            cooldown_start = position.cooldown_start,
            "unstake initiated"
        );
        self.emit(StakingEvent::UnstakeInitiated {
            account: *account,
            timestamp: now,
            new_cooldown_total: position.cooldown_amount,
        });
        Ok(position)
    }

    /// Withdraw `amount` from a matured cooldown. Returns the amount paid.
    pub fn unstake(
        &self,
        account: &AccountId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<Amount, StakeError> {
        self.ensure_not_paused()?;
        let _guard = self.in_flight.enter(*account)?;

        if amount.is_zero() {
            return Err(StakeError::ZeroAmount);
        }
        let mut position = self.snapshot(account);
        if position.is_empty() {
            return Err(StakeError::NoStakeFound);
        }
        let ready_at = position
            .cooldown_ready_at(self.params.cooldown_period)
            .ok_or(StakeError::NoCooldownStarted)?;
        if now < ready_at {
            return Err(StakeError::CooldownNotElapsed { ready_at });
        }
        let cooling = position.cooldown_amount;
        position.cooldown_amount = cooling
            .checked_sub(amount)
            .ok_or(StakeError::InsufficientCooldownAmount {
                requested: amount,
                available: cooling,
            })?;
        if position.cooldown_amount.is_zero() {
            position.cooldown_start = 0;
        }
        let updated = self.reduce(position, amount, now)?;

        self.ledger.credit(account, amount)?;
        self.commit(account, updated);

        info!(account = %account, amount = %amount, remaining = %updated.amount, "unstaked");
        self.emit(StakingEvent::Unstaked {
            account: *account,
            amount,
        });
        Ok(amount)
    }

    /// Queue `amount` of a still-locked position for penalized early exit.
    pub fn initiate_early_unstake(
        &self,
        account: &AccountId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<StakePosition, StakeError> {
        self.ensure_not_paused()?;
        let _guard = self.in_flight.enter(*account)?;

        if amount.is_zero() {
            return Err(StakeError::ZeroAmount);
        }
        let mut position = self.snapshot(account);
        if position.is_empty() {
            return Err(StakeError::NoStakeFound);
        }
        if !position.is_locked(now) {
            return Err(StakeError::StakeNotLocked {
                unlock_time: position.unlock_time(),
            });
        }
        let available = position.free_amount();
        if amount > available {
            return Err(StakeError::InsufficientAvailableStake {
                requested: amount,
                available,
            });
        }

        if position.early_cooldown_amount.is_zero() {
            position.early_cooldown_start = now;
        }
        position.early_cooldown_amount = position.early_cooldown_amount.checked_add(amount)?;
        position.last_update = now;
        self.commit(account, position);

        info!(
            account = %account,
            amount = %amount,
            queued = %position.early_cooldown_amount,
            "early unstake initiated"
        );
        Ok(position)
    }

    /// Execute a matured early exit of `amount` while the position is still
    /// locked. The configured penalty share goes to the treasury and the
    /// rest to the staker.
    pub fn early_unstake(
        &self,
        account: &AccountId,
        amount: Amount,
        now: Timestamp,
    ) -> Result<EarlyExit, StakeError> {
        self.ensure_not_paused()?;
        let _guard = self.in_flight.enter(*account)?;

        if amount.is_zero() {
            return Err(StakeError::ZeroAmount);
        }
        let mut position = self.snapshot(account);
        if position.is_empty() {
            return Err(StakeError::NoStakeFound);
        }
        if !position.is_locked(now) {
            return Err(StakeError::StakeNotLocked {
                unlock_time: position.unlock_time(),
            });
        }
        let ready_at = position
            .early_ready_at(self.params.early_unstake_cooldown)
            .ok_or(StakeError::NoCooldownStarted)?;
        if now < ready_at {
            return Err(StakeError::CooldownNotElapsed { ready_at });
        }
        let queued = position.early_cooldown_amount;
        position.early_cooldown_amount = queued
            .checked_sub(amount)
            .ok_or(StakeError::InsufficientCooldownAmount {
                requested: amount,
                available: queued,
            })?;
        if position.early_cooldown_amount.is_zero() {
            position.early_cooldown_start = 0;
        }
        let updated = self.reduce(position, amount, now)?;

        let penalty = amount.mul_bps(self.params.early_unstake_penalty_bps);
        let payout = amount.saturating_sub(penalty);
        let mut legs = Vec::with_capacity(2);
        if !payout.is_zero() {
            legs.push(LedgerOp::Credit { account: *account, amount: payout });
        }
        if !penalty.is_zero() {
            legs.push(LedgerOp::Credit { account: self.settings.treasury, amount: penalty });
        }
        self.ledger.settle(&legs)?;
        self.commit(account, updated);

        info!(
            account = %account,
            payout = %payout,
            penalty = %penalty,
            remaining = %updated.amount,
            "early unstake executed"
        );
        self.emit(StakingEvent::EarlyUnstake {
            account: *account,
            payout,
            penalty,
        });
        Ok(EarlyExit { payout, penalty })
    }

    // ── Queries ──────────────────────────────────────────────────────────────

    /// Copy of the account's position (empty if it has none).
    pub fn get_position(&self, account: &AccountId) -> StakePosition {
        self.snapshot(account)
    }

    pub fn state(&self, account: &AccountId, now: Timestamp) -> StakeState {
        self.snapshot(account).state(now, self.params.cooldown_period)
    }

    pub fn get_total_staked(&self, account: &AccountId) -> Amount {
        self.snapshot(account).amount
    }

    /// Principal past its lock and not queued in any cooldown.
    pub fn get_unlocked_amount(&self, account: &AccountId, now: Timestamp) -> Amount {
        let position = self.snapshot_at(account, now);
        if position.is_empty() || position.is_locked(now) {
            return Amount::ZERO;
        }
        position.free_amount()
    }

    /// Principal still under lock and not queued for early exit.
    pub fn get_locked_amount(&self, account: &AccountId, now: Timestamp) -> Amount {
        let position = self.snapshot(account);
        if !position.is_locked(now) {
            return Amount::ZERO;
        }
        position.free_amount()
    }

    /// Principal queued for withdrawal whose cooldown is still running.
    pub fn get_cooldown_amount(&self, account: &AccountId, now: Timestamp) -> Amount {
        let position = self.snapshot(account);
        match position.cooldown_ready_at(self.params.cooldown_period) {
            Some(ready_at) if now < ready_at => position.cooldown_amount,
            _ => Amount::ZERO,
        }
    }

    /// Principal queued for withdrawal that can be withdrawn now.
    pub fn get_ready_amount(&self, account: &AccountId, now: Timestamp) -> Amount {
        let position = self.snapshot(account);
        match position.cooldown_ready_at(self.params.cooldown_period) {
            Some(ready_at) if now >= ready_at => position.cooldown_amount,
            _ => Amount::ZERO,
        }
    }

    /// Principal queued for penalized early exit. Zero once the lock lapses.
    pub fn get_early_exit_amount(&self, account: &AccountId, now: Timestamp) -> Amount {
        self.snapshot_at(account, now).early_cooldown_amount
    }

    /// All of the above in one consistent snapshot.
    pub fn get_summary(&self, account: &AccountId, now: Timestamp) -> StakeSummary {
        let position = self.snapshot_at(account, now);
        let period = self.params.cooldown_period;
        let locked = position.is_locked(now);
        let (cooldown_amount, ready_amount) = match position.cooldown_ready_at(period) {
            Some(ready_at) if now < ready_at => (position.cooldown_amount, Amount::ZERO),
            Some(_) => (Amount::ZERO, position.cooldown_amount),
            None => (Amount::ZERO, Amount::ZERO),
        };
        let unlock_time = if position.is_empty() { 0 } else { position.unlock_time() };

        debug!(account = %account, locked, "summary computed");
        StakeSummary {
            state: position.state(now, period),
            total_staked: position.amount,
            unlocked_amount: if position.is_empty() || locked {
                Amount::ZERO
            } else {
                position.free_amount()
            },
            locked_amount: if locked { position.free_amount() } else { Amount::ZERO },
            cooldown_amount,
            ready_amount,
            early_exit_amount: position.early_cooldown_amount,
            multiplier: position.effective_multiplier,
            effective_lockup: position.effective_lockup,
            unlock_time,
            time_until_unlock: unlock_time.saturating_sub(now),
        }
    }

    /// Principal staked across every account, in wei.
    pub fn total_staked_all(&self) -> u128 {
        self.store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .total_staked()
    }

    /// Accounts holding a position.
    pub fn accounts(&self) -> Vec<AccountId> {
        self.store
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .accounts()
    }
}
