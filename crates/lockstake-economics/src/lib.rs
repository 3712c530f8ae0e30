// crates/lockstake-economics/src/lib.rs
//
// lockstake-economics: multiplier math, weighted lockup combination, the
// position store, and the staking state machine for the Lockstake ledger.
//
// All amounts are tracked in wei (1 LST = 10^18 wei); all durations and
// timestamps are whole seconds supplied by the caller.

pub mod guard;
pub mod ledger;
pub mod multiplier;
pub mod params;
pub mod penalty;
pub mod position;
pub mod roles;
pub mod sink;
pub mod staking;
pub mod store;
pub mod weighted;

// Re-export key types for ergonomic access from downstream crates.
pub use ledger::InMemoryLedger;
pub use multiplier::{
    multiplier, position_multiplier, sweep, LogarithmicBonus, MultiplierStrategy, StrategyKind,
    SweepRow, TieredBonus, BASE_MULTIPLIER, MAX_LOCKUP, MIN_LOCKUP, MIN_STAKE_WEI,
};
pub use params::{AdminSettings, StakingParams};
pub use penalty::deduct_penalty;
pub use position::{StakePosition, StakeState, StakeSummary};
pub use roles::RoleRegistry;
pub use sink::{EventLog, NullSink};
pub use staking::{EarlyExit, StakingEngine};
pub use store::PositionStore;
pub use weighted::{combine, div_round_half_up, Combined, ExistingCommitment};
