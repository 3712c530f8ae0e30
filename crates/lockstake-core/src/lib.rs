// crates/lockstake-core/src/lib.rs
//
// lockstake-core: Core types, errors, and collaborator traits for the
// Lockstake collateral-staking ledger.
//
// This is the leaf crate that the rest of the workspace depends on. It
// defines token amounts, account identifiers, the error taxonomy, the
// notification enum, and the trait seams to external collaborators.

pub mod error;
pub mod events;
pub mod identity;
pub mod token;
pub mod traits;

// Re-export key types for ergonomic access from downstream crates.
pub use error::{ErrorKind, StakeError};
pub use events::StakingEvent;
pub use identity::{AccountId, Role};
pub use token::{
    checked_days, days, Amount, BasisPoints, Seconds, Timestamp, BASIS_POINTS, MAX_AMOUNT_WEI,
    SECONDS_PER_DAY, WEI_PER_TOKEN,
};
pub use traits::{EventSink, LedgerOp, RoleAuthority, TokenLedger};
