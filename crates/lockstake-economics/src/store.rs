// crates/lockstake-economics/src/store.rs
//
// The authoritative map from account to stake position. Readers always get
// copies; the only way to change a position is `put`, which the staking
// engine calls at commit time.

use std::collections::HashMap;

use lockstake_core::AccountId;

use crate::position::StakePosition;

/// Keyed store of stake positions.
#[derive(Debug, Default)]
pub struct PositionStore {
    positions: HashMap<AccountId, StakePosition>,
}

impl PositionStore {
    pub fn new() -> Self {
        Self {
            positions: HashMap::new(),
        }
    }

    /// Snapshot of an account's position; the default (empty) position if
    /// the account has never staked.
    pub fn get(&self, account: &AccountId) -> StakePosition {
        self.positions.get(account).copied().unwrap_or_default()
    }

    /// Store `position`, or drop the entry if it is empty.
    pub fn put(&mut self, account: AccountId, position: StakePosition) {
        if position.is_empty() {
            self.positions.remove(&account);
        } else {
            self.positions.insert(account, position);
        }
    }

    /// Sum of principal across every position, in wei.
    ///
    /// Returned as `u128` because the aggregate may exceed the 96-bit
    /// width of a single position.
    pub fn total_staked(&self) -> u128 {
        self.positions.values().map(|p| p.amount.wei()).sum()
    }

    /// Accounts with a position, sorted for deterministic output.
    pub fn accounts(&self) -> Vec<AccountId> {
        let mut accounts: Vec<AccountId> = self.positions.keys().copied().collect();
        accounts.sort();
        accounts
    }
}
