// crates/lockstake-economics/src/guard.rs
//
// Per-account reentrancy guard.
//
// Every mutating operation enters the guard for its account before reading
// the position and holds it until the operation returns. A second entry for
// the same account while the first is still in flight (for example a token
// ledger calling back into the engine) is rejected. The slot is released
// when the guard is dropped, on success and failure alike.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use lockstake_core::{AccountId, StakeError};
use tracing::warn;

/// Set of accounts with an operation in progress.
#[derive(Debug, Default)]
pub struct InFlight {
    accounts: Mutex<HashSet<AccountId>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the slot for `account`.
    ///
    /// # Errors
    /// `ReentrantCall` if an operation on `account` is already in progress.
    pub fn enter(&self, account: AccountId) -> Result<AccountGuard<'_>, StakeError> {
        let mut accounts = self.accounts.lock().unwrap_or_else(PoisonError::into_inner);
        if !accounts.insert(account) {
            warn!(account = %account, "reentrant call rejected");
            return Err(StakeError::ReentrantCall);
        }
        Ok(AccountGuard {
            owner: self,
            account,
        })
    }

    pub fn is_active(&self, account: &AccountId) -> bool {
        self.accounts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(account)
    }
}

/// Held for the duration of one operation on one account.
#[derive(Debug)]
pub struct AccountGuard<'a> {
    owner: &'a InFlight,
    account: AccountId,
}

impl Drop for AccountGuard<'_> {
    fn drop(&mut self) {
        self.owner
            .accounts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.account);
    }
}
