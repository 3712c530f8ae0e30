// crates/lockstake-economics/src/ledger.rs
//
// In-memory token ledger.
//
// Tracks a balance per account plus the custody balance held by the staking
// engine. Debits move tokens from an account into custody; credits move them
// out of custody. The treasury is an ordinary account that receives
// penalty proceeds.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use lockstake_core::{AccountId, Amount, StakeError, TokenLedger};

#[derive(Debug, Default)]
struct Balances {
    accounts: HashMap<AccountId, Amount>,
    custody: Amount,
}

/// A `TokenLedger` held entirely in memory.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    inner: Mutex<Balances>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give `account` new tokens (test and scenario funding).
    pub fn mint(&self, account: &AccountId, amount: Amount) -> Result<(), StakeError> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let balance = inner.accounts.entry(*account).or_default();
        *balance = balance.checked_add(amount)?;
        Ok(())
    }

    pub fn balance_of(&self, account: &AccountId) -> Amount {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.accounts.get(account).copied().unwrap_or_default()
    }

    /// Tokens currently held in staking custody.
    pub fn custody(&self) -> Amount {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).custody
    }
}

impl TokenLedger for InMemoryLedger {
    fn debit(&self, from: &AccountId, amount: Amount) -> Result<(), StakeError> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let have = inner.accounts.get(from).copied().unwrap_or_default();
        let remaining = have
            .checked_sub(amount)
            .ok_or(StakeError::InsufficientBalance { need: amount, have })?;
        let custody = inner.custody.checked_add(amount)?;
        inner.accounts.insert(*from, remaining);
        inner.custody = custody;
        Ok(())
    }

    fn credit(&self, to: &AccountId, amount: Amount) -> Result<(), StakeError> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let custody = inner.custody.checked_sub(amount).ok_or_else(|| {
            StakeError::Ledger(format!(
                "custody holds {} but {} was requested",
                inner.custody, amount
            ))
        })?;
        let balance = inner.accounts.get(to).copied().unwrap_or_default();
        let new_balance = balance.checked_add(amount)?;
        inner.accounts.insert(*to, new_balance);
        inner.custody = custody;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockstake_core::LedgerOp;

    fn tokens(n: u128) -> Amount {
        Amount::from_tokens(n).unwrap()
    }

    #[test]
    fn test_new_ledger_is_empty() {
        let ledger = InMemoryLedger::new();
        assert_eq!(ledger.balance_of(&AccountId::from_label("alice")), Amount::ZERO);
        assert_eq!(ledger.custody(), Amount::ZERO);
    }

    #[test]
    fn test_debit_moves_into_custody() {
        let ledger = InMemoryLedger::new();
        let alice = AccountId::from_label("alice");
        ledger.mint(&alice, tokens(100)).unwrap();
        ledger.debit(&alice, tokens(40)).unwrap();
        assert_eq!(ledger.balance_of(&alice), tokens(60));
        assert_eq!(ledger.custody(), tokens(40));
    }

    #[test]
    fn test_debit_insufficient_balance_leaves_state() {
        let ledger = InMemoryLedger::new();
        let alice = AccountId::from_label("alice");
        ledger.mint(&alice, tokens(50)).unwrap();
        let result = ledger.debit(&alice, tokens(100));
        assert!(matches!(result, Err(StakeError::InsufficientBalance { .. })));
        assert_eq!(ledger.balance_of(&alice), tokens(50));
        assert_eq!(ledger.custody(), Amount::ZERO);
    }

    #[test]
    fn test_credit_requires_custody() {
        let ledger = InMemoryLedger::new();
        let alice = AccountId::from_label("alice");
        assert!(matches!(ledger.credit(&alice, tokens(1)), Err(StakeError::Ledger(_))));
    }

    #[test]
    fn test_settle_reverses_applied_legs_on_failure() {
        let ledger = InMemoryLedger::new();
        let alice = AccountId::from_label("alice");
        let treasury = AccountId::from_label("treasury");
        ledger.mint(&alice, tokens(100)).unwrap();
        ledger.debit(&alice, tokens(100)).unwrap();

        // Second leg asks for more than custody holds after the first.
        let ops = [
            LedgerOp::Credit { account: alice, amount: tokens(80) },
            LedgerOp::Credit { account: treasury, amount: tokens(30) },
        ];
        assert!(ledger.settle(&ops).is_err());
        assert_eq!(ledger.balance_of(&alice), Amount::ZERO);
        assert_eq!(ledger.balance_of(&treasury), Amount::ZERO);
        assert_eq!(ledger.custody(), tokens(100));
    }

    #[test]
    fn test_settle_applies_all_legs() {
        let ledger = InMemoryLedger::new();
        let alice = AccountId::from_label("alice");
        let treasury = AccountId::from_label("treasury");
        ledger.mint(&alice, tokens(100)).unwrap();
        ledger.debit(&alice, tokens(100)).unwrap();
        let ops = [
            LedgerOp::Credit { account: alice, amount: tokens(80) },
            LedgerOp::Credit { account: treasury, amount: tokens(20) },
        ];
        ledger.settle(&ops).unwrap();
        assert_eq!(ledger.balance_of(&alice), tokens(80));
        assert_eq!(ledger.balance_of(&treasury), tokens(20));
        assert_eq!(ledger.custody(), Amount::ZERO);
    }
}
