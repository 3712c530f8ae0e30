// crates/lockstake-core/src/traits.rs
//
// Seams to the collaborators the staking core consumes but does not own:
// the token ledger, the role administration, and the notification consumer.

use crate::error::StakeError;
use crate::events::StakingEvent;
use crate::identity::{AccountId, Role};
use crate::token::Amount;

/// One leg of a token movement between an account and staking custody.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerOp {
    /// Move `amount` from `account` into staking custody.
    Debit { account: AccountId, amount: Amount },
    /// Move `amount` from staking custody to `account`.
    Credit { account: AccountId, amount: Amount },
}

impl LedgerOp {
    fn inverse(self) -> LedgerOp {
        match self {
            LedgerOp::Debit { account, amount } => LedgerOp::Credit { account, amount },
            LedgerOp::Credit { account, amount } => LedgerOp::Debit { account, amount },
        }
    }
}

/// The external token ledger.
///
/// Calls are synchronous and must either succeed or leave balances untouched.
pub trait TokenLedger: Send + Sync {
    /// Move `amount` from `from` into staking custody.
    fn debit(&self, from: &AccountId, amount: Amount) -> Result<(), StakeError>;

    /// Move `amount` from staking custody to `to`.
    fn credit(&self, to: &AccountId, amount: Amount) -> Result<(), StakeError>;

    /// Apply several legs as one unit. If a leg fails, the legs already
    /// applied are reversed in the opposite order and the original error
    /// is returned.
    ///
    /// # Errors
    /// `SettlementUnreversed` if a reversal leg also fails. It carries the
    /// original failure and the first reversal failure.
    fn settle(&self, ops: &[LedgerOp]) -> Result<(), StakeError> {
        for (i, op) in ops.iter().enumerate() {
            if let Err(cause) = self.apply_op(*op) {
                let mut reversal = None;
                for done in ops[..i].iter().rev() {
                    if let Err(e) = self.apply_op(done.inverse()) {
                        reversal.get_or_insert(e);
                    }
                }
                return Err(match reversal {
                    None => cause,
                    Some(reversal) => StakeError::SettlementUnreversed {
                        cause: Box::new(cause),
                        reversal: Box::new(reversal),
                    },
                });
            }
        }
        Ok(())
    }

    #[doc(hidden)]
    fn apply_op(&self, op: LedgerOp) -> Result<(), StakeError> {
        match op {
            LedgerOp::Debit { account, amount } => self.debit(&account, amount),
            LedgerOp::Credit { account, amount } => self.credit(&account, amount),
        }
    }
}

/// Role membership lookup.
pub trait RoleAuthority: Send + Sync {
    fn has_role(&self, role: Role, account: &AccountId) -> bool;
}

/// Consumer of staking notifications.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: StakingEvent);
}
