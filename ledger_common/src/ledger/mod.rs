//! The ledger: a fixed set of balances moved around by concurrent transfers
//!
//! Every policy implements the same [`Ledger`] trait, so the simulation
//! driver and the tests can exercise them interchangeably.

mod condvar;
mod mutex;
mod unsync;

pub use condvar::{CondvarLedger, TransferPhase};
pub use mutex::MutexLedger;
pub use unsync::UnsyncLedger;

use crate::cancel::CancelToken;
use crate::errors::LedgerError;
use crate::policy::Policy;
use crate::tx::Receipt;
use crate::types::{AccountIndex, Amount, Balance};
use std::sync::Arc;

/// **A fixed-size set of account balances supporting concurrent transfers**
pub trait Ledger: Send + Sync {
    fn policy(&self) -> Policy;

    /// Number of accounts, fixed at construction
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The total every synchronized ledger preserves: accounts × initial balance
    fn expected_total(&self) -> Balance;

    /// Moves `amount` from account `from` to account `to`.
    ///
    /// Only the conditional policy waits, and only it observes `cancel`.
    ///
    /// # Errors
    /// - Any of the two accounts doesn't exist, `LedgerError::UnknownAccount`;
    /// - Negative amount, `LedgerError::NegativeAmount`;
    /// - Attempted overflow of either balance, `LedgerError::Overflow`;
    /// - Cancelled while waiting for funds, `LedgerError::InterruptedWhileWaiting`.
    fn transfer(
        &self,
        from: AccountIndex,
        to: AccountIndex,
        amount: Amount,
        cancel: &CancelToken,
    ) -> Result<Receipt, LedgerError>;

    /// Sum of all balances
    fn total(&self) -> Balance;

    /// A snapshot of all balances
    fn balances(&self) -> Vec<Balance>;

    /// Cancels `cancel` and wakes every transfer parked on this ledger,
    /// so that the ones waiting with that token give up.
    fn interrupt(&self, cancel: &CancelToken) {
        cancel.cancel();
    }
}

/// **Creates a ledger of `accounts` accounts, each holding `initial_balance`**
pub fn new_ledger(policy: Policy, accounts: usize, initial_balance: Balance) -> Arc<dyn Ledger> {
    match policy {
        Policy::None => Arc::new(UnsyncLedger::new(accounts, initial_balance)),
        Policy::Mutex => Arc::new(MutexLedger::new(accounts, initial_balance)),
        Policy::Condvar => Arc::new(CondvarLedger::new(accounts, initial_balance)),
    }
}

/// Total of `accounts` accounts holding `initial_balance` each.
/// Saturates instead of overflowing; configurations are validated before that matters.
pub(crate) fn expected_total(accounts: usize, initial_balance: Balance) -> Balance {
    Balance::try_from(accounts)
        .ok()
        .and_then(|n| n.checked_mul(initial_balance))
        .unwrap_or(Balance::MAX)
}

/// Sums balances without overflowing; a corrupted unsynchronized ledger
/// can hold arbitrary values.
pub(crate) fn sum(balances: impl IntoIterator<Item = Balance>) -> Balance {
    balances
        .into_iter()
        .fold(0, |acc: Balance, b| acc.saturating_add(b))
}

/// **Applies a validated transfer to exclusively-owned balances**
///
/// Both new values are computed before anything is written,
/// so an overflow leaves the balances untouched.
/// A transfer to the same account is a no-op.
pub(crate) fn apply_transfer(
    balances: &mut [Balance],
    from: AccountIndex,
    to: AccountIndex,
    amount: Amount,
) -> Result<(), LedgerError> {
    if from == to {
        return Ok(());
    }

    let debited = balances[from]
        .checked_sub(amount)
        .ok_or(LedgerError::Overflow(from, amount))?;
    let credited = balances[to]
        .checked_add(amount)
        .ok_or(LedgerError::Overflow(to, amount))?;

    balances[from] = debited;
    balances[to] = credited;

    Ok(())
}
