use super::{apply_transfer, expected_total, sum, Ledger};
use crate::cancel::CancelToken;
use crate::errors::LedgerError;
use crate::policy::Policy;
use crate::tx::{Receipt, Tx};
use crate::types::{AccountIndex, Amount, Balance};
use crate::validation::validate_transfer;
use log::trace;
use parking_lot::{Condvar, Mutex};
use std::fmt;

/// **The phases a conditional transfer goes through**
///
/// `AcquiringLock → CheckingCondition → (Waiting ⇄ CheckingCondition)* →
/// Mutating → Notifying → ReleasingLock → Done`,
/// or `Waiting → Cancelled`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferPhase {
    AcquiringLock,
    CheckingCondition,
    Waiting,
    Mutating,
    Notifying,
    ReleasingLock,
    Done,
    Cancelled,
}

impl fmt::Display for TransferPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransferPhase::AcquiringLock => "ACQUIRING_LOCK",
            TransferPhase::CheckingCondition => "CHECKING_CONDITION",
            TransferPhase::Waiting => "WAITING",
            TransferPhase::Mutating => "MUTATING",
            TransferPhase::Notifying => "NOTIFYING",
            TransferPhase::ReleasingLock => "RELEASING_LOCK",
            TransferPhase::Done => "DONE",
            TransferPhase::Cancelled => "CANCELLED",
        };
        f.write_str(name)
    }
}

#[derive(Debug)]
struct State {
    balances: Vec<Balance>,
    /// Transfers currently parked on `funds_available`
    waiting: usize,
}

/// **A ledger whose transfers wait until the sender can cover the amount**
///
/// One exclusive lock and one wait-queue per ledger. A transfer that can't
/// proceed parks on the queue, which releases the lock, and re-checks the
/// sender's balance every time it is woken.
/// No balance is ever driven negative through [`Ledger::transfer`].
#[derive(Debug)]
pub struct CondvarLedger {
    state: Mutex<State>,
    funds_available: Condvar,
    expected_total: Balance,
}

impl CondvarLedger {
    pub fn new(accounts: usize, initial_balance: Balance) -> Self {
        Self {
            state: Mutex::new(State {
                balances: vec![initial_balance; accounts],
                waiting: 0,
            }),
            funds_available: Condvar::new(),
            expected_total: expected_total(accounts, initial_balance),
        }
    }

    /// Transfers without waiting.
    ///
    /// # Errors
    /// The same as [`Ledger::transfer`], except that an under-funded sender
    /// fails with `LedgerError::InsufficientFunds` instead of waiting.
    pub fn try_transfer(
        &self,
        from: AccountIndex,
        to: AccountIndex,
        amount: Amount,
    ) -> Result<Receipt, LedgerError> {
        let mut state = self.state.lock();
        validate_transfer(state.balances.len(), from, to, amount)?;

        if state.balances[from] < amount {
            return Err(LedgerError::InsufficientFunds(from, amount));
        }
        apply_transfer(&mut state.balances, from, to, amount)?;
        self.funds_available.notify_all();

        Ok(Receipt {
            tx: Tx::Transfer { from, to, amount },
            total: sum(state.balances.iter().copied()),
        })
    }

    /// Wakes every parked transfer without changing any balance.
    /// Each of them re-checks its condition and parks again if it still can't proceed.
    pub fn notify_waiters(&self) {
        let _state = self.state.lock();
        self.funds_available.notify_all();
    }

    /// Number of transfers currently parked
    pub fn waiting(&self) -> usize {
        self.state.lock().waiting
    }

    pub fn is_locked(&self) -> bool {
        self.state.is_locked()
    }
}

impl Ledger for CondvarLedger {
    fn policy(&self) -> Policy {
        Policy::Condvar
    }

    fn len(&self) -> usize {
        self.state.lock().balances.len()
    }

    fn expected_total(&self) -> Balance {
        self.expected_total
    }

    fn transfer(
        &self,
        from: AccountIndex,
        to: AccountIndex,
        amount: Amount,
        cancel: &CancelToken,
    ) -> Result<Receipt, LedgerError> {
        let phase = |phase: TransferPhase| trace!("{from} -> {to} ({amount}): {phase}");

        phase(TransferPhase::AcquiringLock);
        let mut state = self.state.lock();
        validate_transfer(state.balances.len(), from, to, amount)?;

        loop {
            phase(TransferPhase::CheckingCondition);
            if state.balances[from] >= amount {
                break;
            }

            // Checked under the lock, and `interrupt` notifies under the same lock,
            // so a cancellation can't slip in between this check and parking.
            if cancel.is_cancelled() {
                phase(TransferPhase::Cancelled);
                self.funds_available.notify_all();
                return Err(LedgerError::InterruptedWhileWaiting);
            }

            phase(TransferPhase::Waiting);
            state.waiting += 1;
            self.funds_available.wait(&mut state);
            state.waiting -= 1;
        }

        phase(TransferPhase::Mutating);
        apply_transfer(&mut state.balances, from, to, amount)?;
        let total = sum(state.balances.iter().copied());

        phase(TransferPhase::Notifying);
        self.funds_available.notify_all();

        phase(TransferPhase::ReleasingLock);
        drop(state);

        phase(TransferPhase::Done);
        Ok(Receipt {
            tx: Tx::Transfer { from, to, amount },
            total,
        })
    }

    fn total(&self) -> Balance {
        sum(self.state.lock().balances.iter().copied())
    }

    fn balances(&self) -> Vec<Balance> {
        self.state.lock().balances.clone()
    }

    fn interrupt(&self, cancel: &CancelToken) {
        cancel.cancel();
        self.notify_waiters();
    }
}
