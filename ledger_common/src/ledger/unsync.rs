use super::{expected_total, sum, Ledger};
use crate::cancel::CancelToken;
use crate::errors::LedgerError;
use crate::policy::Policy;
use crate::tx::{Receipt, Tx};
use crate::types::{AccountIndex, Amount, Balance};
use crate::validation::validate_transfer;
use std::sync::atomic::{AtomicI64, Ordering};
use std::thread;

/// **A ledger without any coordination between transfers**
///
/// Each balance is its own atomic cell, so there is no undefined behaviour,
/// but a transfer reads a balance, computes the new value and writes it back
/// as separate steps. Two concurrent transfers touching the same account can
/// therefore overwrite each other's update and change the total.
#[derive(Debug)]
pub struct UnsyncLedger {
    balances: Vec<AtomicI64>,
    expected_total: Balance,
}

impl UnsyncLedger {
    pub fn new(accounts: usize, initial_balance: Balance) -> Self {
        Self {
            balances: (0..accounts)
                .map(|_| AtomicI64::new(initial_balance))
                .collect(),
            expected_total: expected_total(accounts, initial_balance),
        }
    }

    /// Read, yield, write. The yield hands the CPU to another transfer
    /// between the read and the write.
    fn read_modify_write(
        &self,
        index: AccountIndex,
        amount: Amount,
        op: fn(Balance, Amount) -> Option<Balance>,
    ) -> Result<Balance, LedgerError> {
        let current = self.balances[index].load(Ordering::Relaxed);
        thread::yield_now();
        let updated = op(current, amount).ok_or(LedgerError::Overflow(index, amount))?;
        self.balances[index].store(updated, Ordering::Relaxed);
        Ok(current)
    }
}

impl Ledger for UnsyncLedger {
    fn policy(&self) -> Policy {
        Policy::None
    }

    fn len(&self) -> usize {
        self.balances.len()
    }

    fn expected_total(&self) -> Balance {
        self.expected_total
    }

    fn transfer(
        &self,
        from: AccountIndex,
        to: AccountIndex,
        amount: Amount,
        _cancel: &CancelToken,
    ) -> Result<Receipt, LedgerError> {
        validate_transfer(self.len(), from, to, amount)?;

        if from != to {
            let before = self.read_modify_write(from, amount, Balance::checked_sub)?;
            if let Err(err) = self.read_modify_write(to, amount, Balance::checked_add) {
                self.balances[from].store(before, Ordering::Relaxed);
                return Err(err);
            }
        }

        Ok(Receipt {
            tx: Tx::Transfer { from, to, amount },
            total: self.total(),
        })
    }

    fn total(&self) -> Balance {
        sum(self.balances.iter().map(|b| b.load(Ordering::Relaxed)))
    }

    fn balances(&self) -> Vec<Balance> {
        self.balances
            .iter()
            .map(|b| b.load(Ordering::Relaxed))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_transfers_are_correct() {
        let ledger = UnsyncLedger::new(3, 100);
        let cancel = CancelToken::new();

        let receipt = ledger.transfer(0, 2, 30, &cancel).unwrap();
        assert_eq!(
            Tx::Transfer {
                from: 0,
                to: 2,
                amount: 30
            },
            receipt.tx
        );
        assert_eq!(300, receipt.total);

        ledger.transfer(2, 1, 130, &cancel).unwrap();

        assert_eq!(vec![70, 230, 0], ledger.balances());
        assert_eq!(300, ledger.total());
    }

    #[test]
    fn overdraft_is_not_prevented() {
        let ledger = UnsyncLedger::new(2, 10);

        ledger.transfer(0, 1, 15, &CancelToken::new()).unwrap();

        assert_eq!(vec![-5, 25], ledger.balances());
    }

    #[test]
    fn overflow_restores_the_sender() {
        let ledger = UnsyncLedger::new(2, Balance::MAX);

        assert_eq!(
            Err(LedgerError::Overflow(1, 1)),
            ledger.transfer(0, 1, 1, &CancelToken::new())
        );
        assert_eq!(vec![Balance::MAX, Balance::MAX], ledger.balances());
    }
}
