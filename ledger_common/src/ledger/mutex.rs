use super::{apply_transfer, expected_total, sum, Ledger};
use crate::cancel::CancelToken;
use crate::errors::LedgerError;
use crate::policy::Policy;
use crate::tx::{Receipt, Tx};
use crate::types::{AccountIndex, Amount, Balance};
use crate::validation::validate_transfer;
use parking_lot::Mutex;

/// **A ledger whose every transfer is one critical section**
///
/// A single exclusive lock guards both balance updates.
/// The guard releases the lock on every exit path, errors included.
/// Waiting callers are not served in any particular order.
#[derive(Debug)]
pub struct MutexLedger {
    balances: Mutex<Vec<Balance>>,
    expected_total: Balance,
}

impl MutexLedger {
    pub fn new(accounts: usize, initial_balance: Balance) -> Self {
        Self {
            balances: Mutex::new(vec![initial_balance; accounts]),
            expected_total: expected_total(accounts, initial_balance),
        }
    }

    pub fn is_locked(&self) -> bool {
        self.balances.is_locked()
    }
}

impl Ledger for MutexLedger {
    fn policy(&self) -> Policy {
        Policy::Mutex
    }

    fn len(&self) -> usize {
        self.balances.lock().len()
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
        let mut balances = self.balances.lock();
        validate_transfer(balances.len(), from, to, amount)?;
        apply_transfer(&mut balances, from, to, amount)?;

        Ok(Receipt {
            tx: Tx::Transfer { from, to, amount },
            total: sum(balances.iter().copied()),
        })
    }

    fn total(&self) -> Balance {
        sum(self.balances.lock().iter().copied())
    }

    fn balances(&self) -> Vec<Balance> {
        self.balances.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[test]
    fn transfer_moves_funds_and_reports_total() {
        let ledger = MutexLedger::new(2, 10);

        let receipt = ledger.transfer(0, 1, 15, &CancelToken::new()).unwrap();

        assert_eq!(20, receipt.total);
        assert_eq!(vec![-5, 25], ledger.balances());
    }

    #[test]
    fn lock_is_released_after_an_error() {
        let ledger = MutexLedger::new(2, 10);

        assert!(ledger.transfer(0, 9, 1, &CancelToken::new()).is_err());

        assert!(!ledger.is_locked());
        assert_eq!(20, ledger.total());
    }

    #[test]
    fn hundred_workers_thousand_transfers_keep_total() {
        const ACCOUNTS: usize = 100;
        const TRANSFERS: usize = 1000;

        let ledger = MutexLedger::new(ACCOUNTS, 100);
        let tickets = AtomicUsize::new(0);

        thread::scope(|s| {
            for from in 0..ACCOUNTS {
                let ledger = &ledger;
                let tickets = &tickets;
                s.spawn(move || {
                    let cancel = CancelToken::new();
                    let mut rng = rand::thread_rng();
                    while tickets.fetch_add(1, Ordering::SeqCst) < TRANSFERS {
                        let to = rng.gen_range(0..ACCOUNTS);
                        let amount = rng.gen_range(0..=100);
                        ledger.transfer(from, to, amount, &cancel).unwrap();
                    }
                });
            }
        });

        assert_eq!(10_000, ledger.total());
        assert_eq!(10_000, ledger.expected_total());
        assert!(!ledger.is_locked());
    }
}
