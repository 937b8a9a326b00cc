use crate::types::{AccountIndex, Amount, Balance};
use serde::{Deserialize, Serialize};
use std::fmt;

/// **A transaction type**
///
/// Transfers are not stored by the ledger; they only describe what was done.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum Tx {
    Transfer {
        from: AccountIndex,
        to: AccountIndex,
        amount: Amount,
    },
}

impl fmt::Display for Tx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tx::Transfer { from, to, amount } => {
                write!(f, "{amount:>10} from {from:>3} to {to:>3}")
            }
        }
    }
}

/// **The outcome of a completed transfer**
///
/// `total` is the sum of all balances observed right after the transfer.
/// Synchronized ledgers take it inside the critical section.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub tx: Tx,
    pub total: Balance,
}

impl fmt::Display for Receipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Total Balance: {:>10}", self.tx, self.total)
    }
}
