use crate::types::{AccountIndex, Amount, Balance};

/// **An application-specific error type**
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum LedgerError {
    #[error("account {0} doesn't exist")]
    UnknownAccount(AccountIndex),

    #[error("amount {0} is negative")]
    NegativeAmount(Amount),

    #[error("account {0} would overflow by transferring {1}")]
    Overflow(AccountIndex, Amount),

    #[error("account {0} has insufficient funds for {1}")]
    InsufficientFunds(AccountIndex, Amount),

    #[error("interrupted while waiting for funds")]
    InterruptedWhileWaiting,

    #[error("total balance is {actual}, expected {expected}")]
    InvariantViolation { expected: Balance, actual: Balance },

    #[error("unknown policy \"{0}\"; expected one of: none, mutex, condvar")]
    UnknownPolicy(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
