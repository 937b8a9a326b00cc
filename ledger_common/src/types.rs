//! Primitive types shared by every ledger policy

/// Position of an account in the ledger's balance sequence
pub type AccountIndex = usize;

/// An account balance, in minor units
pub type Balance = i64;

/// A transfer amount, in minor units; never negative
pub type Amount = i64;
