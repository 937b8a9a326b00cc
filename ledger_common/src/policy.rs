//! The concurrency policy a ledger applies to its transfers

use crate::errors::LedgerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// **The concurrency policy of a ledger**
///
/// It can be:
/// - None
/// - Mutex
/// - Condvar
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Policy {
    /// No coordination at all; concurrent transfers can lose updates
    None,

    /// One exclusive lock around every transfer
    Mutex,

    /// One exclusive lock plus a wait-queue; transfers wait for sufficient funds
    Condvar,
}

impl Policy {
    pub const ALL: [Policy; 3] = [Policy::None, Policy::Mutex, Policy::Condvar];

    /// Whether the policy guarantees the total-balance invariant.
    pub fn is_synchronized(self) -> bool {
        !matches!(self, Policy::None)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Policy::None => "none",
            Policy::Mutex => "mutex",
            Policy::Condvar => "condvar",
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Policy {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "unsync" => Ok(Policy::None),
            "mutex" => Ok(Policy::Mutex),
            "condvar" => Ok(Policy::Condvar),
            other => Err(LedgerError::UnknownPolicy(other.to_string())),
        }
    }
}
