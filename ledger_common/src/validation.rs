use crate::errors::LedgerError;
use crate::types::{AccountIndex, Amount};

/// **Basic input validation for a transfer request**
///
/// Checks for:
/// - Both account indices being in `[0, len)`;
/// - A non-negative amount.
///
/// The sender is checked first.
pub fn validate_transfer(
    len: usize,
    from: AccountIndex,
    to: AccountIndex,
    amount: Amount,
) -> Result<(), LedgerError> {
    if from >= len {
        return Err(LedgerError::UnknownAccount(from));
    }
    if to >= len {
        return Err(LedgerError::UnknownAccount(to));
    }
    if amount < 0 {
        return Err(LedgerError::NegativeAmount(amount));
    }
    Ok(())
}
