//! Error types for kiln-ledger.

use kiln_core::Address;
use thiserror::Error;

/// Result type alias for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors that can occur in ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Insufficient balance for a debit or burn.
    #[error("insufficient funds for {account}: have {have} grains, need {need} grains")]
    InsufficientFunds {
        /// Account being debited.
        account: Address,
        /// Current balance in grains.
        have: u64,
        /// Required balance in grains.
        need: u64,
    },

    /// Caller lacks the required authorization.
    #[error("unauthorized: {caller} cannot {action}")]
    Unauthorized {
        /// The rejected caller.
        caller: Address,
        /// The attempted action.
        action: String,
    },
}

impl LedgerError {
    /// Create an unauthorized error.
    #[must_use]
    pub fn unauthorized(caller: &Address, action: impl Into<String>) -> Self {
        Self::Unauthorized {
            caller: caller.clone(),
            action: action.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::Wallet;

    #[test]
    fn insufficient_funds_display() {
        let account = Wallet::generate().expect("wallet").address().clone();
        let err = LedgerError::InsufficientFunds {
            account,
            have: 5,
            need: 10,
        };
        let s = err.to_string();
        assert!(s.contains("5"));
        assert!(s.contains("10"));
    }

    #[test]
    fn unauthorized_display() {
        let caller = Wallet::generate().expect("wallet").address().clone();
        let err = LedgerError::unauthorized(&caller, "mint");
        assert!(err.to_string().contains("mint"));
    }
}
