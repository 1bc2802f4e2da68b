//! Per-identity ledger accounts.

use kiln_core::{Address, Amount};
use serde::{Deserialize, Serialize};

/// A ledger account: balance plus the minter capability flag.
///
/// Balances are mutated exclusively through [`crate::Ledger`] operations;
/// the minter flag is granted and revoked only by the ledger admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// The identity owning this account.
    pub address: Address,
    /// Current balance.
    pub balance: Amount,
    /// Whether this identity may mint new tokens.
    pub is_minter: bool,
}

impl Account {
    /// Create a new empty account for an identity.
    #[must_use]
    pub const fn new(address: Address) -> Self {
        Self {
            address,
            balance: Amount::ZERO,
            is_minter: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::Wallet;

    #[test]
    fn new_account_is_empty() {
        let address = Wallet::generate().expect("wallet").address().clone();
        let account = Account::new(address.clone());
        assert_eq!(account.address, address);
        assert!(account.balance.is_zero());
        assert!(!account.is_minter);
    }

    #[test]
    fn account_serialization() {
        let address = Wallet::generate().expect("wallet").address().clone();
        let account = Account::new(address);
        let json = serde_json::to_string(&account).expect("serialize");
        let parsed: Account = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(account, parsed);
    }
}
