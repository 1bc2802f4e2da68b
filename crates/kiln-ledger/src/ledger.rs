//! The KILN ledger: atomic balance accounting with controlled minting.

use std::collections::HashMap;

use kiln_core::{Address, Amount};
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::account::Account;
use crate::error::{LedgerError, Result};

/// Fungible balance accounting for all marketplace identities.
///
/// The admin address is an explicit capability captured at construction:
/// only it may grant or revoke minter authorization. Every operation takes
/// the interior write lock at most once, so each call is atomic and
/// side-effect-free on failure.
pub struct Ledger {
    admin: Address,
    accounts: RwLock<HashMap<Address, Account>>,
}

impl Ledger {
    /// Create a new empty ledger administered by `admin`.
    #[must_use]
    pub fn new(admin: Address) -> Self {
        Self {
            admin,
            accounts: RwLock::new(HashMap::new()),
        }
    }

    /// Get the admin address.
    #[must_use]
    pub fn admin(&self) -> &Address {
        &self.admin
    }

    /// Get the balance of an identity. Unknown identities have zero balance.
    #[must_use]
    pub fn balance_of(&self, address: &Address) -> Amount {
        let accounts = self.accounts.read();
        accounts
            .get(address)
            .map_or(Amount::ZERO, |a| a.balance)
    }

    /// Check whether an identity holds the minter capability.
    #[must_use]
    pub fn is_minter(&self, address: &Address) -> bool {
        let accounts = self.accounts.read();
        accounts.get(address).is_some_and(|a| a.is_minter)
    }

    /// Credit an identity. Creates the account if absent.
    pub fn credit(&self, to: &Address, amount: Amount) {
        let mut accounts = self.accounts.write();
        Self::credit_locked(&mut accounts, to, amount);

        debug!(to = %to, amount = %amount, "credit applied");
    }

    /// Debit an identity.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientFunds` if the balance is below `amount`;
    /// the balance is left unchanged.
    pub fn debit(&self, from: &Address, amount: Amount) -> Result<()> {
        let mut accounts = self.accounts.write();
        Self::debit_locked(&mut accounts, from, amount)?;

        debug!(from = %from, amount = %amount, "debit applied");
        Ok(())
    }

    /// Move `amount` from one identity to another atomically.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientFunds` if the sender's balance is below
    /// `amount`; no balance changes in that case.
    pub fn transfer(&self, from: &Address, to: &Address, amount: Amount) -> Result<()> {
        let mut accounts = self.accounts.write();
        Self::debit_locked(&mut accounts, from, amount)?;
        Self::credit_locked(&mut accounts, to, amount);

        debug!(from = %from, to = %to, amount = %amount, "transfer completed");
        Ok(())
    }

    /// Debit `from` by the sum of all payouts and credit each payee,
    /// as a single atomic movement.
    ///
    /// Used for settlement, where a job's escrowed funds split between
    /// the winning party and the fee collector in one step.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientFunds` if `from` cannot cover the total;
    /// no balance changes in that case.
    pub fn disburse(&self, from: &Address, payouts: &[(Address, Amount)]) -> Result<()> {
        let total = payouts
            .iter()
            .fold(Amount::ZERO, |acc, (_, a)| acc.saturating_add(*a));

        let mut accounts = self.accounts.write();
        Self::debit_locked(&mut accounts, from, total)?;
        for (to, amount) in payouts {
            Self::credit_locked(&mut accounts, to, *amount);
        }

        debug!(from = %from, total = %total, legs = payouts.len(), "disbursement completed");
        Ok(())
    }

    /// Mint new tokens to an identity.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` unless the caller holds the minter capability.
    pub fn mint(&self, caller: &Address, to: &Address, amount: Amount) -> Result<()> {
        let mut accounts = self.accounts.write();
        if !accounts.get(caller).is_some_and(|a| a.is_minter) {
            return Err(LedgerError::unauthorized(caller, "mint"));
        }
        Self::credit_locked(&mut accounts, to, amount);

        info!(minter = %caller, to = %to, amount = %amount, "tokens minted");
        Ok(())
    }

    /// Burn tokens from the caller's own balance.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientFunds` if the caller's balance is below `amount`.
    pub fn burn(&self, caller: &Address, amount: Amount) -> Result<()> {
        let mut accounts = self.accounts.write();
        Self::debit_locked(&mut accounts, caller, amount)?;

        info!(from = %caller, amount = %amount, "tokens burned");
        Ok(())
    }

    /// Grant or revoke the minter capability. Admin only.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` if the caller is not the ledger admin.
    pub fn set_minter_authorization(
        &self,
        caller: &Address,
        account: &Address,
        enabled: bool,
    ) -> Result<()> {
        if caller != &self.admin {
            return Err(LedgerError::unauthorized(caller, "set minter authorization"));
        }

        let mut accounts = self.accounts.write();
        let entry = accounts
            .entry(account.clone())
            .or_insert_with(|| Account::new(account.clone()));
        entry.is_minter = enabled;

        info!(account = %account, enabled, "minter authorization updated");
        Ok(())
    }

    /// Snapshot of an account, if it exists.
    #[must_use]
    pub fn get_account(&self, address: &Address) -> Option<Account> {
        let accounts = self.accounts.read();
        accounts.get(address).cloned()
    }

    fn credit_locked(accounts: &mut HashMap<Address, Account>, to: &Address, amount: Amount) {
        let account = accounts
            .entry(to.clone())
            .or_insert_with(|| Account::new(to.clone()));
        account.balance = account.balance.saturating_add(amount);
    }

    fn debit_locked(
        accounts: &mut HashMap<Address, Account>,
        from: &Address,
        amount: Amount,
    ) -> Result<()> {
        let have = accounts.get(from).map_or(Amount::ZERO, |a| a.balance);
        if have < amount {
            return Err(LedgerError::InsufficientFunds {
                account: from.clone(),
                have: have.grains(),
                need: amount.grains(),
            });
        }
        if let Some(account) = accounts.get_mut(from) {
            account.balance = account.balance.saturating_sub(amount);
        }
        Ok(())
    }
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("admin", &self.admin)
            .field("accounts", &self.accounts.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_core::Wallet;

    fn addr() -> Address {
        Wallet::generate().expect("wallet").address().clone()
    }

    fn funded_ledger(holder: &Address, grains: u64) -> (Ledger, Address) {
        let admin = addr();
        let ledger = Ledger::new(admin.clone());
        let minter = addr();
        ledger
            .set_minter_authorization(&admin, &minter, true)
            .expect("authorize minter");
        ledger
            .mint(&minter, holder, Amount::from_grains(grains))
            .expect("mint");
        (ledger, minter)
    }

    #[test]
    fn unknown_account_has_zero_balance() {
        let ledger = Ledger::new(addr());
        assert!(ledger.balance_of(&addr()).is_zero());
    }

    #[test]
    fn mint_requires_authorization() {
        let ledger = Ledger::new(addr());
        let unauthorized = addr();
        let result = ledger.mint(&unauthorized, &addr(), Amount::from_grains(100));
        assert!(matches!(result, Err(LedgerError::Unauthorized { .. })));
    }

    #[test]
    fn mint_credits_recipient() {
        let holder = addr();
        let (ledger, _) = funded_ledger(&holder, 1_000);
        assert_eq!(ledger.balance_of(&holder).grains(), 1_000);
    }

    #[test]
    fn set_minter_requires_admin() {
        let ledger = Ledger::new(addr());
        let caller = addr();
        let result = ledger.set_minter_authorization(&caller, &addr(), true);
        assert!(matches!(result, Err(LedgerError::Unauthorized { .. })));
    }

    #[test]
    fn revoked_minter_cannot_mint() {
        let admin = addr();
        let ledger = Ledger::new(admin.clone());
        let minter = addr();
        ledger
            .set_minter_authorization(&admin, &minter, true)
            .expect("grant");
        ledger
            .set_minter_authorization(&admin, &minter, false)
            .expect("revoke");
        let result = ledger.mint(&minter, &addr(), Amount::from_grains(1));
        assert!(matches!(result, Err(LedgerError::Unauthorized { .. })));
    }

    #[test]
    fn debit_insufficient_funds() {
        let holder = addr();
        let (ledger, _) = funded_ledger(&holder, 50);
        let result = ledger.debit(&holder, Amount::from_grains(100));
        assert!(matches!(result, Err(LedgerError::InsufficientFunds { .. })));
        // Balance untouched on failure.
        assert_eq!(ledger.balance_of(&holder).grains(), 50);
    }

    #[test]
    fn transfer_moves_funds() {
        let from = addr();
        let to = addr();
        let (ledger, _) = funded_ledger(&from, 100);

        ledger
            .transfer(&from, &to, Amount::from_grains(30))
            .expect("transfer");

        assert_eq!(ledger.balance_of(&from).grains(), 70);
        assert_eq!(ledger.balance_of(&to).grains(), 30);
    }

    #[test]
    fn transfer_insufficient_is_side_effect_free() {
        let from = addr();
        let to = addr();
        let (ledger, _) = funded_ledger(&from, 10);

        let result = ledger.transfer(&from, &to, Amount::from_grains(20));
        assert!(result.is_err());
        assert_eq!(ledger.balance_of(&from).grains(), 10);
        assert!(ledger.balance_of(&to).is_zero());
    }

    #[test]
    fn disburse_splits_atomically() {
        let vault = addr();
        let provider = addr();
        let collector = addr();
        let (ledger, _) = funded_ledger(&vault, 102);

        ledger
            .disburse(
                &vault,
                &[
                    (provider.clone(), Amount::from_grains(100)),
                    (collector.clone(), Amount::from_grains(2)),
                ],
            )
            .expect("disburse");

        assert!(ledger.balance_of(&vault).is_zero());
        assert_eq!(ledger.balance_of(&provider).grains(), 100);
        assert_eq!(ledger.balance_of(&collector).grains(), 2);
    }

    #[test]
    fn disburse_insufficient_changes_nothing() {
        let vault = addr();
        let provider = addr();
        let collector = addr();
        let (ledger, _) = funded_ledger(&vault, 101);

        let result = ledger.disburse(
            &vault,
            &[
                (provider.clone(), Amount::from_grains(100)),
                (collector.clone(), Amount::from_grains(2)),
            ],
        );
        assert!(matches!(result, Err(LedgerError::InsufficientFunds { .. })));
        assert_eq!(ledger.balance_of(&vault).grains(), 101);
        assert!(ledger.balance_of(&provider).is_zero());
        assert!(ledger.balance_of(&collector).is_zero());
    }

    #[test]
    fn burn_reduces_own_balance() {
        let holder = addr();
        let (ledger, _) = funded_ledger(&holder, 100);

        ledger.burn(&holder, Amount::from_grains(40)).expect("burn");
        assert_eq!(ledger.balance_of(&holder).grains(), 60);
    }

    #[test]
    fn burn_insufficient_funds() {
        let holder = addr();
        let (ledger, _) = funded_ledger(&holder, 10);
        let result = ledger.burn(&holder, Amount::from_grains(11));
        assert!(matches!(result, Err(LedgerError::InsufficientFunds { .. })));
        assert_eq!(ledger.balance_of(&holder).grains(), 10);
    }

    #[test]
    fn is_minter_query() {
        let admin = addr();
        let ledger = Ledger::new(admin.clone());
        let minter = addr();
        assert!(!ledger.is_minter(&minter));
        ledger
            .set_minter_authorization(&admin, &minter, true)
            .expect("grant");
        assert!(ledger.is_minter(&minter));
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn transfer_conserves_total(initial in 0u64..1_000_000, moved in 0u64..1_000_000) {
                let from = addr();
                let to = addr();
                let (ledger, _) = funded_ledger(&from, initial);

                let _ = ledger.transfer(&from, &to, Amount::from_grains(moved));

                let total = ledger.balance_of(&from).grains() + ledger.balance_of(&to).grains();
                prop_assert_eq!(total, initial);
            }
        }
    }
}
