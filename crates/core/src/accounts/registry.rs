//! In-memory chart of accounts.
//!
//! Accounts are never removed and ids are never reused. Deactivation only
//! flips the active flag so historical postings stay resolvable.

use std::collections::HashMap;

use chrono::Utc;
use khata_shared::types::AccountId;

use super::types::{Account, AccountType};
use crate::ledger::error::LedgerError;

/// Registry of accounts in registration order.
#[derive(Debug, Clone, Default)]
pub struct AccountRegistry {
    accounts: HashMap<AccountId, Account>,
    order: Vec<AccountId>,
}

impl AccountRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new active account and returns its id.
    ///
    /// # Errors
    ///
    /// Returns `EmptyAccountName` for a blank name and `DuplicateAccount` if
    /// an active account already uses the name.
    pub fn register(
        &mut self,
        name: &str,
        account_type: AccountType,
    ) -> Result<AccountId, LedgerError> {
        let account = self.prepare(name, account_type)?;
        let id = account.id;
        self.insert(account);
        Ok(id)
    }

    /// Validates a registration without changing the registry.
    ///
    /// # Errors
    ///
    /// Same as [`AccountRegistry::register`].
    pub fn prepare(&self, name: &str, account_type: AccountType) -> Result<Account, LedgerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::EmptyAccountName);
        }
        if self.find_by_name(name).is_some() {
            return Err(LedgerError::DuplicateAccount(name.to_string()));
        }
        Ok(Account {
            id: AccountId::new(),
            name: name.to_string(),
            account_type,
            is_active: true,
            opened_at: Utc::now(),
        })
    }

    /// Inserts an account produced by [`AccountRegistry::prepare`].
    pub(crate) fn insert(&mut self, account: Account) {
        if !self.accounts.contains_key(&account.id) {
            self.order.push(account.id);
        }
        self.accounts.insert(account.id, account);
    }

    /// Restores a persisted account during replay.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateAccount` if the id is already known or the name
    /// clashes with an active account.
    pub(crate) fn restore(&mut self, account: Account) -> Result<(), LedgerError> {
        if self.accounts.contains_key(&account.id) {
            return Err(LedgerError::DuplicateAccount(account.name));
        }
        if account.name.trim().is_empty() {
            return Err(LedgerError::EmptyAccountName);
        }
        if account.is_active && self.find_by_name(&account.name).is_some() {
            return Err(LedgerError::DuplicateAccount(account.name));
        }
        self.insert(account);
        Ok(())
    }

    /// Marks an account inactive.
    ///
    /// Returns `false` when the account was already inactive. Balance checks
    /// are the caller's job since the registry does not see the journal.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for unknown ids.
    pub fn deactivate(&mut self, id: AccountId) -> Result<bool, LedgerError> {
        let account = self
            .accounts
            .get_mut(&id)
            .ok_or(LedgerError::AccountNotFound(id))?;
        let changed = account.is_active;
        account.is_active = false;
        Ok(changed)
    }

    /// Looks up an account, active or not.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for unknown ids.
    pub fn get(&self, id: AccountId) -> Result<&Account, LedgerError> {
        self.accounts.get(&id).ok_or(LedgerError::AccountNotFound(id))
    }

    /// Looks up an account that can receive postings.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` or `AccountInactive`.
    pub fn ensure_postable(&self, id: AccountId) -> Result<&Account, LedgerError> {
        let account = self.get(id)?;
        if !account.is_active {
            return Err(LedgerError::AccountInactive(id));
        }
        Ok(account)
    }

    /// Finds the active account with this name, ignoring case and padding.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&Account> {
        let wanted = name.trim().to_lowercase();
        self.active().find(|a| a.name.to_lowercase() == wanted)
    }

    /// Accounts whose name contains `term`, ignoring case.
    ///
    /// An empty term matches everything.
    pub fn search<'a>(&'a self, term: &str) -> impl Iterator<Item = &'a Account> + use<'a> {
        let needle = term.trim().to_lowercase();
        self.all()
            .filter(move |a| a.name.to_lowercase().contains(&needle))
    }

    /// All accounts in registration order.
    pub fn all(&self) -> impl Iterator<Item = &Account> {
        self.order.iter().filter_map(|id| self.accounts.get(id))
    }

    /// Active accounts in registration order.
    pub fn active(&self) -> impl Iterator<Item = &Account> {
        self.all().filter(|a| a.is_active)
    }

    /// Active accounts of one type in registration order.
    pub fn accounts_of_type(&self, account_type: AccountType) -> impl Iterator<Item = &Account> {
        self.active().filter(move |a| a.account_type == account_type)
    }

    /// Number of accounts ever registered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns true when no account has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
