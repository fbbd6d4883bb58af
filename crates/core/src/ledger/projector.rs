//! Ledger projections: balances, ledger lines and period activity.
//!
//! Everything here is a pure fold over the journal in `(date, sequence)`
//! order. Nothing is cached, so two projections over the same snapshot
//! always agree.

use std::collections::HashMap;

use chrono::NaiveDate;
use khata_shared::types::{AccountId, Currency, Money, TransactionId};
use serde::{Deserialize, Serialize};

use super::balance::{AccountBalance, AccountTotals, RunningBalance};
use super::error::LedgerError;
use super::journal::Journal;
use super::types::DateRange;
use crate::accounts::{Account, AccountRegistry, AccountType};

/// One row of an account's ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerLine {
    /// Source transaction.
    pub transaction_id: TransactionId,
    /// Source transaction sequence.
    pub sequence: u64,
    /// Booking date.
    pub date: NaiveDate,
    /// Transaction particulars.
    pub particulars: String,
    /// Posting memo, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
    /// Debit amount, if this line is a debit.
    pub debit: Option<Money>,
    /// Credit amount, if this line is a credit.
    pub credit: Option<Money>,
    /// Balance after this line on the account's normal side.
    pub running_balance: Money,
}

/// Read-only projector over one registry/journal pair.
#[derive(Debug, Clone, Copy)]
pub struct LedgerProjector<'a> {
    registry: &'a AccountRegistry,
    journal: &'a Journal,
    currency: Currency,
}

impl<'a> LedgerProjector<'a> {
    /// Creates a projector.
    #[must_use]
    pub const fn new(registry: &'a AccountRegistry, journal: &'a Journal, currency: Currency) -> Self {
        Self {
            registry,
            journal,
            currency,
        }
    }

    /// Books currency.
    #[must_use]
    pub const fn currency(&self) -> Currency {
        self.currency
    }

    /// Balance of an account as of a date (inclusive), or over the whole journal.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for unknown accounts and `AmountOverflow`
    /// if the fold overflows.
    pub fn account_balance(
        &self,
        account_id: AccountId,
        as_of: Option<NaiveDate>,
    ) -> Result<Money, LedgerError> {
        let account = self.registry.get(account_id)?;
        let totals = self.fold_totals(account_id, DateRange::up_to(as_of))?;
        Ok(totals.balance(account.normal_balance())?)
    }

    /// Debit and credit turnover of an account within `range`.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for unknown accounts.
    pub fn account_activity(
        &self,
        account_id: AccountId,
        range: DateRange,
    ) -> Result<AccountTotals, LedgerError> {
        self.registry.get(account_id)?;
        self.fold_totals(account_id, range)
    }

    /// Balance read from the turnover maintained on every append.
    ///
    /// Must always equal [`LedgerProjector::account_balance`] with no cutoff.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for unknown accounts.
    pub fn incremental_balance(&self, account_id: AccountId) -> Result<Money, LedgerError> {
        let account = self.registry.get(account_id)?;
        let totals = self
            .journal
            .totals(account_id)
            .unwrap_or(AccountTotals::zero(self.currency));
        Ok(totals.balance(account.normal_balance())?)
    }

    /// Ordered ledger rows for an account with running balance.
    ///
    /// An account with no postings yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` for unknown accounts.
    pub fn ledger_lines(&self, account_id: AccountId) -> Result<Vec<LedgerLine>, LedgerError> {
        let account = self.registry.get(account_id)?;
        let normal = account.normal_balance();

        let mut running: Option<RunningBalance> = None;
        let mut lines = Vec::new();
        for tx in self.journal.transactions(DateRange::all()) {
            for posting in tx.postings_for(account_id) {
                let change = normal.posting_change(posting)?;
                let next = match &running {
                    None => RunningBalance::first_entry(change),
                    Some(previous) => RunningBalance::next_entry(previous, change)?,
                };
                let (debit, credit) = posting.split();
                lines.push(LedgerLine {
                    transaction_id: tx.id,
                    sequence: tx.sequence,
                    date: tx.date,
                    particulars: tx.description.clone(),
                    memo: posting.memo.clone(),
                    debit: (!debit.is_zero()).then_some(debit),
                    credit: (!credit.is_zero()).then_some(credit),
                    running_balance: next.current_balance,
                });
                running = Some(next);
            }
        }
        Ok(lines)
    }

    /// Balances of every registered account over `range`, in registration order.
    ///
    /// Inactive accounts are included and flagged.
    ///
    /// # Errors
    ///
    /// Returns `AmountOverflow` if any fold overflows.
    pub fn balances(&self, range: DateRange) -> Result<Vec<AccountBalance>, LedgerError> {
        let mut turnover: HashMap<AccountId, AccountTotals> = HashMap::new();
        for tx in self.journal.transactions(range) {
            for posting in &tx.postings {
                let totals = turnover
                    .entry(posting.account_id)
                    .or_insert(AccountTotals::zero(self.currency));
                *totals = totals.with_posting(posting)?;
            }
        }

        self.registry
            .all()
            .map(|account| {
                let totals = turnover
                    .get(&account.id)
                    .copied()
                    .unwrap_or(AccountTotals::zero(self.currency));
                Self::account_balance_row(account, totals)
            })
            .collect()
    }

    /// Sum of the balances of every account of one type over `range`.
    ///
    /// # Errors
    ///
    /// Returns `AmountOverflow` if the sum overflows.
    pub fn type_total(
        &self,
        account_type: AccountType,
        range: DateRange,
    ) -> Result<Money, LedgerError> {
        let balances = self.balances(range)?;
        let amounts = balances
            .iter()
            .filter(|b| b.account_type == account_type)
            .map(|b| b.balance);
        Ok(Money::checked_sum(amounts, self.currency)?)
    }

    fn fold_totals(
        &self,
        account_id: AccountId,
        range: DateRange,
    ) -> Result<AccountTotals, LedgerError> {
        self.journal
            .transactions(range)
            .flat_map(|tx| tx.postings_for(account_id))
            .try_fold(AccountTotals::zero(self.currency), |totals, posting| {
                Ok(totals.with_posting(posting)?)
            })
    }

    fn account_balance_row(
        account: &Account,
        totals: AccountTotals,
    ) -> Result<AccountBalance, LedgerError> {
        Ok(AccountBalance {
            account_id: account.id,
            name: account.name.clone(),
            account_type: account.account_type,
            is_active: account.is_active,
            totals,
            balance: totals.balance(account.normal_balance())?,
        })
    }
}
