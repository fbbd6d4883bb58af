//! Append-only journal of committed transactions.
//!
//! Transactions are kept in commit order. A secondary index orders them by
//! `(date, sequence)` so listings and balance folds are deterministic even
//! when entries are back-dated. Per-account turnover is maintained on every
//! append and must always agree with a fresh fold over the journal.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use khata_shared::types::{AccountId, Currency, TransactionId};

use super::balance::AccountTotals;
use super::error::LedgerError;
use super::transaction::{NewTransaction, Transaction};
use super::types::DateRange;
use super::validation::validate_transaction;
use crate::accounts::AccountRegistry;

/// A validated transaction ready to append.
///
/// Holds the updated turnover of every touched account so that appending
/// cannot fail once the record has been persisted.
#[derive(Debug, Clone)]
pub struct PreparedTransaction {
    transaction: Transaction,
    account_totals: Vec<(AccountId, AccountTotals)>,
}

impl PreparedTransaction {
    /// The transaction that will be appended.
    #[must_use]
    pub const fn transaction(&self) -> &Transaction {
        &self.transaction
    }
}

/// Append-only transaction log.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Vec<Arc<Transaction>>,
    by_id: HashMap<TransactionId, usize>,
    chronological: BTreeMap<(NaiveDate, u64), usize>,
    totals: HashMap<AccountId, AccountTotals>,
    reversed: HashMap<TransactionId, TransactionId>,
}

impl Journal {
    /// Creates an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates new input and assigns it the next sequence number.
    ///
    /// # Errors
    ///
    /// Returns the first violated posting rule, `TransactionNotFound` if a
    /// reversal targets an unknown transaction, or `AlreadyReversed`.
    pub fn prepare(
        &self,
        input: NewTransaction,
        registry: &AccountRegistry,
        currency: Currency,
        committed_at: DateTime<Utc>,
    ) -> Result<PreparedTransaction, LedgerError> {
        validate_transaction(&input.description, &input.postings, registry, currency)?;
        if let Some(original) = input.reverses {
            self.ensure_reversible(original)?;
        }

        let transaction = Transaction {
            id: TransactionId::new(),
            sequence: self.next_sequence(),
            date: input.date,
            description: input.description.trim().to_string(),
            postings: input.postings,
            reverses: input.reverses,
            committed_at,
        };
        self.finish(transaction, currency)
    }

    /// Validates a transaction read back from storage.
    ///
    /// Replay goes through the same rules as a fresh commit. Any failure is
    /// reported as `CorruptJournal` at `record`.
    ///
    /// # Errors
    ///
    /// Returns `CorruptJournal` describing the first violated rule.
    pub fn prepare_replay(
        &self,
        transaction: Transaction,
        registry: &AccountRegistry,
        currency: Currency,
        record: usize,
    ) -> Result<PreparedTransaction, LedgerError> {
        let corrupt = |reason: String| LedgerError::CorruptJournal { record, reason };

        if transaction.sequence != self.next_sequence() {
            return Err(corrupt(format!(
                "sequence {} follows {}",
                transaction.sequence,
                self.entries.len()
            )));
        }
        if self.by_id.contains_key(&transaction.id) {
            return Err(corrupt(format!("duplicate transaction {}", transaction.id)));
        }
        validate_transaction(
            &transaction.description,
            &transaction.postings,
            registry,
            currency,
        )
        .map_err(|e| corrupt(e.to_string()))?;
        if let Some(original) = transaction.reverses {
            self.ensure_reversible(original)
                .map_err(|e| corrupt(e.to_string()))?;
        }
        self.finish(transaction, currency)
            .map_err(|e| corrupt(e.to_string()))
    }

    /// Appends a prepared transaction.
    ///
    /// The transaction must have been prepared against this journal with no
    /// other append in between.
    pub fn append(&mut self, prepared: PreparedTransaction) -> Arc<Transaction> {
        let PreparedTransaction {
            transaction,
            account_totals,
        } = prepared;
        let index = self.entries.len();

        for (account_id, totals) in account_totals {
            self.totals.insert(account_id, totals);
        }
        if let Some(original) = transaction.reverses {
            self.reversed.insert(original, transaction.id);
        }
        self.by_id.insert(transaction.id, index);
        self.chronological
            .insert((transaction.date, transaction.sequence), index);

        let transaction = Arc::new(transaction);
        self.entries.push(Arc::clone(&transaction));
        transaction
    }

    /// Number of committed transactions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when nothing has been committed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up a transaction.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound` for unknown ids.
    pub fn get(&self, id: TransactionId) -> Result<&Transaction, LedgerError> {
        self.by_id
            .get(&id)
            .and_then(|&index| self.entries.get(index))
            .map(Arc::as_ref)
            .ok_or(LedgerError::TransactionNotFound(id))
    }

    /// Transactions in commit order.
    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.entries.iter().map(Arc::as_ref)
    }

    /// Transactions within `range` in `(date, sequence)` order.
    ///
    /// The iterator is lazy and can be cloned to restart it or reversed for
    /// newest-first listings.
    pub fn transactions(
        &self,
        range: DateRange,
    ) -> impl DoubleEndedIterator<Item = &Transaction> + Clone + '_ {
        self.chronological
            .range(range.key_bounds())
            .filter_map(move |(_, &index)| self.entries.get(index))
            .map(Arc::as_ref)
    }

    /// Transactions whose particulars or memos contain `term`, ignoring case.
    pub fn search<'a>(&'a self, term: &str) -> impl Iterator<Item = &'a Transaction> + use<'a> {
        let needle = term.trim().to_lowercase();
        self.transactions(DateRange::all())
            .filter(move |tx| tx.matches(&needle))
    }

    /// Turnover maintained on append; `None` if the account was never posted to.
    #[must_use]
    pub fn totals(&self, account_id: AccountId) -> Option<AccountTotals> {
        self.totals.get(&account_id).copied()
    }

    /// The transaction that reversed `id`, if any.
    #[must_use]
    pub fn reversal_of(&self, id: TransactionId) -> Option<TransactionId> {
        self.reversed.get(&id).copied()
    }

    fn next_sequence(&self) -> u64 {
        self.entries.len() as u64 + 1
    }

    fn ensure_reversible(&self, original: TransactionId) -> Result<(), LedgerError> {
        self.get(original)?;
        if let Some(reversal) = self.reversal_of(original) {
            return Err(LedgerError::AlreadyReversed { original, reversal });
        }
        Ok(())
    }

    fn finish(
        &self,
        transaction: Transaction,
        currency: Currency,
    ) -> Result<PreparedTransaction, LedgerError> {
        let mut account_totals: Vec<(AccountId, AccountTotals)> = Vec::new();
        for posting in &transaction.postings {
            let slot = match account_totals
                .iter()
                .position(|(id, _)| *id == posting.account_id)
            {
                Some(position) => position,
                None => {
                    let current = self
                        .totals(posting.account_id)
                        .unwrap_or(AccountTotals::zero(currency));
                    account_totals.push((posting.account_id, current));
                    account_totals.len() - 1
                }
            };
            let (_, totals) = &mut account_totals[slot];
            *totals = totals.with_posting(posting)?;
        }
        Ok(PreparedTransaction {
            transaction,
            account_totals,
        })
    }
}
