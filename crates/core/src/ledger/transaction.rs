//! Transaction aggregate.

use chrono::{DateTime, NaiveDate, Utc};
use khata_shared::types::{AccountId, Currency, Money, TransactionId};
use serde::{Deserialize, Serialize};

use super::entry::{EntryType, Posting};
use super::error::LedgerError;
use super::types::TransactionTotals;

/// Input for a new transaction.
///
/// Built by the presentation layer (Add Transaction, Billing) and validated by
/// the journal before anything is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    /// Booking date.
    pub date: NaiveDate,
    /// Particulars.
    pub description: String,
    /// Postings (must have at least 2).
    pub postings: Vec<Posting>,
    /// Transaction this one reverses, if any.
    pub reverses: Option<TransactionId>,
}

impl NewTransaction {
    /// Starts a transaction with no postings.
    #[must_use]
    pub fn new(date: NaiveDate, description: impl Into<String>) -> Self {
        Self {
            date,
            description: description.into(),
            postings: Vec::new(),
            reverses: None,
        }
    }

    /// Adds a debit posting.
    #[must_use]
    pub fn debit(mut self, account_id: AccountId, amount: Money) -> Self {
        self.postings.push(Posting::debit(account_id, amount));
        self
    }

    /// Adds a credit posting.
    #[must_use]
    pub fn credit(mut self, account_id: AccountId, amount: Money) -> Self {
        self.postings.push(Posting::credit(account_id, amount));
        self
    }

    /// Adds an arbitrary posting.
    #[must_use]
    pub fn posting(mut self, posting: Posting) -> Self {
        self.postings.push(posting);
        self
    }
}

/// A committed transaction. Immutable once it is in the journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier.
    pub id: TransactionId,
    /// Commit sequence number, starting at 1 with no gaps.
    pub sequence: u64,
    /// Booking date.
    pub date: NaiveDate,
    /// Particulars.
    pub description: String,
    /// Ordered postings.
    pub postings: Vec<Posting>,
    /// Transaction this one reverses, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reverses: Option<TransactionId>,
    /// When the transaction was committed.
    pub committed_at: DateTime<Utc>,
}

impl Transaction {
    /// Currency of the postings.
    ///
    /// A committed transaction always has postings in a single currency.
    #[must_use]
    pub fn currency(&self) -> Option<Currency> {
        self.postings.first().map(|p| p.amount.currency())
    }

    /// Sums debit and credit postings.
    pub fn totals(&self) -> Result<TransactionTotals, LedgerError> {
        let currency = self.currency().unwrap_or(Currency::Usd);
        sum_postings(&self.postings, currency)
    }

    /// Returns true if any posting touches `account_id`.
    #[must_use]
    pub fn touches(&self, account_id: AccountId) -> bool {
        self.postings.iter().any(|p| p.account_id == account_id)
    }

    /// Postings to `account_id`, in order.
    pub fn postings_for(&self, account_id: AccountId) -> impl Iterator<Item = &Posting> {
        self.postings
            .iter()
            .filter(move |p| p.account_id == account_id)
    }

    /// Case-insensitive match on particulars and posting memos.
    #[must_use]
    pub fn matches(&self, needle_lowercase: &str) -> bool {
        self.description.to_lowercase().contains(needle_lowercase)
            || self.postings.iter().any(|p| {
                p.memo
                    .as_deref()
                    .is_some_and(|memo| memo.to_lowercase().contains(needle_lowercase))
            })
    }

    /// Returns true if this transaction reverses another.
    #[must_use]
    pub fn is_reversal(&self) -> bool {
        self.reverses.is_some()
    }
}

/// Sums postings by side with checked arithmetic.
pub(crate) fn sum_postings(
    postings: &[Posting],
    currency: Currency,
) -> Result<TransactionTotals, LedgerError> {
    postings
        .iter()
        .try_fold(TransactionTotals::zero(currency), |mut totals, posting| {
            match posting.entry_type {
                EntryType::Debit => totals.debit = totals.debit.checked_add(posting.amount)?,
                EntryType::Credit => totals.credit = totals.credit.checked_add(posting.amount)?,
            }
            Ok(totals)
        })
}
