//! Ledger error types for validation, state and integrity errors.
//!
//! Every validation error is raised before any mutation, so a failed commit
//! never leaves a partial transaction behind.

use chrono::NaiveDate;
use khata_shared::types::{AccountId, Currency, Money, MoneyError, TransactionId};
use thiserror::Error;

use super::store::StoreError;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Transaction must have at least 2 postings.
    #[error("Transaction must have at least 2 postings, got {0}")]
    InsufficientPostings(usize),

    /// Transaction is not balanced (debits != credits).
    #[error("Transaction is not balanced: debits {debits} != credits {credits}")]
    UnbalancedTransaction {
        /// Total of debit postings.
        debits: Money,
        /// Total of credit postings.
        credits: Money,
    },

    /// Posting amount must be strictly positive.
    #[error("Posting amount must be positive, got {0}")]
    NonPositiveAmount(Money),

    /// Transaction particulars are empty.
    #[error("Transaction particulars cannot be empty")]
    EmptyDescription,

    /// Posting is not in the books' currency.
    #[error("Posting currency {found} does not match book currency {expected}")]
    CurrencyMismatch {
        /// The books' functional currency.
        expected: Currency,
        /// The currency found on the posting.
        found: Currency,
    },

    /// Amount arithmetic overflowed.
    #[error("Amount overflow")]
    AmountOverflow,

    /// Amount could not be represented.
    #[error("Invalid amount: {0}")]
    InvalidAmount(MoneyError),

    /// Date range bounds are reversed.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    // ========== Account Errors ==========
    /// Account not found.
    #[error("Account not found: {0}")]
    AccountNotFound(AccountId),

    /// An active account with the same name already exists.
    #[error("An active account named '{0}' already exists")]
    DuplicateAccount(String),

    /// Account name is empty.
    #[error("Account name cannot be empty")]
    EmptyAccountName,

    /// Account is inactive and cannot be posted to.
    #[error("Account {0} is inactive")]
    AccountInactive(AccountId),

    /// Account still carries a balance and cannot be deactivated.
    #[error("Account {id} still carries a balance of {balance}")]
    AccountInUse {
        /// The account ID.
        id: AccountId,
        /// The outstanding balance.
        balance: Money,
    },

    // ========== Transaction State Errors ==========
    /// Transaction not found.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    /// Transaction already has a reversing transaction.
    #[error("Transaction {original} was already reversed by {reversal}")]
    AlreadyReversed {
        /// The reversed transaction.
        original: TransactionId,
        /// The existing reversal.
        reversal: TransactionId,
    },

    // ========== Concurrency Errors ==========
    /// Another commit holds the journal.
    #[error("Concurrent modification detected, please retry")]
    ConcurrentModification,

    /// The journal grew since the caller last read it.
    #[error("Journal length mismatch: expected {expected}, found {actual}")]
    JournalLengthMismatch {
        /// Length the caller observed.
        expected: usize,
        /// Current length.
        actual: usize,
    },

    // ========== Integrity & Storage Errors ==========
    /// A stored record failed validation during replay.
    #[error("Corrupt journal at record {record}: {reason}")]
    CorruptJournal {
        /// Zero-based record index in the store.
        record: usize,
        /// What failed.
        reason: String,
    },

    /// Journal storage failed.
    #[error("Journal storage error: {0}")]
    Storage(#[from] StoreError),
}

impl From<MoneyError> for LedgerError {
    fn from(err: MoneyError) -> Self {
        match err {
            MoneyError::Overflow => Self::AmountOverflow,
            MoneyError::CurrencyMismatch { left, right } => Self::CurrencyMismatch {
                expected: left,
                found: right,
            },
            other => Self::InvalidAmount(other),
        }
    }
}

impl LedgerError {
    /// Returns the error code for presentation layers.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientPostings(_) => "INSUFFICIENT_POSTINGS",
            Self::UnbalancedTransaction { .. } => "UNBALANCED_TRANSACTION",
            Self::NonPositiveAmount(_) => "NON_POSITIVE_AMOUNT",
            Self::EmptyDescription => "EMPTY_DESCRIPTION",
            Self::CurrencyMismatch { .. } => "CURRENCY_MISMATCH",
            Self::AmountOverflow => "AMOUNT_OVERFLOW",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::AccountNotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::DuplicateAccount(_) => "DUPLICATE_ACCOUNT",
            Self::EmptyAccountName => "EMPTY_ACCOUNT_NAME",
            Self::AccountInactive(_) => "ACCOUNT_INACTIVE",
            Self::AccountInUse { .. } => "ACCOUNT_IN_USE",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::AlreadyReversed { .. } => "ALREADY_REVERSED",
            Self::ConcurrentModification | Self::JournalLengthMismatch { .. } => {
                "CONCURRENT_MODIFICATION"
            }
            Self::CorruptJournal { .. } => "CORRUPT_JOURNAL",
            Self::Storage(_) => "STORAGE_ERROR",
        }
    }

    /// Returns true if this error is retryable.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConcurrentModification | Self::JournalLengthMismatch { .. }
        )
    }

    /// Returns true for lookups of unknown accounts or transactions.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::AccountNotFound(_) | Self::TransactionNotFound(_)
        )
    }
}
