//! Report error types.

use chrono::NaiveDate;
use khata_shared::types::{Currency, Money, MoneyError};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::ledger::LedgerError;
use crate::receivables::ReceivablesError;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Report totals disagree. The ledger is corrupt if this ever happens.
    #[error("{report} is out of balance: debits {debits} != credits {credits}")]
    OutOfBalance {
        /// Which report failed.
        report: &'static str,
        /// Debit-side total.
        debits: Money,
        /// Credit-side total.
        credits: Money,
    },

    /// Tax rate outside 0..=100.
    #[error("Tax rate must be between 0 and 100, got {0}")]
    InvalidTaxRate(Decimal),

    /// Invalid date range.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date.
        start: NaiveDate,
        /// End date.
        end: NaiveDate,
    },

    /// Amounts in different currencies were combined.
    #[error("Currency mismatch: expected {expected}, found {found}")]
    CurrencyMismatch {
        /// Expected currency.
        expected: Currency,
        /// Found currency.
        found: Currency,
    },

    /// Amount arithmetic failed.
    #[error("Amount error: {0}")]
    Amount(MoneyError),

    /// Underlying ledger error.
    #[error(transparent)]
    Ledger(LedgerError),

    /// Amount-due register error.
    #[error(transparent)]
    Receivables(#[from] ReceivablesError),
}

impl From<MoneyError> for ReportError {
    fn from(err: MoneyError) -> Self {
        match err {
            MoneyError::CurrencyMismatch { left, right } => Self::CurrencyMismatch {
                expected: left,
                found: right,
            },
            other => Self::Amount(other),
        }
    }
}

impl From<LedgerError> for ReportError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InvalidDateRange { start, end } => Self::InvalidDateRange { start, end },
            other => Self::Ledger(other),
        }
    }
}

impl ReportError {
    /// Returns the error code for presentation layers.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::OutOfBalance { .. } => "OUT_OF_BALANCE",
            Self::InvalidTaxRate(_) => "INVALID_TAX_RATE",
            Self::InvalidDateRange { .. } => "INVALID_DATE_RANGE",
            Self::CurrencyMismatch { .. } => "CURRENCY_MISMATCH",
            Self::Amount(_) => "INVALID_AMOUNT",
            Self::Ledger(err) => err.error_code(),
            Self::Receivables(err) => err.error_code(),
        }
    }

    /// Returns true when the ledger itself is inconsistent.
    #[must_use]
    pub fn is_integrity_violation(&self) -> bool {
        matches!(
            self,
            Self::OutOfBalance { .. } | Self::Ledger(LedgerError::CorruptJournal { .. })
        )
    }
}
