//! Receivables error types.

use chrono::NaiveDate;
use khata_shared::types::{Currency, Money, MoneyError};
use thiserror::Error;

/// Errors raised by the amount-due register.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReceivablesError {
    /// Retailer name is empty.
    #[error("Retailer name cannot be empty")]
    EmptyRetailer,

    /// Due amount must be strictly positive.
    #[error("Amount due must be positive, got {0}")]
    NonPositiveAmount(Money),

    /// Amount is not in the register's currency.
    #[error("Amount currency {found} does not match register currency {expected}")]
    CurrencyMismatch {
        /// Register currency.
        expected: Currency,
        /// Currency of the amount.
        found: Currency,
    },

    /// No record with this serial number.
    #[error("Amount due record {0} not found")]
    RecordNotFound(u32),

    /// Record was already settled.
    #[error("Amount due record {serial_no} was already settled on {settled_on}")]
    AlreadySettled {
        /// Serial number.
        serial_no: u32,
        /// Settlement date.
        settled_on: NaiveDate,
    },

    /// Settlement predates the record.
    #[error("Settlement date {settled_on} is before invoice date {date}")]
    SettledBeforeInvoice {
        /// Invoice date.
        date: NaiveDate,
        /// Attempted settlement date.
        settled_on: NaiveDate,
    },

    /// Amount arithmetic failed.
    #[error("Amount error: {0}")]
    Amount(#[from] MoneyError),
}

impl ReceivablesError {
    /// Returns the error code for presentation layers.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyRetailer => "EMPTY_RETAILER",
            Self::NonPositiveAmount(_) => "NON_POSITIVE_AMOUNT",
            Self::CurrencyMismatch { .. } => "CURRENCY_MISMATCH",
            Self::RecordNotFound(_) => "RECORD_NOT_FOUND",
            Self::AlreadySettled { .. } => "ALREADY_SETTLED",
            Self::SettledBeforeInvoice { .. } => "SETTLED_BEFORE_INVOICE",
            Self::Amount(_) => "INVALID_AMOUNT",
        }
    }
}
