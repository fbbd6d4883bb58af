//! Billing error types.

use chrono::NaiveDate;
use khata_shared::types::{Currency, Money, MoneyError};
use thiserror::Error;

/// Errors raised while building bills.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BillingError {
    /// Item is not in the catalog.
    #[error("Unknown item: {0}")]
    UnknownItem(String),

    /// Quantity must be at least 1.
    #[error("Quantity must be positive, got {0}")]
    InvalidQuantity(i64),

    /// Bill has no lines.
    #[error("Bill has no items")]
    EmptyBill,

    /// Catalog already has an item with this name.
    #[error("Item '{0}' already exists in the catalog")]
    DuplicateItem(String),

    /// Item name is empty.
    #[error("Item name cannot be empty")]
    EmptyItemName,

    /// Price must be strictly positive.
    #[error("Price must be positive, got {0}")]
    NonPositivePrice(Money),

    /// Price is not in the catalog currency.
    #[error("Price currency {found} does not match catalog currency {expected}")]
    CurrencyMismatch {
        /// Catalog currency.
        expected: Currency,
        /// Currency of the price.
        found: Currency,
    },

    /// More than 9999 orders on one day.
    #[error("Order numbers exhausted for {0}")]
    SequenceExhausted(NaiveDate),

    /// Amount arithmetic failed.
    #[error("Amount error: {0}")]
    Amount(#[from] MoneyError),
}

impl BillingError {
    /// Returns the error code for presentation layers.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownItem(_) => "UNKNOWN_ITEM",
            Self::InvalidQuantity(_) => "INVALID_QUANTITY",
            Self::EmptyBill => "EMPTY_BILL",
            Self::DuplicateItem(_) => "DUPLICATE_ITEM",
            Self::EmptyItemName => "EMPTY_ITEM_NAME",
            Self::NonPositivePrice(_) => "NON_POSITIVE_PRICE",
            Self::CurrencyMismatch { .. } => "CURRENCY_MISMATCH",
            Self::SequenceExhausted(_) => "SEQUENCE_EXHAUSTED",
            Self::Amount(_) => "INVALID_AMOUNT",
        }
    }
}
