//! Ledger value types shared by the journal, projector and reports.

use std::ops::Bound;

use chrono::NaiveDate;
use khata_shared::types::{Currency, Money};
use serde::{Deserialize, Serialize};

use super::error::LedgerError;

/// Transaction totals for validation and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionTotals {
    /// Total debit amount.
    pub debit: Money,
    /// Total credit amount.
    pub credit: Money,
}

impl TransactionTotals {
    /// Zero totals in `currency`.
    #[must_use]
    pub const fn zero(currency: Currency) -> Self {
        Self {
            debit: Money::zero(currency),
            credit: Money::zero(currency),
        }
    }

    /// Whether debits equal credits.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.debit == self.credit
    }

    /// Returns the difference between debits and credits.
    pub fn difference(&self) -> Result<Money, LedgerError> {
        Ok(self.debit.checked_sub(self.credit)?)
    }
}

/// Inclusive date window; an open bound means "from the beginning" or "to the end".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First included date.
    pub from: Option<NaiveDate>,
    /// Last included date.
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// The unbounded range.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            from: None,
            to: None,
        }
    }

    /// Everything up to and including `as_of` (unbounded when `None`).
    #[must_use]
    pub const fn up_to(as_of: Option<NaiveDate>) -> Self {
        Self {
            from: None,
            to: as_of,
        }
    }

    /// A closed range.
    pub fn between(from: NaiveDate, to: NaiveDate) -> Result<Self, LedgerError> {
        Self::new(Some(from), Some(to))
    }

    /// A range with optional bounds; fails if `from` is after `to`.
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Self, LedgerError> {
        if let (Some(start), Some(end)) = (from, to)
            && start > end
        {
            return Err(LedgerError::InvalidDateRange { start, end });
        }
        Ok(Self { from, to })
    }

    /// Whether `date` falls in the range.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }

    /// Bounds over the journal's `(date, sequence)` ordering key.
    ///
    /// A range built with reversed bounds selects nothing.
    pub(crate) fn key_bounds(&self) -> (Bound<(NaiveDate, u64)>, Bound<(NaiveDate, u64)>) {
        if let (Some(from), Some(to)) = (self.from, self.to)
            && from > to
        {
            return (Bound::Included((from, 0)), Bound::Excluded((from, 0)));
        }
        let lower = self
            .from
            .map_or(Bound::Unbounded, |from| Bound::Included((from, 0)));
        let upper = self
            .to
            .map_or(Bound::Unbounded, |to| Bound::Included((to, u64::MAX)));
        (lower, upper)
    }
}
