//! Amount due data types.

use chrono::NaiveDate;
use khata_shared::types::{Currency, Money};
use serde::{Deserialize, Serialize};

/// A retailer's outstanding amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DueRecord {
    /// Serial number, starting at 1.
    pub serial_no: u32,
    /// Invoice date.
    pub date: NaiveDate,
    /// Retailer name.
    pub retailer: String,
    /// Amount owed.
    pub amount: Money,
    /// Date after which the amount is overdue.
    pub due_date: NaiveDate,
    /// When the amount was settled.
    pub settled_on: Option<NaiveDate>,
}

impl DueRecord {
    /// Whether the amount is still owed on `as_of`.
    #[must_use]
    pub fn is_outstanding(&self, as_of: NaiveDate) -> bool {
        self.date <= as_of && self.settled_on.is_none_or(|settled| settled > as_of)
    }

    /// Days past the due date on `as_of`, if any.
    #[must_use]
    pub fn days_overdue(&self, as_of: NaiveDate) -> Option<u32> {
        let days = (as_of - self.due_date).num_days();
        u32::try_from(days).ok().filter(|d| *d > 0)
    }
}

/// One row of the amount-due table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountDueRow {
    /// Serial number.
    pub serial_no: u32,
    /// Invoice date.
    pub date: NaiveDate,
    /// Retailer name.
    pub retailer: String,
    /// Amount owed.
    pub amount: Money,
    /// Due date.
    pub due_date: NaiveDate,
    /// Days overdue; absent when not overdue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_overdue: Option<u32>,
}

/// Outstanding and overdue totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmountDueSummary {
    /// Summary date.
    pub as_of: NaiveDate,
    /// Register currency.
    pub currency: Currency,
    /// Sum of all outstanding amounts.
    pub total_outstanding: Money,
    /// Sum of overdue amounts.
    pub overdue_amount: Money,
    /// Number of overdue records.
    pub overdue_count: usize,
    /// Outstanding records in serial order.
    pub rows: Vec<AmountDueRow>,
}
