//! Dashboard data types.

use chrono::NaiveDate;
use khata_shared::types::{Currency, Money, TransactionId};
use serde::{Deserialize, Serialize};

/// Dashboard summary computed from one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// Cutoff date; `None` covers the whole journal.
    pub as_of: Option<NaiveDate>,
    /// Books currency.
    pub currency: Currency,
    /// Sum of asset balances.
    pub total_assets: Money,
    /// Sum of revenue balances.
    pub total_income: Money,
    /// Sum of expense balances.
    pub total_expenses: Money,
    /// Income minus expenses.
    pub net_income: Money,
    /// Transactions up to the cutoff.
    pub transaction_count: usize,
    /// Most recent transactions, newest first.
    pub recent_activity: Vec<RecentActivity>,
    /// Outstanding dues, when a register was supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dues: Option<DuesOverview>,
}

/// One recent transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentActivity {
    /// Transaction ID.
    pub transaction_id: TransactionId,
    /// Booking date.
    pub date: NaiveDate,
    /// Particulars.
    pub particulars: String,
    /// Transaction amount (total debits).
    pub amount: Money,
}

/// Amount-due headline figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuesOverview {
    /// Total outstanding.
    pub outstanding: Money,
    /// Overdue amount.
    pub overdue: Money,
    /// Overdue record count.
    pub overdue_count: usize,
}
