//! Report data types.

use std::fmt;

use chrono::NaiveDate;
use khata_shared::types::{AccountId, Currency, Money};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::accounts::AccountType;
use crate::ledger::DateRange;

/// One trial balance row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceRow {
    /// Account ID.
    pub account_id: AccountId,
    /// Account name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Whether the account is active.
    pub is_active: bool,
    /// Total debits posted.
    pub debit_turnover: Money,
    /// Total credits posted.
    pub credit_turnover: Money,
    /// Net balance when it falls on the debit side.
    pub debit: Option<Money>,
    /// Net balance when it falls on the credit side.
    pub credit: Option<Money>,
}

/// Trial balance totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceTotals {
    /// Sum of debit turnover.
    pub debit_turnover: Money,
    /// Sum of credit turnover.
    pub credit_turnover: Money,
    /// Sum of the net debit column.
    pub debit: Money,
    /// Sum of the net credit column.
    pub credit: Money,
}

impl TrialBalanceTotals {
    /// Whether both the turnover and net columns agree.
    #[must_use]
    pub fn is_balanced(&self) -> bool {
        self.debit_turnover == self.credit_turnover && self.debit == self.credit
    }
}

/// Trial balance report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialBalanceReport {
    /// Cutoff date; `None` covers the whole journal.
    pub as_of: Option<NaiveDate>,
    /// Books currency.
    pub currency: Currency,
    /// Account rows in registration order.
    pub rows: Vec<TrialBalanceRow>,
    /// Column totals.
    pub totals: TrialBalanceTotals,
}

/// A named amount within a report section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportLine {
    /// Source account; `None` for computed lines such as current earnings.
    pub account_id: Option<AccountId>,
    /// Line label.
    pub name: String,
    /// Amount on the section's natural side.
    pub amount: Money,
}

/// A list of lines with their total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSection {
    /// Section lines.
    pub lines: Vec<ReportLine>,
    /// Section total.
    pub total: Money,
}

impl ReportSection {
    /// An empty section.
    #[must_use]
    pub const fn empty(currency: Currency) -> Self {
        Self {
            lines: Vec::new(),
            total: Money::zero(currency),
        }
    }

    /// Returns true when the section has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Balance sheet report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSheetReport {
    /// Cutoff date; `None` covers the whole journal.
    pub as_of: Option<NaiveDate>,
    /// Books currency.
    pub currency: Currency,
    /// Assets section.
    pub assets: ReportSection,
    /// Liabilities section.
    pub liabilities: ReportSection,
    /// Equity section, including current earnings.
    pub equity: ReportSection,
    /// Liabilities plus equity.
    pub liabilities_and_equity: Money,
}

/// Net profit as a percentage of revenue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Margin {
    /// Margin rounded to one decimal place.
    Defined(Decimal),
    /// Revenue was zero.
    Undefined,
}

impl fmt::Display for Margin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Defined(percent) => write!(f, "{percent}%"),
            Self::Undefined => f.write_str("N/A"),
        }
    }
}

/// Profit and loss figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitAndLoss {
    /// Total revenue.
    pub revenue: Money,
    /// Total expenses.
    pub expenses: Money,
    /// Revenue minus expenses.
    pub gross_profit: Money,
    /// Tax rate in percent.
    pub tax_rate: Decimal,
    /// Tax on gross profit.
    pub tax: Money,
    /// Gross profit minus tax.
    pub net_profit: Money,
    /// Net profit over revenue.
    pub margin: Margin,
}

/// Income statement for a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeStatementReport {
    /// Reporting window.
    pub period: DateRange,
    /// Books currency.
    pub currency: Currency,
    /// Revenue by account.
    pub revenue: ReportSection,
    /// Expenses by account.
    pub expenses: ReportSection,
    /// Profit and loss summary.
    pub profit_and_loss: ProfitAndLoss,
}
