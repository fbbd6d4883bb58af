//! Report generation service.
//!
//! Reports are pure functions of account balances. The books feed them a
//! projection taken from one snapshot, so every figure in a report comes
//! from the same committed journal prefix.

use chrono::NaiveDate;
use khata_shared::types::{Currency, Money, MoneyError};
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::error;

use super::error::ReportError;
use super::types::{
    BalanceSheetReport, IncomeStatementReport, Margin, ProfitAndLoss, ReportLine, ReportSection,
    TrialBalanceReport, TrialBalanceRow, TrialBalanceTotals,
};
use crate::accounts::AccountType;
use crate::ledger::{AccountBalance, AccountTotals, DateRange, EntryType};

/// Label of the computed equity line on the balance sheet.
pub const CURRENT_EARNINGS: &str = "Current earnings";

/// Service for generating financial reports.
pub struct ReportService;

impl ReportService {
    /// Builds a trial balance.
    ///
    /// Rows cover active accounts plus inactive accounts that still show
    /// activity up to the cutoff. Each row's net balance sits on exactly one
    /// side: the normal side when non-negative, the opposite side otherwise.
    ///
    /// # Errors
    ///
    /// Returns `OutOfBalance` if turnover or net columns disagree.
    pub fn trial_balance(
        balances: &[AccountBalance],
        currency: Currency,
        as_of: Option<NaiveDate>,
    ) -> Result<TrialBalanceReport, ReportError> {
        let mut rows = Vec::new();
        let mut totals = TrialBalanceTotals {
            debit_turnover: Money::zero(currency),
            credit_turnover: Money::zero(currency),
            debit: Money::zero(currency),
            credit: Money::zero(currency),
        };

        for balance in balances.iter().filter(|b| Self::is_reportable(b)) {
            let row = Self::trial_balance_row(balance)?;
            totals.debit_turnover = totals.debit_turnover.checked_add(row.debit_turnover)?;
            totals.credit_turnover = totals.credit_turnover.checked_add(row.credit_turnover)?;
            if let Some(debit) = row.debit {
                totals.debit = totals.debit.checked_add(debit)?;
            }
            if let Some(credit) = row.credit {
                totals.credit = totals.credit.checked_add(credit)?;
            }
            rows.push(row);
        }

        if totals.debit_turnover != totals.credit_turnover {
            return Err(Self::out_of_balance(
                "Trial balance turnover",
                totals.debit_turnover,
                totals.credit_turnover,
            ));
        }
        if totals.debit != totals.credit {
            return Err(Self::out_of_balance(
                "Trial balance",
                totals.debit,
                totals.credit,
            ));
        }

        Ok(TrialBalanceReport {
            as_of,
            currency,
            rows,
            totals,
        })
    }

    /// Builds a balance sheet.
    ///
    /// There are no closing entries, so revenue minus expenses to date is
    /// shown as a computed "Current earnings" equity line.
    ///
    /// # Errors
    ///
    /// Returns `OutOfBalance` if assets differ from liabilities plus equity.
    pub fn balance_sheet(
        balances: &[AccountBalance],
        currency: Currency,
        as_of: Option<NaiveDate>,
    ) -> Result<BalanceSheetReport, ReportError> {
        let assets = Self::section(balances, AccountType::Asset, currency)?;
        let liabilities = Self::section(balances, AccountType::Liability, currency)?;
        let mut equity = Self::section(balances, AccountType::Equity, currency)?;

        let revenue = Self::type_total(balances, AccountType::Revenue, currency)?;
        let expenses = Self::type_total(balances, AccountType::Expense, currency)?;
        let earnings = revenue.checked_sub(expenses)?;
        equity.total = equity.total.checked_add(earnings)?;
        equity.lines.push(ReportLine {
            account_id: None,
            name: CURRENT_EARNINGS.to_string(),
            amount: earnings,
        });

        let liabilities_and_equity = liabilities.total.checked_add(equity.total)?;
        if assets.total != liabilities_and_equity {
            return Err(Self::out_of_balance(
                "Balance sheet",
                assets.total,
                liabilities_and_equity,
            ));
        }

        Ok(BalanceSheetReport {
            as_of,
            currency,
            assets,
            liabilities,
            equity,
            liabilities_and_equity,
        })
    }

    /// Computes profit and loss.
    ///
    /// - gross profit = revenue - expenses
    /// - tax = gross profit * rate / 100, rounded half away from zero to the
    ///   currency's minor unit
    /// - net profit = gross profit - tax
    /// - margin = net profit / revenue * 100, rounded to one decimal place
    ///
    /// # Errors
    ///
    /// Returns `InvalidTaxRate` for rates outside 0..=100 and
    /// `CurrencyMismatch` if revenue and expenses differ in currency.
    pub fn profit_and_loss(
        revenue: Money,
        expenses: Money,
        tax_rate: Decimal,
    ) -> Result<ProfitAndLoss, ReportError> {
        if tax_rate < Decimal::ZERO || tax_rate > Decimal::ONE_HUNDRED {
            return Err(ReportError::InvalidTaxRate(tax_rate));
        }
        let currency = revenue.currency();
        let gross_profit = revenue.checked_sub(expenses)?;

        let tax_amount = gross_profit
            .to_decimal()
            .checked_mul(tax_rate)
            .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
            .ok_or(MoneyError::Overflow)?;
        let tax = Money::from_decimal_rounded(
            tax_amount,
            currency,
            RoundingStrategy::MidpointAwayFromZero,
        )?;
        let net_profit = gross_profit.checked_sub(tax)?;

        let margin = if revenue.is_zero() {
            Margin::Undefined
        } else {
            let percent = net_profit
                .to_decimal()
                .checked_div(revenue.to_decimal())
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                .ok_or(MoneyError::Overflow)?;
            Margin::Defined(percent.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero))
        };

        Ok(ProfitAndLoss {
            revenue,
            expenses,
            gross_profit,
            tax_rate,
            tax,
            net_profit,
            margin,
        })
    }

    /// Builds an income statement from activity within `period`.
    ///
    /// # Errors
    ///
    /// Same as [`ReportService::profit_and_loss`].
    pub fn income_statement(
        activity: &[AccountBalance],
        currency: Currency,
        period: DateRange,
        tax_rate: Decimal,
    ) -> Result<IncomeStatementReport, ReportError> {
        let revenue = Self::section(activity, AccountType::Revenue, currency)?;
        let expenses = Self::section(activity, AccountType::Expense, currency)?;
        let profit_and_loss = Self::profit_and_loss(revenue.total, expenses.total, tax_rate)?;

        Ok(IncomeStatementReport {
            period,
            currency,
            revenue,
            expenses,
            profit_and_loss,
        })
    }

    /// Validates a reporting period.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` if `from` is after `to`.
    pub fn period(
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<DateRange, ReportError> {
        Ok(DateRange::new(from, to)?)
    }

    fn is_reportable(balance: &AccountBalance) -> bool {
        balance.is_active || !balance.totals.is_empty()
    }

    fn trial_balance_row(balance: &AccountBalance) -> Result<TrialBalanceRow, ReportError> {
        let AccountTotals {
            debit_total,
            credit_total,
        } = balance.totals;
        let normal_side = balance.account_type.normal_balance().increasing_side();
        let (side, amount) = if balance.balance.is_negative() {
            (normal_side.opposite(), balance.balance.checked_abs()?)
        } else {
            (normal_side, balance.balance)
        };
        let (debit, credit) = match side {
            EntryType::Debit => (Some(amount), None),
            EntryType::Credit => (None, Some(amount)),
        };

        Ok(TrialBalanceRow {
            account_id: balance.account_id,
            name: balance.name.clone(),
            account_type: balance.account_type,
            is_active: balance.is_active,
            debit_turnover: debit_total,
            credit_turnover: credit_total,
            debit,
            credit,
        })
    }

    fn section(
        balances: &[AccountBalance],
        account_type: AccountType,
        currency: Currency,
    ) -> Result<ReportSection, ReportError> {
        let mut section = ReportSection::empty(currency);
        for balance in balances
            .iter()
            .filter(|b| b.account_type == account_type && Self::is_reportable(b))
        {
            section.total = section.total.checked_add(balance.balance)?;
            section.lines.push(ReportLine {
                account_id: Some(balance.account_id),
                name: balance.name.clone(),
                amount: balance.balance,
            });
        }
        Ok(section)
    }

    fn type_total(
        balances: &[AccountBalance],
        account_type: AccountType,
        currency: Currency,
    ) -> Result<Money, ReportError> {
        let amounts = balances
            .iter()
            .filter(|b| b.account_type == account_type)
            .map(|b| b.balance);
        Ok(Money::checked_sum(amounts, currency)?)
    }

    fn out_of_balance(report: &'static str, debits: Money, credits: Money) -> ReportError {
        error!(
            report,
            debits = %debits,
            credits = %credits,
            "Integrity violation: report totals disagree"
        );
        ReportError::OutOfBalance {
            report,
            debits,
            credits,
        }
    }
}
