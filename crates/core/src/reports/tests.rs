//! Tests for the report service.

use khata_shared::types::{AccountId, Currency, Money};
use proptest::prelude::*;
use rust_decimal_macros::dec;

use super::error::ReportError;
use super::service::{CURRENT_EARNINGS, ReportService};
use super::types::Margin;
use crate::accounts::AccountType;
use crate::ledger::{AccountBalance, AccountTotals};

fn usd(minor: i64) -> Money {
    Money::from_minor(minor, Currency::Usd)
}

fn balance(name: &str, account_type: AccountType, debit: i64, credit: i64) -> AccountBalance {
    let totals = AccountTotals {
        debit_total: usd(debit),
        credit_total: usd(credit),
    };
    AccountBalance {
        account_id: AccountId::new(),
        name: name.to_string(),
        account_type,
        is_active: true,
        totals,
        balance: totals.balance(account_type.normal_balance()).unwrap(),
    }
}

/// Owner investment $10,000 then office supplies $450 paid in cash.
fn scenario() -> Vec<AccountBalance> {
    vec![
        balance("Cash Account", AccountType::Asset, 1_000_000, 45_000),
        balance("Owner's Equity", AccountType::Equity, 0, 1_000_000),
        balance("Office Supplies", AccountType::Expense, 45_000, 0),
    ]
}

#[test]
fn test_trial_balance_scenario() {
    let report = ReportService::trial_balance(&scenario(), Currency::Usd, None).unwrap();

    assert_eq!(report.totals.debit_turnover, usd(1_045_000));
    assert_eq!(report.totals.credit_turnover, usd(1_045_000));
    assert_eq!(report.totals.debit_turnover.to_string(), "$10,450.00");
    assert_eq!(report.totals.debit, usd(1_000_000));
    assert_eq!(report.totals.credit, usd(1_000_000));
    assert!(report.totals.is_balanced());

    let cash = &report.rows[0];
    assert_eq!(cash.debit, Some(usd(955_000)));
    assert_eq!(cash.credit, None);
    let equity = &report.rows[1];
    assert_eq!(equity.debit, None);
    assert_eq!(equity.credit, Some(usd(1_000_000)));
}

#[test]
fn test_trial_balance_contra_balance_on_opposite_side() {
    let balances = vec![
        balance("Cash Account", AccountType::Asset, 0, 20_000),
        balance("Loan Payable", AccountType::Liability, 0, 0),
        balance("Utilities", AccountType::Expense, 20_000, 0),
    ];
    let report = ReportService::trial_balance(&balances, Currency::Usd, None).unwrap();
    assert_eq!(report.rows[0].debit, None);
    assert_eq!(report.rows[0].credit, Some(usd(20_000)));
    assert_eq!(report.rows[1].credit, Some(usd(0)));
}

#[test]
fn test_trial_balance_out_of_balance_is_surfaced() {
    let balances = vec![
        balance("Cash Account", AccountType::Asset, 45_000, 0),
        balance("Office Supplies", AccountType::Expense, 0, 44_500),
    ];
    let err = ReportService::trial_balance(&balances, Currency::Usd, None).unwrap_err();
    assert!(err.is_integrity_violation());
    assert_eq!(err.error_code(), "OUT_OF_BALANCE");
}

#[test]
fn test_trial_balance_skips_idle_inactive_accounts() {
    let mut closed = balance("Old Bank", AccountType::Asset, 0, 0);
    closed.is_active = false;
    let mut settled = balance("Old Loan", AccountType::Liability, 500, 500);
    settled.is_active = false;

    let mut balances = scenario();
    balances.push(closed);
    balances.push(settled);

    let report = ReportService::trial_balance(&balances, Currency::Usd, None).unwrap();
    let names: Vec<_> = report.rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Cash Account", "Owner's Equity", "Office Supplies", "Old Loan"]
    );
}

#[test]
fn test_empty_books_trial_balance() {
    let report = ReportService::trial_balance(&[], Currency::Usd, None).unwrap();
    assert!(report.rows.is_empty());
    assert!(report.totals.is_balanced());
}

#[test]
fn test_balance_sheet_includes_current_earnings() {
    let report = ReportService::balance_sheet(&scenario(), Currency::Usd, None).unwrap();

    assert_eq!(report.assets.total, usd(955_000));
    assert!(report.liabilities.is_empty());
    assert_eq!(report.equity.total, usd(955_000));
    assert_eq!(report.liabilities_and_equity, usd(955_000));

    let earnings = report.equity.lines.last().unwrap();
    assert_eq!(earnings.name, CURRENT_EARNINGS);
    assert_eq!(earnings.account_id, None);
    assert_eq!(earnings.amount, usd(-45_000));
}

#[test]
fn test_balance_sheet_out_of_balance() {
    let balances = vec![
        balance("Cash Account", AccountType::Asset, 1_000, 0),
        balance("Owner's Equity", AccountType::Equity, 0, 900),
    ];
    assert!(matches!(
        ReportService::balance_sheet(&balances, Currency::Usd, None),
        Err(ReportError::OutOfBalance { .. })
    ));
}

#[test]
fn test_profit_and_loss_dashboard_figures() {
    let pnl = ReportService::profit_and_loss(usd(285_000), usd(142_000), dec!(25)).unwrap();
    assert_eq!(pnl.gross_profit, usd(143_000));
    assert_eq!(pnl.tax, usd(35_750));
    assert_eq!(pnl.net_profit, usd(107_250));
    assert_eq!(pnl.margin, Margin::Defined(dec!(37.6)));
    assert_eq!(pnl.margin.to_string(), "37.6%");
}

#[test]
fn test_profit_and_loss_zero_revenue() {
    let pnl = ReportService::profit_and_loss(usd(0), usd(100), dec!(25)).unwrap();
    assert_eq!(pnl.gross_profit, usd(-100));
    assert_eq!(pnl.tax, usd(-25));
    assert_eq!(pnl.net_profit, usd(-75));
    assert_eq!(pnl.margin, Margin::Undefined);
}

#[test]
fn test_profit_and_loss_rounds_tax_half_away_from_zero() {
    // 0.10 * 25% = 0.025, rounded to 0.03
    let pnl = ReportService::profit_and_loss(usd(10), usd(0), dec!(25)).unwrap();
    assert_eq!(pnl.tax, usd(3));
    assert_eq!(pnl.net_profit, usd(7));

    let loss = ReportService::profit_and_loss(usd(0), usd(10), dec!(25)).unwrap();
    assert_eq!(loss.tax, usd(-3));
}

#[test]
fn test_profit_and_loss_rejects_bad_input() {
    assert!(matches!(
        ReportService::profit_and_loss(usd(100), usd(0), dec!(101)),
        Err(ReportError::InvalidTaxRate(_))
    ));
    assert!(matches!(
        ReportService::profit_and_loss(usd(100), usd(0), dec!(-1)),
        Err(ReportError::InvalidTaxRate(_))
    ));
    assert!(matches!(
        ReportService::profit_and_loss(
            usd(100),
            Money::from_minor(100, Currency::Eur),
            dec!(25)
        ),
        Err(ReportError::CurrencyMismatch {
            expected: Currency::Usd,
            found: Currency::Eur,
        })
    ));
}

#[test]
fn test_income_statement_sections() {
    let activity = vec![
        balance("Cash Account", AccountType::Asset, 285_000, 142_000),
        balance("Sales Revenue", AccountType::Revenue, 0, 285_000),
        balance("Rent", AccountType::Expense, 100_000, 0),
        balance("Utilities", AccountType::Expense, 42_000, 0),
    ];
    let period = ReportService::period(None, None).unwrap();
    let report =
        ReportService::income_statement(&activity, Currency::Usd, period, dec!(25)).unwrap();

    assert_eq!(report.revenue.lines.len(), 1);
    assert_eq!(report.expenses.lines.len(), 2);
    assert_eq!(report.expenses.total, usd(142_000));
    assert_eq!(report.profit_and_loss.net_profit, usd(107_250));
}

#[test]
fn test_period_validation() {
    let from = chrono::NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
    let to = chrono::NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
    assert!(matches!(
        ReportService::period(Some(from), Some(to)),
        Err(ReportError::InvalidDateRange { .. })
    ));
}

/// Strategy for balanced transfers between five accounts of every type.
fn transfers() -> impl Strategy<Value = Vec<(usize, usize, i64)>> {
    prop::collection::vec(
        (0usize..5, 0usize..5, 1i64..1_000_000).prop_filter("distinct", |(d, c, _)| d != c),
        0..30,
    )
}

fn fold(transfers: &[(usize, usize, i64)]) -> Vec<AccountBalance> {
    let chart = [
        ("Cash Account", AccountType::Asset),
        ("Loan Payable", AccountType::Liability),
        ("Owner's Equity", AccountType::Equity),
        ("Sales Revenue", AccountType::Revenue),
        ("Utilities", AccountType::Expense),
    ];
    let mut debits = [0i64; 5];
    let mut credits = [0i64; 5];
    for &(d, c, amount) in transfers {
        debits[d] += amount;
        credits[c] += amount;
    }
    chart
        .iter()
        .enumerate()
        .map(|(i, (name, account_type))| balance(name, *account_type, debits[i], credits[i]))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Any set of balanced transfers yields a balanced trial balance.
    #[test]
    fn prop_trial_balance_balanced(transfers in transfers()) {
        let report = ReportService::trial_balance(&fold(&transfers), Currency::Usd, None).unwrap();
        prop_assert!(report.totals.is_balanced());
        prop_assert_eq!(report.totals.debit_turnover, report.totals.credit_turnover);
        prop_assert_eq!(report.totals.debit, report.totals.credit);
    }

    /// Every trial balance row carries its net balance on exactly one side.
    #[test]
    fn prop_net_on_exactly_one_side(transfers in transfers()) {
        let report = ReportService::trial_balance(&fold(&transfers), Currency::Usd, None).unwrap();
        for row in &report.rows {
            prop_assert!(row.debit.is_some() != row.credit.is_some());
        }
    }

    /// Assets always equal liabilities plus equity including current earnings.
    #[test]
    fn prop_balance_sheet_balanced(transfers in transfers()) {
        let report = ReportService::balance_sheet(&fold(&transfers), Currency::Usd, None).unwrap();
        prop_assert_eq!(report.assets.total, report.liabilities_and_equity);
    }

    /// Net profit is gross profit minus tax, exactly.
    #[test]
    fn prop_net_equals_gross_minus_tax(
        revenue in 0i64..100_000_000,
        expenses in 0i64..100_000_000,
        rate in 0u32..=100,
    ) {
        let pnl = ReportService::profit_and_loss(
            usd(revenue),
            usd(expenses),
            rust_decimal::Decimal::from(rate),
        )
        .unwrap();
        prop_assert_eq!(pnl.gross_profit.minor_units(), revenue - expenses);
        prop_assert_eq!(
            pnl.net_profit.minor_units(),
            pnl.gross_profit.minor_units() - pnl.tax.minor_units()
        );
        prop_assert_eq!(revenue == 0, pnl.margin == Margin::Undefined);
    }
}
