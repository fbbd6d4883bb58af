//! Property-based tests for the journal and projector.
//!
//! - Balance integrity: only balanced input is committed
//! - No drift: incremental turnover equals a fresh fold for every prefix
//! - Deterministic ordering by (date, sequence)

use chrono::{NaiveDate, Utc};
use khata_shared::types::{AccountId, Currency, Money};
use proptest::prelude::*;

use super::error::LedgerError;
use super::journal::Journal;
use super::projector::LedgerProjector;
use super::transaction::NewTransaction;
use super::types::DateRange;
use crate::accounts::{AccountRegistry, AccountType};

/// Strategy to generate positive amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = i64> {
    1i64..1_000_000i64
}

/// A two-sided posting plan: (debit account, credit account, amount, day).
fn transfer_strategy() -> impl Strategy<Value = (usize, usize, i64, u32)> {
    (0usize..5, 0usize..5, positive_amount(), 1u32..=28)
        .prop_filter("accounts must differ", |(d, c, _, _)| d != c)
}

fn chart() -> (AccountRegistry, Vec<AccountId>) {
    let mut registry = AccountRegistry::new();
    let ids = [
        ("Cash Account", AccountType::Asset),
        ("Loan Payable", AccountType::Liability),
        ("Owner's Equity", AccountType::Equity),
        ("Sales Revenue", AccountType::Revenue),
        ("Utilities", AccountType::Expense),
    ]
    .into_iter()
    .map(|(name, account_type)| registry.register(name, account_type).unwrap())
    .collect();
    (registry, ids)
}

fn usd(minor: i64) -> Money {
    Money::from_minor(minor, Currency::Usd)
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 12, day).unwrap()
}

fn commit(
    journal: &mut Journal,
    registry: &AccountRegistry,
    input: NewTransaction,
) -> Result<(), LedgerError> {
    let prepared = journal.prepare(input, registry, Currency::Usd, Utc::now())?;
    journal.append(prepared);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Unbalanced input is rejected and leaves the journal length unchanged.
    #[test]
    fn prop_unbalanced_transaction_rejected(
        debit_amount in positive_amount(),
        credit_amount in positive_amount(),
    ) {
        prop_assume!(debit_amount != credit_amount);
        let (registry, ids) = chart();
        let mut journal = Journal::new();

        let result = commit(
            &mut journal,
            &registry,
            NewTransaction::new(date(1), "Mismatch")
                .debit(ids[4], usd(debit_amount))
                .credit(ids[0], usd(credit_amount)),
        );

        let rejected = matches!(
            result,
            Err(LedgerError::UnbalancedTransaction { debits, credits })
                if debits == usd(debit_amount) && credits == usd(credit_amount)
        );
        prop_assert!(rejected, "Unbalanced transaction should be rejected");
        prop_assert_eq!(journal.len(), 0);
    }

    /// Multi-posting balanced transactions are accepted.
    #[test]
    fn prop_multi_posting_balanced_accepted(
        amount1 in positive_amount(),
        amount2 in positive_amount(),
    ) {
        let (registry, ids) = chart();
        let mut journal = Journal::new();

        commit(
            &mut journal,
            &registry,
            NewTransaction::new(date(1), "Split")
                .debit(ids[0], usd(amount1))
                .debit(ids[4], usd(amount2))
                .credit(ids[3], usd(amount1 + amount2)),
        )
        .unwrap();

        let totals = journal.iter().next().unwrap().totals().unwrap();
        prop_assert!(totals.is_balanced());
    }

    /// For every journal prefix and account, the incrementally maintained
    /// balance equals the balance recomputed from the journal.
    #[test]
    fn prop_no_drift_between_incremental_and_recomputed(
        transfers in prop::collection::vec(transfer_strategy(), 1..25),
    ) {
        let (registry, ids) = chart();
        let mut journal = Journal::new();

        for (debit, credit, amount, day) in transfers {
            commit(
                &mut journal,
                &registry,
                NewTransaction::new(date(day), "Transfer")
                    .debit(ids[debit], usd(amount))
                    .credit(ids[credit], usd(amount)),
            )
            .unwrap();

            let projector = LedgerProjector::new(&registry, &journal, Currency::Usd);
            for &id in &ids {
                prop_assert_eq!(
                    projector.incremental_balance(id).unwrap(),
                    projector.account_balance(id, None).unwrap()
                );
            }
        }
    }

    /// Gross debit turnover equals gross credit turnover after any commits.
    #[test]
    fn prop_turnover_balances(
        transfers in prop::collection::vec(transfer_strategy(), 0..25),
    ) {
        let (registry, ids) = chart();
        let mut journal = Journal::new();
        for (debit, credit, amount, day) in transfers {
            commit(
                &mut journal,
                &registry,
                NewTransaction::new(date(day), "Transfer")
                    .debit(ids[debit], usd(amount))
                    .credit(ids[credit], usd(amount)),
            )
            .unwrap();
        }

        let balances = LedgerProjector::new(&registry, &journal, Currency::Usd)
            .balances(DateRange::all())
            .unwrap();
        let debits: i64 = balances.iter().map(|b| b.totals.debit_total.minor_units()).sum();
        let credits: i64 = balances.iter().map(|b| b.totals.credit_total.minor_units()).sum();
        prop_assert_eq!(debits, credits);
    }

    /// The last ledger line's running balance equals the account balance.
    #[test]
    fn prop_last_ledger_line_equals_balance(
        transfers in prop::collection::vec(transfer_strategy(), 1..25),
    ) {
        let (registry, ids) = chart();
        let mut journal = Journal::new();
        for (debit, credit, amount, day) in transfers {
            commit(
                &mut journal,
                &registry,
                NewTransaction::new(date(day), "Transfer")
                    .debit(ids[debit], usd(amount))
                    .credit(ids[credit], usd(amount)),
            )
            .unwrap();
        }

        let projector = LedgerProjector::new(&registry, &journal, Currency::Usd);
        for &id in &ids {
            let lines = projector.ledger_lines(id).unwrap();
            let balance = projector.account_balance(id, None).unwrap();
            match lines.last() {
                Some(last) => {
                    prop_assert_eq!(last.running_balance, balance);
                }
                None => {
                    prop_assert!(balance.is_zero());
                }
            }
        }
    }

    /// Listings are ordered by (date, sequence) regardless of commit order.
    #[test]
    fn prop_listing_is_chronological(
        days in prop::collection::vec(1u32..=28, 1..20),
    ) {
        let (registry, ids) = chart();
        let mut journal = Journal::new();
        for day in days {
            commit(
                &mut journal,
                &registry,
                NewTransaction::new(date(day), "Sale")
                    .debit(ids[0], usd(100))
                    .credit(ids[3], usd(100)),
            )
            .unwrap();
        }

        let keys: Vec<_> = journal
            .transactions(DateRange::all())
            .map(|tx| (tx.date, tx.sequence))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        prop_assert_eq!(keys, sorted);
    }
}
