//! Account balance calculations.
//!
//! - Asset/Expense: balance += debit - credit (debit-normal)
//! - Liability/Equity/Revenue: balance += credit - debit (credit-normal)

use khata_shared::types::{AccountId, Currency, Money, MoneyError};
use serde::{Deserialize, Serialize};

use super::entry::{EntryType, Posting};
use crate::accounts::AccountType;

/// Side on which an account naturally increases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalBalance {
    /// Debit-normal accounts (Asset, Expense)
    DebitNormal,
    /// Credit-normal accounts (Liability, Equity, Revenue)
    CreditNormal,
}

impl NormalBalance {
    /// The entry side that increases the balance.
    #[must_use]
    pub const fn increasing_side(self) -> EntryType {
        match self {
            Self::DebitNormal => EntryType::Debit,
            Self::CreditNormal => EntryType::Credit,
        }
    }

    /// Calculates the balance change for a debit/credit pair.
    pub fn calculate_balance_change(self, debit: Money, credit: Money) -> Result<Money, MoneyError> {
        match self {
            Self::DebitNormal => debit.checked_sub(credit),
            Self::CreditNormal => credit.checked_sub(debit),
        }
    }

    /// Balance change caused by a single posting.
    pub fn posting_change(self, posting: &Posting) -> Result<Money, MoneyError> {
        let (debit, credit) = posting.split();
        self.calculate_balance_change(debit, credit)
    }
}

/// Debit and credit turnover of one account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountTotals {
    /// Total debit amount.
    pub debit_total: Money,
    /// Total credit amount.
    pub credit_total: Money,
}

impl AccountTotals {
    /// Zero turnover.
    #[must_use]
    pub const fn zero(currency: Currency) -> Self {
        Self {
            debit_total: Money::zero(currency),
            credit_total: Money::zero(currency),
        }
    }

    /// Adds a posting to the turnover.
    pub fn with_posting(self, posting: &Posting) -> Result<Self, MoneyError> {
        let mut next = self;
        match posting.entry_type {
            EntryType::Debit => next.debit_total = next.debit_total.checked_add(posting.amount)?,
            EntryType::Credit => {
                next.credit_total = next.credit_total.checked_add(posting.amount)?;
            }
        }
        Ok(next)
    }

    /// Net balance on the given normal side.
    pub fn balance(&self, normal: NormalBalance) -> Result<Money, MoneyError> {
        normal.calculate_balance_change(self.debit_total, self.credit_total)
    }

    /// Returns true when nothing has been posted.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.debit_total.is_zero() && self.credit_total.is_zero()
    }
}

/// Account balance at a point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    /// The account ID.
    pub account_id: AccountId,
    /// Account name.
    pub name: String,
    /// Account classification.
    pub account_type: AccountType,
    /// Whether the account is active.
    pub is_active: bool,
    /// Debit and credit turnover.
    pub totals: AccountTotals,
    /// Net balance (calculated based on account type).
    pub balance: Money,
}

/// Running balance information for a ledger line.
///
/// `current_balance[N] = previous_balance[N] + change` and
/// `previous_balance[N] = current_balance[N-1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningBalance {
    /// Line number on the account (starts at 1).
    pub line: u64,
    /// Balance before this line.
    pub previous_balance: Money,
    /// Balance after this line.
    pub current_balance: Money,
}

impl RunningBalance {
    /// Running balance for the first line on an account.
    #[must_use]
    pub fn first_entry(balance_change: Money) -> Self {
        Self {
            line: 1,
            previous_balance: Money::zero(balance_change.currency()),
            current_balance: balance_change,
        }
    }

    /// Running balance after the previous line.
    pub fn next_entry(previous: &Self, balance_change: Money) -> Result<Self, MoneyError> {
        Ok(Self {
            line: previous.line + 1,
            previous_balance: previous.current_balance,
            current_balance: previous.current_balance.checked_add(balance_change)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn usd(minor: i64) -> Money {
        Money::from_minor(minor, Currency::Usd)
    }

    /// Balance changes can be positive or negative.
    fn balance_change_strategy() -> impl Strategy<Value = Money> {
        (-100_000i64..100_000i64).prop_map(usd)
    }

    fn balance_changes_strategy(max_len: usize) -> impl Strategy<Value = Vec<Money>> {
        prop::collection::vec(balance_change_strategy(), 1..=max_len)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The previous balance of line N is the current balance of line N-1.
        #[test]
        fn prop_previous_equals_prior_current(
            change1 in balance_change_strategy(),
            change2 in balance_change_strategy(),
        ) {
            let rb1 = RunningBalance::first_entry(change1);
            let rb2 = RunningBalance::next_entry(&rb1, change2).unwrap();

            prop_assert_eq!(rb2.previous_balance, rb1.current_balance);
            prop_assert_eq!(
                rb2.current_balance.minor_units(),
                rb2.previous_balance.minor_units() + change2.minor_units()
            );
        }

        /// The final balance equals the sum of all changes.
        #[test]
        fn prop_final_balance_equals_sum_of_changes(
            changes in balance_changes_strategy(20),
        ) {
            let mut current = RunningBalance::first_entry(changes[0]);
            for &change in &changes[1..] {
                current = RunningBalance::next_entry(&current, change).unwrap();
            }
            let expected: i64 = changes.iter().map(Money::minor_units).sum();

            prop_assert_eq!(current.current_balance.minor_units(), expected);
            prop_assert_eq!(current.line as usize, changes.len());
        }

        /// Turnover folded posting by posting matches the net balance.
        #[test]
        fn prop_totals_balance_matches_signed_sum(
            amounts in prop::collection::vec((1i64..1_000_000, any::<bool>()), 1..30),
        ) {
            let account = AccountId::new();
            let postings: Vec<Posting> = amounts
                .iter()
                .map(|&(minor, is_debit)| {
                    if is_debit {
                        Posting::debit(account, usd(minor))
                    } else {
                        Posting::credit(account, usd(minor))
                    }
                })
                .collect();

            let totals = postings
                .iter()
                .try_fold(AccountTotals::zero(Currency::Usd), |t, p| t.with_posting(p))
                .unwrap();
            let signed: i64 = postings
                .iter()
                .map(|p| p.signed_amount().unwrap().minor_units())
                .sum();

            prop_assert_eq!(
                totals.balance(NormalBalance::DebitNormal).unwrap().minor_units(),
                signed
            );
            prop_assert_eq!(
                totals.balance(NormalBalance::CreditNormal).unwrap().minor_units(),
                -signed
            );
        }
    }

    #[test]
    fn test_balance_change_by_side() {
        assert_eq!(
            NormalBalance::DebitNormal
                .calculate_balance_change(usd(1_000), usd(300))
                .unwrap(),
            usd(700)
        );
        assert_eq!(
            NormalBalance::CreditNormal
                .calculate_balance_change(usd(1_000), usd(300))
                .unwrap(),
            usd(-700)
        );
    }

    #[test]
    fn test_running_balance_overflow() {
        let first = RunningBalance::first_entry(usd(i64::MAX));
        assert_eq!(
            RunningBalance::next_entry(&first, usd(1)),
            Err(MoneyError::Overflow)
        );
    }
}
