//! Postings: the debit and credit lines of a transaction.

use khata_shared::types::{AccountId, Money, MoneyError};
use serde::{Deserialize, Serialize};

/// Side of a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Debit entry (increases assets/expenses, decreases liabilities/equity/revenue).
    Debit,
    /// Credit entry (decreases assets/expenses, increases liabilities/equity/revenue).
    Credit,
}

impl EntryType {
    /// The other side.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Debit => Self::Credit,
            Self::Credit => Self::Debit,
        }
    }
}

/// A single posting in a transaction.
///
/// The amount is always strictly positive; the side lives in `entry_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    /// The account affected by this posting.
    pub account_id: AccountId,
    /// Whether this is a debit or credit.
    pub entry_type: EntryType,
    /// Positive amount in the books' currency.
    pub amount: Money,
    /// Optional description for this line item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

impl Posting {
    /// Creates a debit posting.
    #[must_use]
    pub fn debit(account_id: AccountId, amount: Money) -> Self {
        Self {
            account_id,
            entry_type: EntryType::Debit,
            amount,
            memo: None,
        }
    }

    /// Creates a credit posting.
    #[must_use]
    pub fn credit(account_id: AccountId, amount: Money) -> Self {
        Self {
            account_id,
            entry_type: EntryType::Credit,
            amount,
            memo: None,
        }
    }

    /// Attaches a memo.
    #[must_use]
    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    /// Returns the signed amount (positive for debit, negative for credit).
    pub fn signed_amount(&self) -> Result<Money, MoneyError> {
        match self.entry_type {
            EntryType::Debit => Ok(self.amount),
            EntryType::Credit => self.amount.checked_neg(),
        }
    }

    /// Returns `(debit, credit)` amounts with zero on the unused side.
    #[must_use]
    pub fn split(&self) -> (Money, Money) {
        let zero = Money::zero(self.amount.currency());
        match self.entry_type {
            EntryType::Debit => (self.amount, zero),
            EntryType::Credit => (zero, self.amount),
        }
    }

    /// The same posting on the opposite side.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            entry_type: self.entry_type.opposite(),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use khata_shared::types::Currency;

    #[test]
    fn test_signed_amount() {
        let amount = Money::from_minor(45_000, Currency::Usd);
        let account = AccountId::new();
        assert_eq!(Posting::debit(account, amount).signed_amount().unwrap(), amount);
        assert_eq!(
            Posting::credit(account, amount).signed_amount().unwrap().minor_units(),
            -45_000
        );
    }

    #[test]
    fn test_split_and_reverse() {
        let amount = Money::from_minor(890, Currency::Usd);
        let posting = Posting::credit(AccountId::new(), amount).with_memo("Utility bill");
        assert_eq!(posting.split(), (Money::zero(Currency::Usd), amount));

        let reversed = posting.reversed();
        assert_eq!(reversed.entry_type, EntryType::Debit);
        assert_eq!(reversed.amount, amount);
        assert_eq!(reversed.memo.as_deref(), Some("Utility bill"));
    }
}
