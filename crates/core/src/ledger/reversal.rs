//! Reversing transactions.
//!
//! Committed transactions are immutable; a correction is a new transaction
//! with every side swapped that links back to the original.

use chrono::NaiveDate;

use super::entry::Posting;
use super::transaction::{NewTransaction, Transaction};

/// Stateless service for creating reversing entries.
pub struct ReversalService;

impl ReversalService {
    /// Builds the reversal of `original`, booked on `date`.
    ///
    /// For each original posting:
    /// - Debits become credits and credits become debits
    /// - Account and amount are preserved
    /// - Memo is prefixed with "Reversal: "
    #[must_use]
    pub fn reversing_transaction(
        original: &Transaction,
        date: NaiveDate,
        reason: &str,
    ) -> NewTransaction {
        let postings = original
            .postings
            .iter()
            .map(|posting| Posting {
                memo: Some(match &posting.memo {
                    Some(memo) => format!("Reversal: {memo}"),
                    None => "Reversal".to_string(),
                }),
                ..posting.reversed()
            })
            .collect();

        let reason = reason.trim();
        let description = if reason.is_empty() {
            format!("Reversal of {}", original.description)
        } else {
            format!("Reversal of {}. Reason: {reason}", original.description)
        };

        NewTransaction {
            date,
            description,
            postings,
            reverses: Some(original.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::entry::EntryType;
    use chrono::Utc;
    use khata_shared::types::{AccountId, Currency, Money, TransactionId};

    fn original() -> Transaction {
        let amount = Money::from_minor(45_000, Currency::Usd);
        Transaction {
            id: TransactionId::new(),
            sequence: 2,
            date: NaiveDate::from_ymd_opt(2024, 12, 18).unwrap(),
            description: "Office Supplies".to_string(),
            postings: vec![
                Posting::debit(AccountId::new(), amount).with_memo("Paper"),
                Posting::credit(AccountId::new(), amount),
            ],
            reverses: None,
            committed_at: Utc::now(),
        }
    }

    #[test]
    fn test_sides_are_swapped() {
        let original = original();
        let date = NaiveDate::from_ymd_opt(2024, 12, 19).unwrap();
        let reversal = ReversalService::reversing_transaction(&original, date, "Wrong vendor");

        assert_eq!(reversal.reverses, Some(original.id));
        assert_eq!(reversal.date, date);
        assert_eq!(
            reversal.description,
            "Reversal of Office Supplies. Reason: Wrong vendor"
        );
        for (before, after) in original.postings.iter().zip(&reversal.postings) {
            assert_eq!(after.account_id, before.account_id);
            assert_eq!(after.amount, before.amount);
            assert_eq!(after.entry_type, before.entry_type.opposite());
        }
        assert_eq!(reversal.postings[0].entry_type, EntryType::Credit);
        assert_eq!(reversal.postings[0].memo.as_deref(), Some("Reversal: Paper"));
    }

    #[test]
    fn test_blank_reason() {
        let original = original();
        let reversal = ReversalService::reversing_transaction(&original, original.date, "  ");
        assert_eq!(reversal.description, "Reversal of Office Supplies");
    }
}
