//! Business rule validation for transactions.
//!
//! Checks run in a fixed order so the first violated rule is the one
//! reported: particulars, posting count, per-posting rules, then balance.

use khata_shared::types::Currency;

use super::entry::Posting;
use super::error::LedgerError;
use super::transaction::sum_postings;
use super::types::TransactionTotals;
use crate::accounts::AccountRegistry;

/// Validates a transaction's postings against the chart of accounts.
///
/// # Errors
///
/// Returns the first violated rule:
/// - `EmptyDescription` for blank particulars
/// - `InsufficientPostings` for fewer than 2 postings
/// - `CurrencyMismatch` for postings outside the books' currency
/// - `NonPositiveAmount` for zero or negative amounts
/// - `AccountNotFound` / `AccountInactive` for unusable accounts
/// - `UnbalancedTransaction` when debits != credits
pub fn validate_transaction(
    description: &str,
    postings: &[Posting],
    registry: &AccountRegistry,
    currency: Currency,
) -> Result<TransactionTotals, LedgerError> {
    if description.trim().is_empty() {
        return Err(LedgerError::EmptyDescription);
    }

    if postings.len() < 2 {
        return Err(LedgerError::InsufficientPostings(postings.len()));
    }

    for posting in postings {
        validate_posting(posting, registry, currency)?;
    }

    let totals = sum_postings(postings, currency)?;
    if !totals.is_balanced() {
        return Err(LedgerError::UnbalancedTransaction {
            debits: totals.debit,
            credits: totals.credit,
        });
    }

    Ok(totals)
}

fn validate_posting(
    posting: &Posting,
    registry: &AccountRegistry,
    currency: Currency,
) -> Result<(), LedgerError> {
    if posting.amount.currency() != currency {
        return Err(LedgerError::CurrencyMismatch {
            expected: currency,
            found: posting.amount.currency(),
        });
    }
    if !posting.amount.is_positive() {
        return Err(LedgerError::NonPositiveAmount(posting.amount));
    }
    registry.ensure_postable(posting.account_id)?;
    Ok(())
}
