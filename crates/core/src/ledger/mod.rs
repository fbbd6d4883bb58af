//! Double-entry bookkeeping logic.
//!
//! This module implements the core ledger functionality:
//! - Postings (debits and credits)
//! - Transaction aggregates
//! - Balance calculations
//! - Business rule validation
//! - The append-only journal and its persistence
//! - Ledger projections (balances, ledger lines)
//! - Reversing transactions
//! - Error types for ledger operations

pub mod balance;
pub mod entry;
pub mod error;
pub mod journal;
pub mod projector;
pub mod reversal;
pub mod store;
pub mod transaction;
pub mod types;
pub mod validation;

#[cfg(test)]
mod journal_props;

pub use balance::{AccountBalance, AccountTotals, NormalBalance, RunningBalance};
pub use entry::{EntryType, Posting};
pub use error::LedgerError;
pub use journal::{Journal, PreparedTransaction};
pub use projector::{LedgerLine, LedgerProjector};
pub use reversal::ReversalService;
pub use store::{BookRecord, JournalStore, JsonLinesStore, MemoryStore, StoreError};
pub use transaction::{NewTransaction, Transaction};
pub use types::{DateRange, TransactionTotals};
pub use validation::validate_transaction;
