//! Core bookkeeping logic for Khata.
//!
//! This crate contains pure bookkeeping logic with ZERO presentation dependencies.
//! All domain types, validation rules, and report calculations live here.
//!
//! # Modules
//!
//! - `accounts` - Chart of accounts
//! - `ledger` - Double-entry journal, balances and persistence
//! - `reports` - Trial balance, balance sheet and income statement
//! - `books` - Thread-safe books with snapshot reads
//! - `dashboard` - Headline figures and recent activity
//! - `receivables` - Amount-due register
//! - `billing` - Item catalog and sales bills

pub mod accounts;
pub mod billing;
pub mod books;
pub mod dashboard;
pub mod ledger;
pub mod receivables;
pub mod reports;

pub use books::{Books, Snapshot};
