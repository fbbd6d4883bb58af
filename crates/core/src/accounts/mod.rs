//! Chart of accounts.
//!
//! This module provides:
//! - Account types and their normal balance side
//! - The account registry used to validate posting targets

pub mod registry;
pub mod types;

pub use registry::AccountRegistry;
pub use types::{Account, AccountType};
