//! Point-of-sale billing.
//!
//! This module provides:
//! - A price catalog with case-insensitive lookup
//! - Bills with numbered lines and a checked total
//! - Conversion of a bill into a balanced sale transaction
//! - Daily order numbers (`ORD-YYYYMMDD-NNNN`)

pub mod bill;
pub mod catalog;
pub mod error;
pub mod order;

pub use bill::{Bill, BillLine};
pub use catalog::{Catalog, CatalogItem};
pub use error::BillingError;
pub use order::OrderSequence;
