//! Amount due tracking.
//!
//! A register of retailer dues with payment terms, settlement and an
//! outstanding/overdue summary.

pub mod error;
pub mod register;
pub mod types;

pub use error::ReceivablesError;
pub use register::AmountDueRegister;
pub use types::{AmountDueRow, AmountDueSummary, DueRecord};
