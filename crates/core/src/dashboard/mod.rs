//! Dashboard metrics and activity types.
//!
//! This module provides the dashboard summary:
//! - Key financial totals
//! - Recent activity
//! - Outstanding dues

pub mod service;
pub mod types;

pub use service::DashboardService;
pub use types::*;
