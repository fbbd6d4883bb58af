//! Shared types and configuration for Khata.
//!
//! This crate provides common types used across all other crates:
//! - Money in exact integer minor units
//! - Typed IDs for type-safe entity references
//! - Pagination types for listings
//! - Configuration management

pub mod config;
pub mod types;

pub use config::AppConfig;
