//! Application configuration management.

use std::path::PathBuf;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::types::Currency;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Bookkeeping defaults.
    #[serde(default)]
    pub books: BooksConfig,
    /// Journal persistence.
    #[serde(default)]
    pub journal: JournalConfig,
    /// Amount-due tracking.
    #[serde(default)]
    pub receivables: ReceivablesConfig,
    /// Dashboard summary.
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// Bookkeeping configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BooksConfig {
    /// Functional currency every posting must use.
    #[serde(default = "default_currency")]
    pub currency: Currency,
    /// Default income tax rate in percent for profit and loss.
    #[serde(default = "default_tax_rate")]
    pub tax_rate: Decimal,
}

fn default_currency() -> Currency {
    Currency::Usd
}

fn default_tax_rate() -> Decimal {
    Decimal::from(25)
}

impl Default for BooksConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            tax_rate: default_tax_rate(),
        }
    }
}

/// Journal persistence configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JournalConfig {
    /// JSON-lines journal file; the journal lives in memory when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Amount-due configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ReceivablesConfig {
    /// Days after the invoice date before an amount is overdue.
    #[serde(default = "default_payment_terms_days")]
    pub payment_terms_days: u32,
}

fn default_payment_terms_days() -> u32 {
    0
}

impl Default for ReceivablesConfig {
    fn default() -> Self {
        Self {
            payment_terms_days: default_payment_terms_days(),
        }
    }
}

/// Dashboard configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// Number of recent transactions shown.
    #[serde(default = "default_recent_activity_limit")]
    pub recent_activity_limit: usize,
}

fn default_recent_activity_limit() -> usize {
    5
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            recent_activity_limit: default_recent_activity_limit(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones winning: `config/default`, `config/{RUN_MODE}`,
    /// then `KHATA__SECTION__KEY` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("KHATA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
