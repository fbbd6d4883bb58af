//! Khata demo binary.
//!
//! Opens the configured books, seeds sample data into an empty journal and
//! prints the reports as JSON.

mod seed;

use anyhow::Context;
use chrono::Utc;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use khata_core::Books;
use khata_core::dashboard::DashboardService;
use khata_core::ledger::DateRange;
use khata_core::receivables::AmountDueRegister;
use khata_shared::AppConfig;

fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("KHATA_LOG")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| "khata=info,khata_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;
    let books = Books::from_config(&config).context("Failed to open books")?;
    info!(
        currency = %books.currency(),
        transactions = books.journal_len(),
        "Books opened"
    );

    if books.journal_len() == 0 {
        let seeded = seed::sample_books(&books)?;
        info!(transactions = seeded, "Seeded sample books");
    }

    let mut dues = AmountDueRegister::new(books.currency(), config.receivables.payment_terms_days);
    seed::sample_dues(&mut dues)?;

    let snapshot = books.snapshot();
    let as_of = snapshot
        .list_transactions(DateRange::all())
        .next_back()
        .map(|tx| tx.date);

    let output = serde_json::json!({
        "trial_balance": snapshot.trial_balance(as_of)?,
        "balance_sheet": snapshot.balance_sheet(as_of)?,
        "income_statement": snapshot.income_statement(None, as_of, config.books.tax_rate)?,
        "dashboard": DashboardService::summarize(
            &snapshot,
            as_of,
            config.dashboard.recent_activity_limit,
            Some(&dues),
        )?,
        "amount_due": dues.summary(as_of.unwrap_or_else(|| Utc::now().date_naive()))?,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);

    Ok(())
}
