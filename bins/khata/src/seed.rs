//! Sample data for an empty journal.

use anyhow::Context;
use chrono::NaiveDate;

use khata_core::Books;
use khata_core::accounts::AccountType;
use khata_core::billing::{Bill, Catalog, OrderSequence};
use khata_core::ledger::Posting;
use khata_core::receivables::AmountDueRegister;
use khata_shared::types::{AccountId, Money};

const CHART: &[(&str, AccountType)] = &[
    ("Cash Account", AccountType::Asset),
    ("Bank Account", AccountType::Asset),
    ("Accounts Receivable", AccountType::Asset),
    ("Office Supplies", AccountType::Expense),
    ("Accounts Payable", AccountType::Liability),
    ("Sales Revenue", AccountType::Revenue),
    ("Consulting Revenue", AccountType::Revenue),
    ("Utility Expense", AccountType::Expense),
    ("Software Expense", AccountType::Expense),
    ("Owner's Equity", AccountType::Equity),
];

/// (date, particulars, debit account, credit account, amount in major units)
const JOURNAL: &[(&str, &str, &str, &str, i64)] = &[
    ("2024-12-15", "Owner Investment", "Cash Account", "Owner's Equity", 10_000),
    ("2024-12-16", "Software subscription", "Software Expense", "Cash Account", 299),
    ("2024-12-17", "Consulting fees", "Cash Account", "Consulting Revenue", 3_400),
    ("2024-12-18", "Electricity bill", "Utility Expense", "Bank Account", 890),
    ("2024-12-19", "Sales Revenue - ABC Corp", "Bank Account", "Sales Revenue", 5_200),
    ("2024-12-20", "Office Supplies Purchased", "Office Supplies", "Cash Account", 450),
];

const MENU: &[(&str, i64)] = &[
    ("Tea", 15),
    ("Coffee", 25),
    ("Green Tea", 20),
    ("Cold Coffee", 40),
    ("Snacks", 30),
    ("Samosa", 20),
    ("Sandwich", 50),
    ("Burger", 60),
    ("Pizza Slice", 80),
    ("Juice", 35),
];

const DUES: &[(&str, &str, i64)] = &[
    ("2024-12-01", "ABC Electronics", 12_500),
    ("2024-12-05", "XYZ Supplies Co.", 8_750),
    ("2024-12-10", "Global Tech Ltd.", 23_400),
    ("2024-12-12", "Metro Retailers", 5_600),
    ("2024-12-15", "City Distributors", 18_900),
    ("2024-12-18", "Prime Wholesale", 7_200),
    ("2024-12-20", "Eastern Trading", 15_800),
    ("2024-12-22", "Southern Goods Inc.", 9_300),
];

fn date(s: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("Invalid sample date {s}"))
}

fn account(books: &Books, name: &str) -> anyhow::Result<AccountId> {
    books
        .snapshot()
        .registry()
        .find_by_name(name)
        .map(|a| a.id)
        .with_context(|| format!("Sample account {name} is missing"))
}

/// Registers the sample chart, posts the sample journal and one cash sale.
///
/// Returns the number of transactions posted.
pub fn sample_books(books: &Books) -> anyhow::Result<usize> {
    let currency = books.currency();
    for (name, account_type) in CHART {
        books.register_account(name, *account_type)?;
    }

    for (day, particulars, debit, credit, amount) in JOURNAL {
        let amount = Money::from_major(*amount, currency)?;
        books.post_transaction(
            date(day)?,
            particulars,
            vec![
                Posting::debit(account(books, debit)?, amount),
                Posting::credit(account(books, credit)?, amount),
            ],
        )?;
    }

    let mut catalog = Catalog::new(currency);
    for (name, price) in MENU {
        catalog.add_item(name, Money::from_major(*price, currency)?)?;
    }

    let sale_date = date("2024-12-21")?;
    let mut orders = OrderSequence::new();
    let mut bill = Bill::new(orders.next(sale_date)?, currency);
    bill.add_item(&catalog, "Tea", 2)?;
    bill.add_item(&catalog, "Samosa", 3)?;
    let sale = bill.into_sale(
        account(books, "Cash Account")?,
        account(books, "Sales Revenue")?,
        sale_date,
    )?;
    books.post(sale)?;

    Ok(JOURNAL.len() + 1)
}

/// Records the sample amount-due register.
pub fn sample_dues(register: &mut AmountDueRegister) -> anyhow::Result<()> {
    let currency = register.currency();
    for (day, retailer, amount) in DUES {
        register.record_due(date(day)?, retailer, Money::from_major(*amount, currency)?)?;
    }
    Ok(())
}
