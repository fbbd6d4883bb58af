//! Bills and their conversion into sale transactions.

use chrono::NaiveDate;
use khata_shared::types::{AccountId, Currency, Money, MoneyError};
use serde::{Deserialize, Serialize};

use super::catalog::Catalog;
use super::error::BillingError;
use crate::ledger::{NewTransaction, Posting};

/// One numbered line on a bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillLine {
    /// Line number, starting at 1.
    pub line_no: u32,
    /// Item name as it appears in the catalog.
    pub item_name: String,
    /// Quantity sold.
    pub quantity: u32,
    /// Unit price.
    pub unit_price: Money,
    /// Quantity times unit price.
    pub amount: Money,
}

/// An open bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    /// Order number.
    pub order_number: String,
    /// Bill currency.
    pub currency: Currency,
    /// Lines in the order they were added.
    pub lines: Vec<BillLine>,
}

impl Bill {
    /// Starts an empty bill.
    #[must_use]
    pub fn new(order_number: impl Into<String>, currency: Currency) -> Self {
        Self {
            order_number: order_number.into(),
            currency,
            lines: Vec::new(),
        }
    }

    /// Adds `quantity` of a catalog item.
    ///
    /// # Errors
    ///
    /// Returns `InvalidQuantity` for quantities below 1, `UnknownItem` for
    /// items missing from the catalog, or `Amount` if the line overflows.
    pub fn add_item(
        &mut self,
        catalog: &Catalog,
        item_name: &str,
        quantity: i64,
    ) -> Result<&BillLine, BillingError> {
        let qty = u32::try_from(quantity)
            .ok()
            .filter(|q| *q > 0)
            .ok_or(BillingError::InvalidQuantity(quantity))?;
        let item = catalog
            .find(item_name)
            .ok_or_else(|| BillingError::UnknownItem(item_name.trim().to_string()))?;
        if item.price.currency() != self.currency {
            return Err(BillingError::CurrencyMismatch {
                expected: self.currency,
                found: item.price.currency(),
            });
        }

        let amount = item
            .price
            .minor_units()
            .checked_mul(i64::from(qty))
            .map(|minor| Money::from_minor(minor, self.currency))
            .ok_or(MoneyError::Overflow)?;
        let line_no = u32::try_from(self.lines.len() + 1).unwrap_or(u32::MAX);

        self.lines.push(BillLine {
            line_no,
            item_name: item.name.clone(),
            quantity: qty,
            unit_price: item.price,
            amount,
        });
        Ok(&self.lines[self.lines.len() - 1])
    }

    /// Sum of all line amounts.
    ///
    /// # Errors
    ///
    /// Returns `Amount` if the total overflows.
    pub fn total(&self) -> Result<Money, BillingError> {
        Ok(Money::checked_sum(
            self.lines.iter().map(|l| l.amount),
            self.currency,
        )?)
    }

    /// Returns true when no item has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Converts the bill into a cash sale.
    ///
    /// Debits `cash` with the total and credits `revenue` once per line, each
    /// credit carrying the item and quantity as its memo.
    ///
    /// # Errors
    ///
    /// Returns `EmptyBill` for a bill without lines.
    pub fn into_sale(
        self,
        cash: AccountId,
        revenue: AccountId,
        date: NaiveDate,
    ) -> Result<NewTransaction, BillingError> {
        if self.lines.is_empty() {
            return Err(BillingError::EmptyBill);
        }
        let total = self.total()?;
        let sale = NewTransaction::new(date, format!("Sale {}", self.order_number))
            .posting(Posting::debit(cash, total).with_memo(self.order_number.clone()));

        Ok(self.lines.into_iter().fold(sale, |sale, line| {
            sale.posting(
                Posting::credit(revenue, line.amount)
                    .with_memo(format!("{} x {}", line.item_name, line.quantity)),
            )
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::EntryType;

    fn inr(major: i64) -> Money {
        Money::from_major(major, Currency::Inr).unwrap()
    }

    fn menu() -> Catalog {
        let mut catalog = Catalog::new(Currency::Inr);
        catalog.add_item("Tea", inr(15)).unwrap();
        catalog.add_item("Samosa", inr(20)).unwrap();
        catalog
    }

    #[test]
    fn test_lines_are_numbered_and_totalled() {
        let catalog = menu();
        let mut bill = Bill::new("ORD-20241218-0001", Currency::Inr);
        bill.add_item(&catalog, "tea", 2).unwrap();
        let line = bill.add_item(&catalog, "Samosa", 3).unwrap();
        assert_eq!(line.line_no, 2);
        assert_eq!(line.amount, inr(60));

        assert_eq!(bill.lines[0].item_name, "Tea");
        assert_eq!(bill.total().unwrap(), inr(90));
    }

    #[test]
    fn test_rejects_unknown_items_and_bad_quantities() {
        let catalog = menu();
        let mut bill = Bill::new("ORD-20241218-0001", Currency::Inr);
        assert_eq!(
            bill.add_item(&catalog, "Pizza", 1).unwrap_err(),
            BillingError::UnknownItem("Pizza".to_string())
        );
        assert_eq!(
            bill.add_item(&catalog, "Tea", 0).unwrap_err(),
            BillingError::InvalidQuantity(0)
        );
        assert_eq!(
            bill.add_item(&catalog, "Tea", -2).unwrap_err(),
            BillingError::InvalidQuantity(-2)
        );
        assert!(bill.is_empty());
    }

    #[test]
    fn test_into_sale_is_balanced() {
        let catalog = menu();
        let mut bill = Bill::new("ORD-20241218-0001", Currency::Inr);
        bill.add_item(&catalog, "Tea", 2).unwrap();
        bill.add_item(&catalog, "Samosa", 1).unwrap();

        let cash = AccountId::new();
        let revenue = AccountId::new();
        let date = NaiveDate::from_ymd_opt(2024, 12, 18).unwrap();
        let sale = bill.into_sale(cash, revenue, date).unwrap();

        assert_eq!(sale.description, "Sale ORD-20241218-0001");
        assert_eq!(sale.postings.len(), 3);
        assert_eq!(sale.postings[0].entry_type, EntryType::Debit);
        assert_eq!(sale.postings[0].amount, inr(50));
        assert_eq!(sale.postings[1].memo.as_deref(), Some("Tea x 2"));
        let credits: i64 = sale.postings[1..]
            .iter()
            .map(|p| p.amount.minor_units())
            .sum();
        assert_eq!(credits, inr(50).minor_units());
    }

    #[test]
    fn test_empty_bill_has_no_sale() {
        let bill = Bill::new("ORD-20241218-0001", Currency::Inr);
        let date = NaiveDate::from_ymd_opt(2024, 12, 18).unwrap();
        assert_eq!(
            bill.into_sale(AccountId::new(), AccountId::new(), date),
            Err(BillingError::EmptyBill)
        );
    }
}
