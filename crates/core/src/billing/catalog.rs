//! Price catalog.

use khata_shared::types::{Currency, Money};
use serde::{Deserialize, Serialize};

use super::error::BillingError;

/// A sellable item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Item name.
    pub name: String,
    /// Unit price.
    pub price: Money,
}

/// Items available for billing, in insertion order.
#[derive(Debug, Clone)]
pub struct Catalog {
    currency: Currency,
    items: Vec<CatalogItem>,
}

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub const fn new(currency: Currency) -> Self {
        Self {
            currency,
            items: Vec::new(),
        }
    }

    /// Catalog currency.
    #[must_use]
    pub const fn currency(&self) -> Currency {
        self.currency
    }

    /// Adds an item.
    ///
    /// # Errors
    ///
    /// Returns `EmptyItemName`, `DuplicateItem`, `CurrencyMismatch` or
    /// `NonPositivePrice`.
    pub fn add_item(&mut self, name: &str, price: Money) -> Result<(), BillingError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BillingError::EmptyItemName);
        }
        if self.find(name).is_some() {
            return Err(BillingError::DuplicateItem(name.to_string()));
        }
        if price.currency() != self.currency {
            return Err(BillingError::CurrencyMismatch {
                expected: self.currency,
                found: price.currency(),
            });
        }
        if !price.is_positive() {
            return Err(BillingError::NonPositivePrice(price));
        }
        self.items.push(CatalogItem {
            name: name.to_string(),
            price,
        });
        Ok(())
    }

    /// Finds an item by name, ignoring case.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&CatalogItem> {
        let wanted = name.trim().to_lowercase();
        self.items.iter().find(|i| i.name.to_lowercase() == wanted)
    }

    /// Items whose name contains `term`, ignoring case.
    pub fn search<'a>(&'a self, term: &str) -> impl Iterator<Item = &'a CatalogItem> + use<'a> {
        let needle = term.trim().to_lowercase();
        self.items
            .iter()
            .filter(move |i| i.name.to_lowercase().contains(&needle))
    }

    /// All items.
    #[must_use]
    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inr(major: i64) -> Money {
        Money::from_major(major, Currency::Inr).unwrap()
    }

    fn menu() -> Catalog {
        let mut catalog = Catalog::new(Currency::Inr);
        for (name, price) in [("Tea", 15), ("Coffee", 25), ("Green Tea", 20), ("Cold Coffee", 40)] {
            catalog.add_item(name, inr(price)).unwrap();
        }
        catalog
    }

    #[test]
    fn test_find_and_search() {
        let catalog = menu();
        assert_eq!(catalog.find("coffee").unwrap().price, inr(25));
        let names: Vec<_> = catalog.search("TEA").map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Tea", "Green Tea"]);
    }

    #[test]
    fn test_invalid_items_rejected() {
        let mut catalog = menu();
        assert_eq!(
            catalog.add_item(" tea ", inr(10)),
            Err(BillingError::DuplicateItem("tea".to_string()))
        );
        assert_eq!(catalog.add_item("", inr(10)), Err(BillingError::EmptyItemName));
        assert!(matches!(
            catalog.add_item("Samosa", inr(0)),
            Err(BillingError::NonPositivePrice(_))
        ));
        assert!(matches!(
            catalog.add_item("Samosa", Money::from_minor(2_000, Currency::Usd)),
            Err(BillingError::CurrencyMismatch { .. })
        ));
        assert_eq!(catalog.items().len(), 4);
    }
}
