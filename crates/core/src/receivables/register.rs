//! The amount-due register.

use chrono::{Days, NaiveDate};
use khata_shared::types::{Currency, Money};
use tracing::info;

use super::error::ReceivablesError;
use super::types::{AmountDueRow, AmountDueSummary, DueRecord};

/// Register of retailer dues.
#[derive(Debug, Clone)]
pub struct AmountDueRegister {
    currency: Currency,
    payment_terms_days: u32,
    records: Vec<DueRecord>,
}

impl AmountDueRegister {
    /// Creates an empty register.
    ///
    /// An amount becomes overdue `payment_terms_days` after its invoice date.
    #[must_use]
    pub const fn new(currency: Currency, payment_terms_days: u32) -> Self {
        Self {
            currency,
            payment_terms_days,
            records: Vec::new(),
        }
    }

    /// Register currency.
    #[must_use]
    pub const fn currency(&self) -> Currency {
        self.currency
    }

    /// Records a new due and returns its serial number.
    ///
    /// # Errors
    ///
    /// Returns `EmptyRetailer`, `NonPositiveAmount` or `CurrencyMismatch`.
    pub fn record_due(
        &mut self,
        date: NaiveDate,
        retailer: &str,
        amount: Money,
    ) -> Result<u32, ReceivablesError> {
        let retailer = retailer.trim();
        if retailer.is_empty() {
            return Err(ReceivablesError::EmptyRetailer);
        }
        if amount.currency() != self.currency {
            return Err(ReceivablesError::CurrencyMismatch {
                expected: self.currency,
                found: amount.currency(),
            });
        }
        if !amount.is_positive() {
            return Err(ReceivablesError::NonPositiveAmount(amount));
        }

        let serial_no = u32::try_from(self.records.len() + 1).unwrap_or(u32::MAX);
        let due_date = date
            .checked_add_days(Days::new(u64::from(self.payment_terms_days)))
            .unwrap_or(NaiveDate::MAX);
        self.records.push(DueRecord {
            serial_no,
            date,
            retailer: retailer.to_string(),
            amount,
            due_date,
            settled_on: None,
        });
        info!(serial_no, retailer, amount = %amount, due_date = %due_date, "Amount due recorded");
        Ok(serial_no)
    }

    /// Marks a due as settled.
    ///
    /// # Errors
    ///
    /// Returns `RecordNotFound`, `AlreadySettled` or `SettledBeforeInvoice`.
    pub fn settle(&mut self, serial_no: u32, on: NaiveDate) -> Result<(), ReceivablesError> {
        let record = self
            .records
            .iter_mut()
            .find(|r| r.serial_no == serial_no)
            .ok_or(ReceivablesError::RecordNotFound(serial_no))?;
        if let Some(settled_on) = record.settled_on {
            return Err(ReceivablesError::AlreadySettled {
                serial_no,
                settled_on,
            });
        }
        if on < record.date {
            return Err(ReceivablesError::SettledBeforeInvoice {
                date: record.date,
                settled_on: on,
            });
        }
        record.settled_on = Some(on);
        info!(serial_no, settled_on = %on, "Amount due settled");
        Ok(())
    }

    /// Looks up a record.
    #[must_use]
    pub fn get(&self, serial_no: u32) -> Option<&DueRecord> {
        self.records.iter().find(|r| r.serial_no == serial_no)
    }

    /// All records in serial order.
    #[must_use]
    pub fn records(&self) -> &[DueRecord] {
        &self.records
    }

    /// Outstanding and overdue totals as of a date.
    ///
    /// # Errors
    ///
    /// Returns `Amount` if a total overflows.
    pub fn summary(&self, as_of: NaiveDate) -> Result<AmountDueSummary, ReceivablesError> {
        let mut total_outstanding = Money::zero(self.currency);
        let mut overdue_amount = Money::zero(self.currency);
        let mut overdue_count = 0;
        let mut rows = Vec::new();

        for record in self.records.iter().filter(|r| r.is_outstanding(as_of)) {
            let days_overdue = record.days_overdue(as_of);
            total_outstanding = total_outstanding.checked_add(record.amount)?;
            if days_overdue.is_some() {
                overdue_amount = overdue_amount.checked_add(record.amount)?;
                overdue_count += 1;
            }
            rows.push(AmountDueRow {
                serial_no: record.serial_no,
                date: record.date,
                retailer: record.retailer.clone(),
                amount: record.amount,
                due_date: record.due_date,
                days_overdue,
            });
        }

        Ok(AmountDueSummary {
            as_of,
            currency: self.currency,
            total_outstanding,
            overdue_amount,
            overdue_count,
            rows,
        })
    }
}
