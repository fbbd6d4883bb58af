//! Order numbers.

use chrono::NaiveDate;

use super::error::BillingError;

/// Issues `ORD-YYYYMMDD-NNNN` numbers, restarting at 0001 each day.
#[derive(Debug, Clone, Default)]
pub struct OrderSequence {
    day: Option<NaiveDate>,
    issued: u32,
}

impl OrderSequence {
    const MAX_PER_DAY: u32 = 9_999;

    /// Creates a sequence with nothing issued.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues the next order number for `date`.
    ///
    /// # Errors
    ///
    /// Returns `SequenceExhausted` after 9999 orders on one day.
    pub fn next(&mut self, date: NaiveDate) -> Result<String, BillingError> {
        if self.day != Some(date) {
            self.day = Some(date);
            self.issued = 0;
        }
        if self.issued >= Self::MAX_PER_DAY {
            return Err(BillingError::SequenceExhausted(date));
        }
        self.issued += 1;
        Ok(format!("ORD-{}-{:04}", date.format("%Y%m%d"), self.issued))
    }
}
