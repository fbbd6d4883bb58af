//! Dashboard summary service.

use chrono::{NaiveDate, Utc};

use super::types::{DashboardSummary, DuesOverview, RecentActivity};
use crate::accounts::AccountType;
use crate::books::Snapshot;
use crate::ledger::DateRange;
use crate::receivables::AmountDueRegister;
use crate::reports::ReportError;

/// Stateless service for the dashboard.
pub struct DashboardService;

impl DashboardService {
    /// Summarizes one snapshot.
    ///
    /// Every figure comes from the same snapshot, so the totals and the
    /// recent activity always agree. Dues are summarized as of `as_of`, or
    /// as of today when no cutoff is given.
    ///
    /// # Errors
    ///
    /// Returns `Amount` if a total overflows, or `Receivables` if the dues
    /// summary fails.
    pub fn summarize(
        snapshot: &Snapshot,
        as_of: Option<NaiveDate>,
        recent_limit: usize,
        dues: Option<&AmountDueRegister>,
    ) -> Result<DashboardSummary, ReportError> {
        let range = DateRange::up_to(as_of);
        let projector = snapshot.projector();

        let total_assets = projector.type_total(AccountType::Asset, range)?;
        let total_income = projector.type_total(AccountType::Revenue, range)?;
        let total_expenses = projector.type_total(AccountType::Expense, range)?;
        let net_income = total_income.checked_sub(total_expenses)?;

        let transactions = snapshot.list_transactions(range);
        let transaction_count = transactions.clone().count();
        let recent_activity = transactions
            .rev()
            .take(recent_limit)
            .map(|tx| -> Result<RecentActivity, ReportError> {
                Ok(RecentActivity {
                    transaction_id: tx.id,
                    date: tx.date,
                    particulars: tx.description.clone(),
                    amount: tx.totals()?.debit,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let dues = match dues {
            Some(register) => {
                let cutoff = as_of.unwrap_or_else(|| Utc::now().date_naive());
                let summary = register.summary(cutoff)?;
                Some(DuesOverview {
                    outstanding: summary.total_outstanding,
                    overdue: summary.overdue_amount,
                    overdue_count: summary.overdue_count,
                })
            }
            None => None,
        };

        Ok(DashboardSummary {
            as_of,
            currency: snapshot.currency(),
            total_assets,
            total_income,
            total_expenses,
            net_income,
            transaction_count,
            recent_activity,
            dues,
        })
    }
}
