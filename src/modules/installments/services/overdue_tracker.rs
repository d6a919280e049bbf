use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::modules::installments::models::Installment;

/// Overdue position derived from a loan's ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverdueSummary {
    /// Number of pending installments past their due date
    pub overdue_months: i32,
    /// Sum of their amounts due
    pub overdue_amount: Decimal,
}

impl OverdueSummary {
    pub fn is_overdue(&self) -> bool {
        self.overdue_months > 0
    }
}

/// Derives overdue state from ledger rows relative to an as-of date
///
/// Pure derivation: the same ledger and date always produce the same
/// summary, so sweep passes over an unchanged ledger are idempotent.
pub struct OverdueTracker;

impl OverdueTracker {
    pub fn assess(ledger: &[Installment], as_of: NaiveDate) -> OverdueSummary {
        let mut overdue_months = 0;
        let mut overdue_amount = Decimal::ZERO;

        for installment in ledger.iter().filter(|i| i.is_past_due(as_of)) {
            overdue_months += 1;
            overdue_amount += installment.amount_due;
        }

        OverdueSummary {
            overdue_months,
            overdue_amount,
        }
    }
}
