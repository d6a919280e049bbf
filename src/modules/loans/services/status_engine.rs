use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use tracing::info;

use crate::core::money;
use crate::modules::installments::models::Installment;
use crate::modules::installments::services::OverdueTracker;
use crate::modules::loans::models::{LoanAccount, LoanStatus};

/// Derives a loan's overall status from its ledger
///
/// The status is a pure function of ledger state and balance at a point in
/// time: Closed once the balance is cleared and nothing is pending, Overdue
/// while any pending installment is past due, Active otherwise. Runs after
/// every payment allocation and on every sweep pass, always together with a
/// fresh overdue assessment so the aggregate's overdue fields never drift
/// from the ledger.
pub struct StatusEngine;

impl StatusEngine {
    /// Recompute status, due dates and overdue fields in place
    ///
    /// Pending and Closed loans are left untouched: Pending has no ledger yet
    /// and Closed is terminal.
    pub fn recompute(loan: &mut LoanAccount, ledger: &[Installment], as_of: NaiveDate) {
        if !loan.status.is_open_for_payment() {
            return;
        }

        let previous = loan.status;
        let summary = OverdueTracker::assess(ledger, as_of);

        let mut pending: Vec<&Installment> = ledger.iter().filter(|i| i.is_pending()).collect();
        pending.sort_by_key(|i| i.due_date);

        loan.overdue_months = summary.overdue_months;
        loan.current_overdue_amount = summary.overdue_amount;

        if pending.is_empty() && money::is_cleared(loan.outstanding_balance) {
            // Closure forces the aggregate to an exact zero position
            loan.status = LoanStatus::Closed;
            loan.outstanding_balance = Decimal::ZERO;
            loan.amount_due = Decimal::ZERO;
            loan.next_due_date = None;
            loan.overdue_months = 0;
            loan.current_overdue_amount = Decimal::ZERO;
        } else {
            loan.next_due_date = pending.first().map(|i| i.due_date);

            let mut amount_due = summary.overdue_amount;
            if let Some(upcoming) = pending.iter().find(|i| !i.is_past_due(as_of)) {
                if due_has_arrived(upcoming.due_date, as_of) {
                    amount_due += upcoming.amount_due;
                }
            }
            let total_obligation: Decimal = pending.iter().map(|i| i.amount_due).sum();
            loan.amount_due = amount_due.min(total_obligation);

            loan.status = if summary.is_overdue() && loan.outstanding_balance > Decimal::ZERO {
                LoanStatus::Overdue
            } else {
                LoanStatus::Active
            };
        }

        if loan.status != previous {
            info!(
                loan_id = %loan.id,
                from = %previous,
                to = %loan.status,
                overdue_months = loan.overdue_months,
                "Loan status transition"
            );
        }

        loan.updated_at = chrono::Utc::now().naive_utc();
    }
}

/// An installment counts toward the payable amount once its due month arrives
fn due_has_arrived(due_date: NaiveDate, as_of: NaiveDate) -> bool {
    due_date.year() < as_of.year()
        || (due_date.year() == as_of.year() && due_date.month() <= as_of.month())
}
