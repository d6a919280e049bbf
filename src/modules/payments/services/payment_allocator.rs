use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;

use crate::core::{money, AppError, Result};
use crate::modules::installments::models::Installment;
use crate::modules::loans::models::LoanAccount;
use crate::modules::loans::services::StatusEngine;

/// Result of allocating one payment against a loan's ledger
#[derive(Debug, Clone)]
pub struct AllocationOutcome {
    /// Updated loan aggregate with its status recomputed
    pub loan: LoanAccount,
    /// The full ledger after allocation, ordered by due date
    pub ledger: Vec<Installment>,
    /// Installments completed by this payment, in allocation order
    pub completed: Vec<Installment>,
}

/// Allocates payments across a loan's pending installments
///
/// Pure function over an immutable snapshot: the caller loads the loan and
/// ledger once, allocation returns new states, and everything is persisted
/// in a single transaction afterwards. Installments are consumed in strict
/// due-date order, so overdue amounts are always retired before current or
/// future ones.
pub struct PaymentAllocator;

impl PaymentAllocator {
    /// Allocate `paid_amount` against the ledger as of the payment date
    ///
    /// Interest is recomputed against the live outstanding balance at each
    /// step rather than read from the generated schedule; the remainder of
    /// the applied amount retires principal, never below zero. An installment
    /// completes only when its amount due is covered in full. A partially
    /// covered installment stays pending with its amount due unchanged.
    pub fn allocate(
        loan: &LoanAccount,
        ledger: &[Installment],
        paid_amount: Decimal,
        paid_at: NaiveDateTime,
    ) -> Result<AllocationOutcome> {
        if paid_amount <= Decimal::ZERO {
            return Err(AppError::invalid_payment(
                "Payment amount must be positive",
            ));
        }
        money::validate_amount(paid_amount).map_err(AppError::InvalidPaymentAmount)?;

        if !loan.status.is_open_for_payment() {
            return Err(AppError::invalid_payment(format!(
                "Loan {} is {} and not open for payments",
                loan.id, loan.status
            )));
        }

        let mut ledger: Vec<Installment> = ledger.to_vec();
        ledger.sort_by_key(|i| i.due_date);

        // The ledger can absorb at most the sum of its pending amounts; the
        // excess is rejected outright rather than silently capped
        let max_acceptable: Decimal = ledger
            .iter()
            .filter(|i| i.is_pending())
            .map(|i| i.amount_due)
            .sum();

        if paid_amount > max_acceptable {
            return Err(AppError::OverpaymentAttempt { max_acceptable });
        }

        let as_of: NaiveDate = paid_at.date();
        let monthly_rate = loan.monthly_rate();
        let mut loan = loan.clone();
        let mut remaining = paid_amount;
        let mut completed = Vec::new();

        for installment in ledger.iter_mut().filter(|i| i.is_pending()) {
            if remaining <= Decimal::ZERO {
                break;
            }

            let applied = remaining.min(installment.amount_due);
            let interest = money::round(loan.outstanding_balance * monthly_rate);
            let principal = (applied - interest)
                .max(Decimal::ZERO)
                .min(loan.outstanding_balance);

            loan.outstanding_balance -= principal;
            remaining -= applied;

            if applied == installment.amount_due {
                installment.complete(paid_at)?;
                completed.push(installment.clone());
            }
        }

        loan.last_payment_date = Some(paid_at);
        StatusEngine::recompute(&mut loan, &ledger, as_of);

        Ok(AllocationOutcome {
            loan,
            ledger,
            completed,
        })
    }
}
