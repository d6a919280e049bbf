use chrono::{Months, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tracing::warn;

use crate::core::{money, AppError, Result};

/// One row of a generated amortization schedule
///
/// The interest/principal split is an artifact of generation; only the due
/// date and amount are persisted on the ledger, since allocation recomputes
/// interest against the live balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleLine {
    pub due_date: NaiveDate,
    pub amount_due: Decimal,
    pub interest_portion: Decimal,
    pub principal_portion: Decimal,
}

/// Calculator for EMI quotes and amortization schedules
pub struct AmortizationCalculator;

impl AmortizationCalculator {
    /// Monthly interest rate as a fraction of the annual percentage
    pub fn monthly_rate(annual_rate_percent: Decimal) -> Decimal {
        annual_rate_percent / Decimal::from(12) / Decimal::from(100)
    }

    /// Quote the fixed monthly installment for the given terms
    ///
    /// Uses the standard annuity formula P*r*(1+r)^n / ((1+r)^n - 1). A zero
    /// rate degenerates to flat division, as does a rate whose exponentiation
    /// is not representable in floating point.
    pub fn quote_emi(
        principal: Decimal,
        annual_rate_percent: Decimal,
        tenure_months: i32,
    ) -> Result<Decimal> {
        Self::validate_terms(principal, annual_rate_percent)?;
        if tenure_months <= 0 {
            return Err(AppError::invalid_schedule(
                "Tenure must be a positive number of months",
            ));
        }

        let monthly_rate = Self::monthly_rate(annual_rate_percent);
        if monthly_rate.is_zero() {
            return Ok(money::round(principal / Decimal::from(tenure_months)));
        }

        let p = principal.to_f64().unwrap_or(f64::NAN);
        let r = monthly_rate.to_f64().unwrap_or(f64::NAN);
        let factor = (1.0 + r).powi(tenure_months);
        let emi = p * r * factor / (factor - 1.0);

        let emi = match Decimal::from_f64_retain(emi) {
            Some(value) if emi.is_finite() && value > Decimal::ZERO => value,
            _ => {
                warn!(
                    principal = %principal,
                    annual_rate_percent = %annual_rate_percent,
                    tenure_months,
                    "Annuity formula produced a non-finite EMI, falling back to flat division"
                );
                principal / Decimal::from(tenure_months)
            }
        };

        Ok(money::round(emi))
    }

    /// Generate the full installment schedule for an approved loan
    ///
    /// Walks month by month: interest accrues on the running balance, the
    /// remainder of the EMI retires principal, and the final installment
    /// absorbs whatever balance the rounding left so the schedule zeroes out
    /// exactly. Principal portions therefore always sum to the principal.
    pub fn build_schedule(
        principal: Decimal,
        annual_rate_percent: Decimal,
        tenure_months: i32,
        emi: Decimal,
        first_due_date: NaiveDate,
    ) -> Result<Vec<ScheduleLine>> {
        Self::validate_terms(principal, annual_rate_percent)?;
        if tenure_months < 0 {
            return Err(AppError::invalid_schedule(
                "Tenure cannot be negative",
            ));
        }

        // Degenerate tenure: one synthetic installment for the whole principal.
        // Reachable only through schedule regeneration over legacy records; the
        // intake and approval paths reject non-positive tenure up front.
        if tenure_months == 0 {
            return Ok(vec![ScheduleLine {
                due_date: first_due_date,
                amount_due: money::round(principal),
                interest_portion: Decimal::ZERO,
                principal_portion: money::round(principal),
            }]);
        }

        let monthly_rate = Self::monthly_rate(annual_rate_percent);
        let mut balance = principal;
        let mut lines = Vec::with_capacity(tenure_months as usize);

        for month in 1..=tenure_months {
            let due_date = first_due_date
                .checked_add_months(Months::new(month as u32 - 1))
                .ok_or_else(|| {
                    AppError::invalid_schedule("Due date overflows the calendar")
                })?;

            let interest = money::round(balance * monthly_rate);
            let (principal_portion, amount_due) = if month < tenure_months {
                let retired = (emi - interest).max(Decimal::ZERO).min(balance);
                (retired, money::round(retired + interest))
            } else {
                // Final installment clears the remaining balance plus its interest
                (balance, money::round(balance + interest))
            };

            lines.push(ScheduleLine {
                due_date,
                amount_due,
                interest_portion: interest,
                principal_portion,
            });

            balance -= principal_portion;
            if balance < Decimal::ZERO {
                balance = Decimal::ZERO;
            }
        }

        Ok(lines)
    }

    fn validate_terms(principal: Decimal, annual_rate_percent: Decimal) -> Result<()> {
        if principal <= Decimal::ZERO {
            return Err(AppError::invalid_schedule("Principal must be positive"));
        }
        if annual_rate_percent < Decimal::ZERO {
            return Err(AppError::invalid_schedule("Annual rate cannot be negative"));
        }
        Ok(())
    }
}
