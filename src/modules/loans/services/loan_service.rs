use chrono::Months;
use rust_decimal::Decimal;
use sqlx::MySqlPool;
use tracing::info;

use crate::core::{AppError, Result};
use crate::modules::installments::models::Installment;
use crate::modules::installments::repositories::InstallmentRepository;
use crate::modules::loans::models::{LoanAccount, LoanStatus};
use crate::modules::loans::repositories::LoanRepository;
use crate::modules::loans::services::AmortizationCalculator;

/// Approval decision carried by the external approval collaborator
#[derive(Debug, Clone)]
pub enum LoanDecision {
    /// Approve with the confirmed terms; generates the repayment schedule
    Approved {
        principal: Decimal,
        annual_rate_percent: Decimal,
        tenure_months: i32,
    },
    /// Reject and soft-close the application
    Rejected,
}

/// Service for loan application intake and the approval decision
pub struct LoanService {
    pool: MySqlPool,
    loans: LoanRepository,
    installments: InstallmentRepository,
}

impl LoanService {
    pub fn new(pool: MySqlPool) -> Self {
        Self {
            loans: LoanRepository::new(pool.clone()),
            installments: InstallmentRepository::new(pool.clone()),
            pool,
        }
    }

    /// Register a loan application in Pending status with its quoted EMI
    pub async fn apply(
        &self,
        principal: Decimal,
        annual_rate_percent: Decimal,
        tenure_months: i32,
    ) -> Result<LoanAccount> {
        let emi = AmortizationCalculator::quote_emi(principal, annual_rate_percent, tenure_months)?;
        let loan = LoanAccount::new(principal, annual_rate_percent, tenure_months, emi)?;

        self.loans.create(&loan).await?;

        info!(
            loan_id = %loan.id,
            principal = %principal,
            tenure_months,
            emi = %emi,
            "Loan application registered"
        );

        Ok(loan)
    }

    /// Apply an approval decision to a pending (or re-decided) loan
    ///
    /// Approval regenerates the repayment schedule from scratch and activates
    /// the loan in the same transaction; rejection soft-closes it. A closed
    /// loan cannot be re-decided.
    pub async fn decide(&self, loan_id: &str, decision: LoanDecision) -> Result<LoanAccount> {
        let mut loan = self.get_loan(loan_id).await?;

        if loan.status == LoanStatus::Closed {
            return Err(AppError::validation(format!(
                "Loan {} is closed and cannot be re-decided",
                loan_id
            )));
        }

        let expected_version = loan.version;

        match decision {
            LoanDecision::Approved {
                principal,
                annual_rate_percent,
                tenure_months,
            } => {
                if tenure_months <= 0 {
                    return Err(AppError::invalid_schedule(
                        "Tenure must be a positive number of months",
                    ));
                }

                let emi =
                    AmortizationCalculator::quote_emi(principal, annual_rate_percent, tenure_months)?;

                // First installment falls one month after the approval date
                let approval_date = chrono::Utc::now().date_naive();
                let first_due_date = approval_date
                    .checked_add_months(Months::new(1))
                    .ok_or_else(|| {
                        AppError::invalid_schedule("Due date overflows the calendar")
                    })?;

                let schedule = AmortizationCalculator::build_schedule(
                    principal,
                    annual_rate_percent,
                    tenure_months,
                    emi,
                    first_due_date,
                )?;

                let ledger: Vec<Installment> = schedule
                    .iter()
                    .map(|line| Installment::new(loan.id.clone(), line.due_date, line.amount_due))
                    .collect::<Result<_>>()?;

                loan.principal = principal;
                loan.annual_rate_percent = annual_rate_percent;
                loan.tenure_months = tenure_months;
                loan.emi = emi;
                loan.activate(first_due_date, schedule[0].amount_due);

                let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
                self.installments
                    .replace_for_loan_with_tx(&mut tx, &loan.id, &ledger)
                    .await?;
                self.loans
                    .update_with_tx(&mut tx, &loan, expected_version)
                    .await?;
                tx.commit().await.map_err(AppError::Database)?;

                loan.version = expected_version + 1;

                info!(
                    loan_id = %loan.id,
                    loan_number = loan.loan_number.as_deref().unwrap_or(""),
                    installments = ledger.len(),
                    emi = %emi,
                    "Loan approved and schedule generated"
                );
            }
            LoanDecision::Rejected => {
                loan.close_rejected();

                let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
                self.installments
                    .replace_for_loan_with_tx(&mut tx, &loan.id, &[])
                    .await?;
                self.loans
                    .update_with_tx(&mut tx, &loan, expected_version)
                    .await?;
                tx.commit().await.map_err(AppError::Database)?;

                loan.version = expected_version + 1;

                info!(loan_id = %loan.id, "Loan application rejected");
            }
        }

        Ok(loan)
    }

    /// Load a loan or fail with NotFound
    pub async fn get_loan(&self, loan_id: &str) -> Result<LoanAccount> {
        self.loans
            .find_by_id(loan_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Loan {} not found", loan_id)))
    }

    /// The loan's installment ledger, ordered by due date
    pub async fn get_schedule(&self, loan_id: &str) -> Result<Vec<Installment>> {
        // Surface NotFound for unknown loans rather than an empty ledger
        self.get_loan(loan_id).await?;
        self.installments.find_by_loan(loan_id).await
    }
}
