use std::sync::Arc;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sqlx::MySqlPool;
use tracing::info;

use crate::core::{AppError, Result};
use crate::modules::installments::repositories::InstallmentRepository;
use crate::modules::loans::models::LoanAccount;
use crate::modules::loans::repositories::LoanRepository;
use crate::modules::payments::models::PaymentTransaction;
use crate::modules::payments::repositories::PaymentRepository;
use crate::modules::payments::services::gateway::CollectionGateway;
use crate::modules::payments::services::PaymentAllocator;

/// Service for submitting payments against a loan
///
/// One payment is one atomic unit of work: the transaction record, the
/// installment updates and the loan aggregate update commit together or not
/// at all. The aggregate update carries the optimistic version check, so a
/// concurrent submission against the same loan fails the whole transaction
/// and is surfaced for the caller to retry with fresh state.
pub struct PaymentService {
    pool: MySqlPool,
    loans: LoanRepository,
    installments: InstallmentRepository,
    payments: PaymentRepository,
    gateway: Arc<dyn CollectionGateway>,
}

impl PaymentService {
    pub fn new(pool: MySqlPool, gateway: Arc<dyn CollectionGateway>) -> Self {
        Self {
            loans: LoanRepository::new(pool.clone()),
            installments: InstallmentRepository::new(pool.clone()),
            payments: PaymentRepository::new(pool.clone()),
            pool,
            gateway,
        }
    }

    /// Submit a payment and allocate it across the loan's ledger
    pub async fn submit_payment(
        &self,
        loan_id: &str,
        paid_amount: Decimal,
        payment_method: &str,
        paid_at: NaiveDateTime,
    ) -> Result<(LoanAccount, PaymentTransaction)> {
        let loan = self
            .loans
            .find_by_id(loan_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Loan {} not found", loan_id)))?;

        let ledger = self.installments.find_by_loan(loan_id).await?;

        // Allocation is pure; any rejection here leaves no trace behind
        let outcome = PaymentAllocator::allocate(&loan, &ledger, paid_amount, paid_at)?;

        let authorization = self
            .gateway
            .capture(loan_id, paid_amount, payment_method)
            .await?;

        let transaction = PaymentTransaction::new(
            loan.id.clone(),
            paid_amount,
            payment_method.to_string(),
            authorization.reference,
            paid_at,
        )?;

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        self.payments.create_with_tx(&mut tx, &transaction).await?;
        for installment in &outcome.completed {
            self.installments
                .update_with_tx(&mut tx, installment)
                .await?;
        }
        self.loans
            .update_with_tx(&mut tx, &outcome.loan, loan.version)
            .await?;
        tx.commit().await.map_err(AppError::Database)?;

        let mut updated = outcome.loan;
        updated.version = loan.version + 1;

        info!(
            loan_id = %updated.id,
            paid_amount = %paid_amount,
            completed_installments = outcome.completed.len(),
            outstanding_balance = %updated.outstanding_balance,
            status = %updated.status,
            gateway = self.gateway.name(),
            "Payment allocated"
        );

        Ok((updated, transaction))
    }

    /// Payment history projection for a loan
    pub async fn history(&self, loan_id: &str) -> Result<Vec<PaymentTransaction>> {
        self.loans
            .find_by_id(loan_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Loan {} not found", loan_id)))?;

        self.payments.find_by_loan(loan_id).await
    }
}
