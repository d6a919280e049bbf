use sqlx::{MySql, MySqlPool, Transaction};

use crate::core::{AppError, Result};
use crate::modules::payments::models::{PaymentTransaction, TransactionStatus};

/// Repository for payment transaction persistence
///
/// Transactions are append-only: inserted once alongside the ledger changes
/// they produced, never updated.
pub struct PaymentRepository {
    pool: MySqlPool,
}

impl PaymentRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Insert a transaction within an existing database transaction
    pub async fn create_with_tx(
        &self,
        tx: &mut Transaction<'_, MySql>,
        transaction: &PaymentTransaction,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO payment_transactions (
                id, loan_id, paid_amount, payment_method, gateway_reference,
                status, paid_at, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&transaction.id)
        .bind(&transaction.loan_id)
        .bind(transaction.paid_amount)
        .bind(&transaction.payment_method)
        .bind(&transaction.gateway_reference)
        .bind(transaction.status.to_string())
        .bind(transaction.paid_at)
        .bind(transaction.created_at)
        .execute(tx.as_mut())
        .await
        .map_err(|e| AppError::Internal(format!("Failed to insert payment transaction: {}", e)))?;

        Ok(())
    }

    /// Payment history for a loan, newest first
    pub async fn find_by_loan(&self, loan_id: &str) -> Result<Vec<PaymentTransaction>> {
        let rows = sqlx::query_as::<_, PaymentTransactionRow>(
            r#"
            SELECT
                id, loan_id, paid_amount, payment_method, gateway_reference,
                status, paid_at, created_at
            FROM payment_transactions
            WHERE loan_id = ?
            ORDER BY paid_at DESC
            "#,
        )
        .bind(loan_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to fetch payment history: {}", e)))?;

        rows.into_iter().map(|row| row.try_into()).collect()
    }
}

/// Database row representation for the payment_transactions table
#[derive(sqlx::FromRow)]
struct PaymentTransactionRow {
    id: String,
    loan_id: String,
    paid_amount: rust_decimal::Decimal,
    payment_method: String,
    gateway_reference: String,
    status: String,
    paid_at: chrono::NaiveDateTime,
    created_at: chrono::NaiveDateTime,
}

impl TryFrom<PaymentTransactionRow> for PaymentTransaction {
    type Error = AppError;

    fn try_from(row: PaymentTransactionRow) -> Result<Self> {
        let status = TransactionStatus::try_from(row.status).map_err(AppError::Internal)?;

        Ok(PaymentTransaction {
            id: row.id,
            loan_id: row.loan_id,
            paid_amount: row.paid_amount,
            payment_method: row.payment_method,
            gateway_reference: row.gateway_reference,
            status,
            paid_at: row.paid_at,
            created_at: row.created_at,
        })
    }
}
