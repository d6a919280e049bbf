use sqlx::{MySql, MySqlPool, Transaction};

use crate::core::{AppError, Result};
use crate::modules::installments::models::{Installment, PaymentStatus};

/// Repository for installment ledger persistence
pub struct InstallmentRepository {
    pool: MySqlPool,
}

impl InstallmentRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Replace a loan's schedule inside an existing transaction
    ///
    /// Deletes any existing rows first so re-approval regenerates the ledger
    /// atomically. The unique key on (loan_id, due_date) guards against
    /// duplicate due dates slipping through.
    pub async fn replace_for_loan_with_tx(
        &self,
        tx: &mut Transaction<'_, MySql>,
        loan_id: &str,
        installments: &[Installment],
    ) -> Result<()> {
        sqlx::query("DELETE FROM installments WHERE loan_id = ?")
            .bind(loan_id)
            .execute(tx.as_mut())
            .await
            .map_err(|e| AppError::Internal(format!("Failed to clear schedule: {}", e)))?;

        for installment in installments {
            self.insert_with_tx(tx, installment).await?;
        }

        Ok(())
    }

    /// Insert a single installment within a transaction
    async fn insert_with_tx(
        &self,
        tx: &mut Transaction<'_, MySql>,
        installment: &Installment,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO installments (
                id, loan_id, due_date, amount_due, payment_status,
                payment_date, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&installment.id)
        .bind(&installment.loan_id)
        .bind(installment.due_date)
        .bind(installment.amount_due)
        .bind(installment.payment_status.to_string())
        .bind(installment.payment_date)
        .bind(installment.created_at)
        .bind(installment.updated_at)
        .execute(tx.as_mut())
        .await
        .map_err(|e| AppError::Internal(format!("Failed to insert installment: {}", e)))?;

        Ok(())
    }

    /// Find all installments for a loan, ordered by due date
    pub async fn find_by_loan(&self, loan_id: &str) -> Result<Vec<Installment>> {
        let rows = sqlx::query_as::<_, InstallmentRow>(
            r#"
            SELECT
                id, loan_id, due_date, amount_due, payment_status,
                payment_date, created_at, updated_at
            FROM installments
            WHERE loan_id = ?
            ORDER BY due_date ASC
            "#,
        )
        .bind(loan_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to fetch installments: {}", e)))?;

        rows.into_iter().map(|row| row.try_into()).collect()
    }

    /// Persist status/payment-date changes for an installment within a transaction
    pub async fn update_with_tx(
        &self,
        tx: &mut Transaction<'_, MySql>,
        installment: &Installment,
    ) -> Result<()> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE installments
            SET
                payment_status = ?,
                payment_date = ?,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(installment.payment_status.to_string())
        .bind(installment.payment_date)
        .bind(installment.updated_at)
        .bind(&installment.id)
        .execute(tx.as_mut())
        .await
        .map_err(|e| AppError::Internal(format!("Failed to update installment: {}", e)))?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::not_found("Installment not found"));
        }

        Ok(())
    }
}

/// Database row representation for the installments table
#[derive(sqlx::FromRow)]
struct InstallmentRow {
    id: String,
    loan_id: String,
    due_date: chrono::NaiveDate,
    amount_due: rust_decimal::Decimal,
    payment_status: String,
    payment_date: Option<chrono::NaiveDateTime>,
    created_at: chrono::NaiveDateTime,
    updated_at: chrono::NaiveDateTime,
}

impl TryFrom<InstallmentRow> for Installment {
    type Error = AppError;

    fn try_from(row: InstallmentRow) -> Result<Self> {
        let payment_status = PaymentStatus::try_from(row.payment_status)
            .map_err(AppError::Internal)?;

        Ok(Installment {
            id: row.id,
            loan_id: row.loan_id,
            due_date: row.due_date,
            amount_due: row.amount_due,
            payment_status,
            payment_date: row.payment_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
