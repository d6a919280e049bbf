use sqlx::{MySql, MySqlPool, Transaction};

use crate::core::{AppError, Result};
use crate::modules::loans::models::{LoanAccount, LoanStatus};

/// Repository for loan aggregate persistence
///
/// Aggregate updates are guarded by the loan's version column: a write that
/// loses the race affects zero rows and surfaces as a ConcurrencyConflict,
/// so concurrent submissions against the same loan are serialized rather
/// than merged.
pub struct LoanRepository {
    pool: MySqlPool,
}

impl LoanRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Insert a new loan application
    pub async fn create(&self, loan: &LoanAccount) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO loan_accounts (
                id, loan_number, principal, annual_rate_percent, tenure_months,
                emi, outstanding_balance, next_due_date, amount_due, status,
                overdue_months, current_overdue_amount, last_payment_date,
                version, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&loan.id)
        .bind(&loan.loan_number)
        .bind(loan.principal)
        .bind(loan.annual_rate_percent)
        .bind(loan.tenure_months)
        .bind(loan.emi)
        .bind(loan.outstanding_balance)
        .bind(loan.next_due_date)
        .bind(loan.amount_due)
        .bind(loan.status.to_string())
        .bind(loan.overdue_months)
        .bind(loan.current_overdue_amount)
        .bind(loan.last_payment_date)
        .bind(loan.version)
        .bind(loan.created_at)
        .bind(loan.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to insert loan: {}", e)))?;

        Ok(())
    }

    /// Find a loan by ID
    pub async fn find_by_id(&self, id: &str) -> Result<Option<LoanAccount>> {
        let row = sqlx::query_as::<_, LoanAccountRow>(
            r#"
            SELECT
                id, loan_number, principal, annual_rate_percent, tenure_months,
                emi, outstanding_balance, next_due_date, amount_due, status,
                overdue_months, current_overdue_amount, last_payment_date,
                version, created_at, updated_at
            FROM loan_accounts
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to fetch loan: {}", e)))?;

        match row {
            Some(r) => Ok(Some(r.try_into()?)),
            None => Ok(None),
        }
    }

    /// Loans that the overdue sweep must visit
    pub async fn find_open_for_sweep(&self) -> Result<Vec<LoanAccount>> {
        let rows = sqlx::query_as::<_, LoanAccountRow>(
            r#"
            SELECT
                id, loan_number, principal, annual_rate_percent, tenure_months,
                emi, outstanding_balance, next_due_date, amount_due, status,
                overdue_months, current_overdue_amount, last_payment_date,
                version, created_at, updated_at
            FROM loan_accounts
            WHERE status IN ('active', 'overdue')
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to fetch loans for sweep: {}", e)))?;

        rows.into_iter().map(|row| row.try_into()).collect()
    }

    /// Persist aggregate changes with the optimistic version check
    ///
    /// `expected_version` is the version the caller loaded; the row's version
    /// advances by one on success. Zero affected rows means another writer
    /// got there first and the caller must reload and retry.
    pub async fn update_with_tx(
        &self,
        tx: &mut Transaction<'_, MySql>,
        loan: &LoanAccount,
        expected_version: i64,
    ) -> Result<()> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE loan_accounts
            SET
                loan_number = ?,
                principal = ?,
                annual_rate_percent = ?,
                tenure_months = ?,
                emi = ?,
                outstanding_balance = ?,
                next_due_date = ?,
                amount_due = ?,
                status = ?,
                overdue_months = ?,
                current_overdue_amount = ?,
                last_payment_date = ?,
                version = ?,
                updated_at = ?
            WHERE id = ? AND version = ?
            "#,
        )
        .bind(&loan.loan_number)
        .bind(loan.principal)
        .bind(loan.annual_rate_percent)
        .bind(loan.tenure_months)
        .bind(loan.emi)
        .bind(loan.outstanding_balance)
        .bind(loan.next_due_date)
        .bind(loan.amount_due)
        .bind(loan.status.to_string())
        .bind(loan.overdue_months)
        .bind(loan.current_overdue_amount)
        .bind(loan.last_payment_date)
        .bind(expected_version + 1)
        .bind(loan.updated_at)
        .bind(&loan.id)
        .bind(expected_version)
        .execute(tx.as_mut())
        .await
        .map_err(|e| AppError::Internal(format!("Failed to update loan: {}", e)))?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::conflict(format!(
                "Loan {} was modified concurrently; reload and retry",
                loan.id
            )));
        }

        Ok(())
    }
}

/// Database row representation for the loan_accounts table
#[derive(sqlx::FromRow)]
struct LoanAccountRow {
    id: String,
    loan_number: Option<String>,
    principal: rust_decimal::Decimal,
    annual_rate_percent: rust_decimal::Decimal,
    tenure_months: i32,
    emi: rust_decimal::Decimal,
    outstanding_balance: rust_decimal::Decimal,
    next_due_date: Option<chrono::NaiveDate>,
    amount_due: rust_decimal::Decimal,
    status: String,
    overdue_months: i32,
    current_overdue_amount: rust_decimal::Decimal,
    last_payment_date: Option<chrono::NaiveDateTime>,
    version: i64,
    created_at: chrono::NaiveDateTime,
    updated_at: chrono::NaiveDateTime,
}

impl TryFrom<LoanAccountRow> for LoanAccount {
    type Error = AppError;

    fn try_from(row: LoanAccountRow) -> Result<Self> {
        let status = LoanStatus::try_from(row.status).map_err(AppError::Internal)?;

        Ok(LoanAccount {
            id: row.id,
            loan_number: row.loan_number,
            principal: row.principal,
            annual_rate_percent: row.annual_rate_percent,
            tenure_months: row.tenure_months,
            emi: row.emi,
            outstanding_balance: row.outstanding_balance,
            next_due_date: row.next_due_date,
            amount_due: row.amount_due,
            status,
            overdue_months: row.overdue_months,
            current_overdue_amount: row.current_overdue_amount,
            last_payment_date: row.last_payment_date,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
