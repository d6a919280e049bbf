use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use sqlx::MySqlPool;
use tokio::time::interval;
use tracing::{error, info, warn};

use crate::core::{AppError, Result};
use crate::modules::installments::repositories::InstallmentRepository;
use crate::modules::loans::models::LoanAccount;
use crate::modules::loans::repositories::LoanRepository;
use crate::modules::loans::services::StatusEngine;

/// Result of one sweep pass
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct SweepOutcome {
    /// Loans examined
    pub scanned: usize,
    /// Loans whose derived state changed and was persisted
    pub updated: usize,
}

/// Batch job deriving overdue state across all open loans
///
/// Visits every Active/Overdue loan, re-derives its overdue fields and
/// status from the ledger, and persists per-loan in its own transaction.
/// The derivation is pure, so re-running the sweep over an unchanged ledger
/// is a no-op. A loan whose version moved under the sweep (a live payment
/// won the race) is skipped and picked up on the next pass.
pub struct OverdueSweep {
    loans: LoanRepository,
    installments: InstallmentRepository,
    pool: MySqlPool,
}

impl OverdueSweep {
    pub fn new(pool: MySqlPool) -> Self {
        Self {
            loans: LoanRepository::new(pool.clone()),
            installments: InstallmentRepository::new(pool.clone()),
            pool,
        }
    }

    /// Start the background sweep loop
    ///
    /// Spawned as a tokio task from main.
    pub async fn start(self: Arc<Self>, interval_secs: u64) {
        info!(interval_secs, "Starting overdue sweep loop");

        let mut ticker = interval(Duration::from_secs(interval_secs));

        loop {
            ticker.tick().await;

            let today = chrono::Utc::now().date_naive();
            match self.run_once(today).await {
                Ok(outcome) => {
                    if outcome.updated > 0 {
                        info!(
                            scanned = outcome.scanned,
                            updated = outcome.updated,
                            "Overdue sweep pass complete"
                        );
                    }
                }
                Err(e) => {
                    error!(error = %e, "Overdue sweep pass failed");
                }
            }
        }
    }

    /// Run a single sweep pass as of the given date
    pub async fn run_once(&self, as_of: NaiveDate) -> Result<SweepOutcome> {
        let loans = self.loans.find_open_for_sweep().await?;
        let scanned = loans.len();
        let mut updated = 0;

        for loan in loans {
            match self.sweep_loan(loan, as_of).await {
                Ok(true) => updated += 1,
                Ok(false) => {}
                Err(AppError::ConcurrencyConflict(_)) => {
                    // A live payment moved the loan under us; the next pass
                    // will see the fresh state
                    warn!("Sweep lost a concurrent update race; loan skipped");
                }
                Err(e) => return Err(e),
            }
        }

        Ok(SweepOutcome { scanned, updated })
    }

    /// Re-derive one loan's state; returns whether anything changed
    async fn sweep_loan(&self, loan: LoanAccount, as_of: NaiveDate) -> Result<bool> {
        let ledger = self.installments.find_by_loan(&loan.id).await?;

        let mut derived = loan.clone();
        StatusEngine::recompute(&mut derived, &ledger, as_of);

        if !state_changed(&loan, &derived) {
            return Ok(false);
        }

        if derived.status != loan.status {
            warn!(
                loan_id = %loan.id,
                from = %loan.status,
                to = %derived.status,
                overdue_months = derived.overdue_months,
                "Sweep updating loan status"
            );
        }

        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        self.loans
            .update_with_tx(&mut tx, &derived, loan.version)
            .await?;
        tx.commit().await.map_err(AppError::Database)?;

        Ok(true)
    }
}

/// Compares the derivable portion of the aggregate
fn state_changed(before: &LoanAccount, after: &LoanAccount) -> bool {
    before.status != after.status
        || before.overdue_months != after.overdue_months
        || before.current_overdue_amount != after.current_overdue_amount
        || before.amount_due != after.amount_due
        || before.next_due_date != after.next_due_date
        || before.outstanding_balance != after.outstanding_balance
}
