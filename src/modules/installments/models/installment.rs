use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::core::{AppError, Result};

/// One scheduled repayment in a loan's ledger
///
/// Installments are created in bulk when a loan is approved and form an
/// ordered sequence by due date, unique per (loan, due date). Each row moves
/// Pending -> Completed exactly once and is only ever deleted when the whole
/// schedule is regenerated on re-approval.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Installment {
    pub id: String,
    pub loan_id: String,
    /// Scheduled due date
    pub due_date: NaiveDate,
    /// Amount payable for this installment (principal + interest portion)
    pub amount_due: Decimal,
    #[sqlx(try_from = "String")]
    pub payment_status: PaymentStatus,
    /// Set when the installment is completed
    pub payment_date: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Installment payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// Not yet paid in full
    Pending,
    /// Fully paid
    Completed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for PaymentStatus {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.as_str() {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            _ => Err(format!("Invalid installment status: {}", value)),
        }
    }
}

impl Installment {
    /// Create a new pending installment
    pub fn new(loan_id: String, due_date: NaiveDate, amount_due: Decimal) -> Result<Self> {
        if amount_due <= Decimal::ZERO {
            return Err(AppError::validation("Installment amount must be positive"));
        }

        let now = chrono::Utc::now().naive_utc();

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            loan_id,
            due_date,
            amount_due,
            payment_status: PaymentStatus::Pending,
            payment_date: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Mark the installment as completed
    ///
    /// An installment completes exactly once and never reverts.
    pub fn complete(&mut self, paid_at: NaiveDateTime) -> Result<()> {
        if self.payment_status == PaymentStatus::Completed {
            return Err(AppError::validation(format!(
                "Installment due {} is already completed",
                self.due_date
            )));
        }

        self.payment_status = PaymentStatus::Completed;
        self.payment_date = Some(paid_at);
        self.updated_at = chrono::Utc::now().naive_utc();

        Ok(())
    }

    pub fn is_pending(&self) -> bool {
        self.payment_status == PaymentStatus::Pending
    }

    /// True when the installment is still pending past its due date
    pub fn is_past_due(&self, as_of: NaiveDate) -> bool {
        self.is_pending() && self.due_date < as_of
    }
}
