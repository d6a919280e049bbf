use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::core::{AppError, Result};

/// Overall loan lifecycle status
///
/// A closed tagged enum rather than free-form status strings, so status
/// comparisons cannot drift across case variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanStatus {
    /// Application submitted, not yet approved
    Pending,
    /// Approved and repaying on schedule
    Active,
    /// At least one pending installment past its due date
    Overdue,
    /// Fully repaid or rejected; terminal
    Closed,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Overdue => "overdue",
            Self::Closed => "closed",
        }
    }

    /// True when the loan can accept payments
    pub fn is_open_for_payment(&self) -> bool {
        matches!(self, Self::Active | Self::Overdue)
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for LoanStatus {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.as_str() {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            "overdue" => Ok(Self::Overdue),
            "closed" => Ok(Self::Closed),
            _ => Err(format!("Invalid loan status: {}", value)),
        }
    }
}

/// The loan aggregate owned by the servicing engine
///
/// Created at application time in Pending status; approval activates it and
/// builds the installment ledger. After that the aggregate is mutated only by
/// payment allocation and the overdue sweep, and is soft-closed via status
/// rather than deleted. The version column backs the optimistic concurrency
/// check on every aggregate update.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LoanAccount {
    pub id: String,
    /// Human-readable account number, assigned on approval
    pub loan_number: Option<String>,
    pub principal: Decimal,
    pub annual_rate_percent: Decimal,
    pub tenure_months: i32,
    /// Fixed monthly installment amount
    pub emi: Decimal,
    /// Remaining unpaid principal
    pub outstanding_balance: Decimal,
    pub next_due_date: Option<NaiveDate>,
    /// Currently payable total (overdue amounts plus the arrived installment)
    pub amount_due: Decimal,
    #[sqlx(try_from = "String")]
    pub status: LoanStatus,
    pub overdue_months: i32,
    pub current_overdue_amount: Decimal,
    pub last_payment_date: Option<NaiveDateTime>,
    /// Optimistic concurrency token
    pub version: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl LoanAccount {
    /// Create a new loan application with its quoted EMI
    pub fn new(
        principal: Decimal,
        annual_rate_percent: Decimal,
        tenure_months: i32,
        emi: Decimal,
    ) -> Result<Self> {
        if principal <= Decimal::ZERO {
            return Err(AppError::invalid_schedule("Principal must be positive"));
        }
        if annual_rate_percent < Decimal::ZERO {
            return Err(AppError::invalid_schedule(
                "Annual rate cannot be negative",
            ));
        }
        if tenure_months <= 0 {
            return Err(AppError::invalid_schedule(
                "Tenure must be a positive number of months",
            ));
        }

        let now = chrono::Utc::now().naive_utc();

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            loan_number: None,
            principal,
            annual_rate_percent,
            tenure_months,
            emi,
            outstanding_balance: Decimal::ZERO,
            next_due_date: None,
            amount_due: Decimal::ZERO,
            status: LoanStatus::Pending,
            overdue_months: 0,
            current_overdue_amount: Decimal::ZERO,
            last_payment_date: None,
            version: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Monthly interest rate as a fraction (annual percent / 12 / 100)
    pub fn monthly_rate(&self) -> Decimal {
        self.annual_rate_percent / Decimal::from(12) / Decimal::from(100)
    }

    /// Activate an approved loan against its freshly generated schedule
    ///
    /// Balance starts at the full principal; the first schedule row supplies
    /// the next due date and the amount currently payable.
    pub fn activate(
        &mut self,
        first_due_date: NaiveDate,
        first_amount_due: Decimal,
    ) {
        self.status = LoanStatus::Active;
        self.outstanding_balance = self.principal;
        self.next_due_date = Some(first_due_date);
        self.amount_due = first_amount_due;
        self.overdue_months = 0;
        self.current_overdue_amount = Decimal::ZERO;
        if self.loan_number.is_none() {
            self.loan_number = Some(Self::derive_loan_number(&self.id));
        }
        self.updated_at = chrono::Utc::now().naive_utc();
    }

    /// Soft-close a rejected application
    pub fn close_rejected(&mut self) {
        self.status = LoanStatus::Closed;
        self.emi = Decimal::ZERO;
        self.amount_due = Decimal::ZERO;
        self.outstanding_balance = Decimal::ZERO;
        self.next_due_date = None;
        self.overdue_months = 0;
        self.current_overdue_amount = Decimal::ZERO;
        self.updated_at = chrono::Utc::now().naive_utc();
    }

    fn derive_loan_number(id: &str) -> String {
        let suffix: String = id.chars().filter(|c| *c != '-').take(8).collect();
        format!("LN-{}", suffix.to_uppercase())
    }
}
