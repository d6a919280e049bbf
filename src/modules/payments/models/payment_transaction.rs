use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::core::{AppError, Result};

/// Payment result status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// Payment accepted and allocated
    Success,
    /// Payment declined by the collection gateway
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for TransactionStatus {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        match value.as_str() {
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("Invalid transaction status: {}", value)),
        }
    }
}

/// Append-only audit record of a payment against a loan
///
/// Recorded for the full paid amount in the same transaction as the ledger
/// updates it produced; never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PaymentTransaction {
    pub id: String,
    pub loan_id: String,
    pub paid_amount: Decimal,
    /// Payment channel as reported by the collection boundary
    pub payment_method: String,
    /// Reference issued by the collection gateway
    pub gateway_reference: String,
    #[sqlx(try_from = "String")]
    pub status: TransactionStatus,
    pub paid_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

impl PaymentTransaction {
    pub fn new(
        loan_id: String,
        paid_amount: Decimal,
        payment_method: String,
        gateway_reference: String,
        paid_at: NaiveDateTime,
    ) -> Result<Self> {
        if paid_amount <= Decimal::ZERO {
            return Err(AppError::invalid_payment(
                "Paid amount must be positive",
            ));
        }

        if payment_method.trim().is_empty() {
            return Err(AppError::validation("Payment method cannot be empty"));
        }

        if gateway_reference.trim().is_empty() {
            return Err(AppError::validation(
                "Gateway reference cannot be empty",
            ));
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            loan_id,
            paid_amount,
            payment_method,
            gateway_reference,
            status: TransactionStatus::Success,
            paid_at,
            created_at: chrono::Utc::now().naive_utc(),
        })
    }
}
