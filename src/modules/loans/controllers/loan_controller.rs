use actix_web::{web, HttpResponse};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;

use crate::core::{AppError, Result};
use crate::modules::installments::models::Installment;
use crate::modules::loans::models::LoanAccount;
use crate::modules::loans::services::{LoanDecision, LoanService};

/// Request for POST /loans
#[derive(Debug, Deserialize)]
pub struct ApplyLoanRequest {
    pub principal: Decimal,
    pub annual_rate_percent: Decimal,
    pub tenure_months: i32,
}

/// Request for POST /loans/{loan_id}/decision
#[derive(Debug, Deserialize)]
pub struct LoanDecisionRequest {
    /// "approved" or "rejected"
    pub decision: String,
    pub principal: Option<Decimal>,
    pub annual_rate_percent: Option<Decimal>,
    pub tenure_months: Option<i32>,
}

/// Loan aggregate projection
#[derive(Debug, Serialize)]
pub struct LoanResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loan_number: Option<String>,
    pub principal: String,
    pub annual_rate_percent: String,
    pub tenure_months: i32,
    pub emi: String,
    pub outstanding_balance: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_due_date: Option<String>,
    pub amount_due: String,
    pub status: String,
    pub overdue_months: i32,
    pub current_overdue_amount: String,
}

impl From<LoanAccount> for LoanResponse {
    fn from(loan: LoanAccount) -> Self {
        Self {
            id: loan.id,
            loan_number: loan.loan_number,
            principal: loan.principal.to_string(),
            annual_rate_percent: loan.annual_rate_percent.to_string(),
            tenure_months: loan.tenure_months,
            emi: loan.emi.to_string(),
            outstanding_balance: loan.outstanding_balance.to_string(),
            next_due_date: loan.next_due_date.map(|d| d.to_string()),
            amount_due: loan.amount_due.to_string(),
            status: loan.status.to_string(),
            overdue_months: loan.overdue_months,
            current_overdue_amount: loan.current_overdue_amount.to_string(),
        }
    }
}

/// One ledger row in the schedule projection
#[derive(Debug, Serialize)]
pub struct InstallmentResponse {
    pub id: String,
    pub due_date: String,
    pub amount_due: String,
    pub payment_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<String>,
}

impl From<Installment> for InstallmentResponse {
    fn from(installment: Installment) -> Self {
        Self {
            id: installment.id,
            due_date: installment.due_date.to_string(),
            amount_due: installment.amount_due.to_string(),
            payment_status: installment.payment_status.to_string(),
            payment_date: installment.payment_date.map(|dt| dt.to_string()),
        }
    }
}

/// Response for GET /loans/{loan_id}/schedule
#[derive(Debug, Serialize)]
pub struct ScheduleResponse {
    pub loan_id: String,
    pub installments: Vec<InstallmentResponse>,
}

/// POST /loans
///
/// Registers a loan application and quotes its EMI.
pub async fn apply_for_loan(
    request: web::Json<ApplyLoanRequest>,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse> {
    let service = LoanService::new(pool.get_ref().clone());

    let loan = service
        .apply(
            request.principal,
            request.annual_rate_percent,
            request.tenure_months,
        )
        .await?;

    Ok(HttpResponse::Created().json(LoanResponse::from(loan)))
}

/// POST /loans/{loan_id}/decision
///
/// Applies an approval decision. Approval requires the confirmed terms and
/// generates the repayment schedule; rejection soft-closes the application.
pub async fn decide_loan(
    loan_id: web::Path<String>,
    request: web::Json<LoanDecisionRequest>,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse> {
    let service = LoanService::new(pool.get_ref().clone());

    let decision = match request.decision.as_str() {
        "approved" => LoanDecision::Approved {
            principal: request
                .principal
                .ok_or_else(|| AppError::validation("Approval requires principal"))?,
            annual_rate_percent: request
                .annual_rate_percent
                .ok_or_else(|| AppError::validation("Approval requires annual_rate_percent"))?,
            tenure_months: request
                .tenure_months
                .ok_or_else(|| AppError::validation("Approval requires tenure_months"))?,
        },
        "rejected" => LoanDecision::Rejected,
        other => {
            return Err(AppError::validation(format!(
                "Unknown decision '{}'; expected 'approved' or 'rejected'",
                other
            )))
        }
    };

    let loan = service.decide(&loan_id, decision).await?;

    Ok(HttpResponse::Ok().json(LoanResponse::from(loan)))
}

/// GET /loans/{loan_id}
pub async fn get_loan(
    loan_id: web::Path<String>,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse> {
    let service = LoanService::new(pool.get_ref().clone());

    let loan = service.get_loan(&loan_id).await?;

    Ok(HttpResponse::Ok().json(LoanResponse::from(loan)))
}

/// GET /loans/{loan_id}/schedule
pub async fn get_schedule(
    loan_id: web::Path<String>,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse> {
    let service = LoanService::new(pool.get_ref().clone());

    let installments = service.get_schedule(&loan_id).await?;

    let response = ScheduleResponse {
        loan_id: loan_id.into_inner(),
        installments: installments
            .into_iter()
            .map(InstallmentResponse::from)
            .collect(),
    };

    Ok(HttpResponse::Ok().json(response))
}
