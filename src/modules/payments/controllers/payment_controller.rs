use std::sync::Arc;

use actix_web::{web, HttpResponse};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;

use crate::core::Result;
use crate::modules::payments::models::PaymentTransaction;
use crate::modules::payments::services::gateway::CollectionGateway;
use crate::modules::payments::services::PaymentService;

/// Request for POST /loans/{loan_id}/payments
#[derive(Debug, Deserialize)]
pub struct SubmitPaymentRequest {
    pub amount: Decimal,
    pub payment_method: String,
    /// Payment timestamp; defaults to now when omitted
    pub paid_at: Option<NaiveDateTime>,
}

/// Response for POST /loans/{loan_id}/payments
///
/// The post-allocation position of the loan, for display by the caller.
#[derive(Debug, Serialize)]
pub struct SubmitPaymentResponse {
    pub transaction_id: String,
    pub status: String,
    pub outstanding_balance: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_due_date: Option<String>,
    pub amount_due: String,
    pub overdue_months: i32,
    pub current_overdue_amount: String,
}

/// One row of the payment history projection
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    pub id: String,
    pub paid_amount: String,
    pub payment_method: String,
    pub gateway_reference: String,
    pub status: String,
    pub paid_at: String,
}

impl From<PaymentTransaction> for PaymentResponse {
    fn from(payment: PaymentTransaction) -> Self {
        Self {
            id: payment.id,
            paid_amount: payment.paid_amount.to_string(),
            payment_method: payment.payment_method,
            gateway_reference: payment.gateway_reference,
            status: payment.status.to_string(),
            paid_at: payment.paid_at.to_string(),
        }
    }
}

/// Response for GET /loans/{loan_id}/payments
#[derive(Debug, Serialize)]
pub struct PaymentHistoryResponse {
    pub loan_id: String,
    pub payments: Vec<PaymentResponse>,
}

/// POST /loans/{loan_id}/payments
///
/// Submits a payment for allocation against the loan's ledger.
pub async fn submit_payment(
    loan_id: web::Path<String>,
    request: web::Json<SubmitPaymentRequest>,
    pool: web::Data<MySqlPool>,
    gateway: web::Data<Arc<dyn CollectionGateway>>,
) -> Result<HttpResponse> {
    let service = PaymentService::new(pool.get_ref().clone(), gateway.get_ref().clone());

    let paid_at = request
        .paid_at
        .unwrap_or_else(|| chrono::Utc::now().naive_utc());

    let (loan, transaction) = service
        .submit_payment(&loan_id, request.amount, &request.payment_method, paid_at)
        .await?;

    let response = SubmitPaymentResponse {
        transaction_id: transaction.id,
        status: loan.status.to_string(),
        outstanding_balance: loan.outstanding_balance.to_string(),
        next_due_date: loan.next_due_date.map(|d| d.to_string()),
        amount_due: loan.amount_due.to_string(),
        overdue_months: loan.overdue_months,
        current_overdue_amount: loan.current_overdue_amount.to_string(),
    };

    Ok(HttpResponse::Ok().json(response))
}

/// GET /loans/{loan_id}/payments
pub async fn list_payments(
    loan_id: web::Path<String>,
    pool: web::Data<MySqlPool>,
    gateway: web::Data<Arc<dyn CollectionGateway>>,
) -> Result<HttpResponse> {
    let service = PaymentService::new(pool.get_ref().clone(), gateway.get_ref().clone());

    let payments = service.history(&loan_id).await?;

    let response = PaymentHistoryResponse {
        loan_id: loan_id.into_inner(),
        payments: payments.into_iter().map(PaymentResponse::from).collect(),
    };

    Ok(HttpResponse::Ok().json(response))
}
