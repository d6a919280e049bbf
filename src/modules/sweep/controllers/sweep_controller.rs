use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;

use crate::core::Result;
use crate::modules::sweep::services::OverdueSweep;

/// Request for POST /sweep
#[derive(Debug, Deserialize)]
pub struct RunSweepRequest {
    /// Evaluation date; defaults to today when omitted
    pub as_of_date: Option<NaiveDate>,
}

/// Response for POST /sweep
#[derive(Debug, Serialize)]
pub struct RunSweepResponse {
    pub as_of_date: String,
    pub scanned: usize,
    pub updated: usize,
}

/// POST /sweep
///
/// Runs one overdue sweep pass on demand. Idempotent: re-running against an
/// unchanged ledger reports zero updates.
pub async fn run_sweep(
    request: Option<web::Json<RunSweepRequest>>,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse> {
    let as_of = request
        .and_then(|r| r.as_of_date)
        .unwrap_or_else(|| chrono::Utc::now().date_naive());

    let sweep = OverdueSweep::new(pool.get_ref().clone());
    let outcome = sweep.run_once(as_of).await?;

    Ok(HttpResponse::Ok().json(RunSweepResponse {
        as_of_date: as_of.to_string(),
        scanned: outcome.scanned,
        updated: outcome.updated,
    }))
}
