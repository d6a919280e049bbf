pub mod amortization_calculator;
pub mod loan_service;
pub mod status_engine;

pub use amortization_calculator::{AmortizationCalculator, ScheduleLine};
pub use loan_service::{LoanDecision, LoanService};
pub use status_engine::StatusEngine;
