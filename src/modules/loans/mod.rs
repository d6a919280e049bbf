pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use controllers::{apply_for_loan, decide_loan, get_loan, get_schedule};
pub use models::{LoanAccount, LoanStatus};
pub use repositories::LoanRepository;
pub use services::{AmortizationCalculator, LoanDecision, LoanService, ScheduleLine, StatusEngine};
