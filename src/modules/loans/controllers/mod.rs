pub mod loan_controller;

pub use loan_controller::{apply_for_loan, decide_loan, get_loan, get_schedule};
