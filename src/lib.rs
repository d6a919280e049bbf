//! LendBook Loan Servicing Platform Library
//!
//! Core engine for loan amortization, payment allocation and overdue
//! tracking: an approved principal/rate/tenure becomes a fixed installment
//! schedule, incoming payments are allocated against it in due-date order,
//! and the loan's status is derived from ledger state at any point in time.

pub mod config;
pub mod core;
pub mod modules;

// Re-export commonly used types
pub use modules::installments;
pub use modules::loans;
pub use modules::payments;
pub use modules::sweep;
