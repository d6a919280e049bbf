pub mod loan_account;

pub use loan_account::{LoanAccount, LoanStatus};
