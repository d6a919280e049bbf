pub mod models;
pub mod repositories;
pub mod services;

pub use models::{Installment, PaymentStatus};
pub use repositories::InstallmentRepository;
pub use services::{OverdueSummary, OverdueTracker};
