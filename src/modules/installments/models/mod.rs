pub mod installment;

pub use installment::{Installment, PaymentStatus};
