pub mod payment_controller;

pub use payment_controller::{list_payments, submit_payment};
