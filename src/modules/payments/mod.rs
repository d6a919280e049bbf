pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use controllers::{list_payments, submit_payment};
pub use models::{PaymentTransaction, TransactionStatus};
pub use repositories::PaymentRepository;
pub use services::{
    AllocationOutcome, CollectionGateway, PaymentAllocator, PaymentService, StubGateway,
};
