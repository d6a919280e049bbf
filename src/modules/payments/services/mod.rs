pub mod gateway;
pub mod payment_allocator;
pub mod payment_service;

pub use gateway::{CollectionGateway, GatewayAuthorization, StubGateway};
pub use payment_allocator::{AllocationOutcome, PaymentAllocator};
pub use payment_service::PaymentService;
