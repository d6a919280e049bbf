use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::core::Result;

/// Authorization returned by the collection boundary
#[derive(Debug, Clone)]
pub struct GatewayAuthorization {
    /// Reference under which the collection was captured
    pub reference: String,
}

/// Boundary to the payment collection gateway
///
/// Real gateway integration lives outside this service; the engine only
/// needs an authorization reference to record against the transaction.
#[async_trait]
pub trait CollectionGateway: Send + Sync {
    /// Capture a payment and return the gateway's reference
    async fn capture(
        &self,
        loan_id: &str,
        amount: Decimal,
        payment_method: &str,
    ) -> Result<GatewayAuthorization>;

    /// Gateway name for logging
    fn name(&self) -> &str;
}

/// Stub gateway that authorizes every capture with a generated reference
pub struct StubGateway;

#[async_trait]
impl CollectionGateway for StubGateway {
    async fn capture(
        &self,
        _loan_id: &str,
        _amount: Decimal,
        _payment_method: &str,
    ) -> Result<GatewayAuthorization> {
        Ok(GatewayAuthorization {
            reference: format!("STUB-{}", Uuid::new_v4().simple()),
        })
    }

    fn name(&self) -> &str {
        "stub"
    }
}
