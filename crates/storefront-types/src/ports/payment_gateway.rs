use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum GatewayError {
    #[error("gateway transport error: {0}")]
    Transport(String),
    #[error("gateway rejected request: {0}")]
    Rejected(String),
}

/// The provider's pending charge, created before the hosted collection flow
/// opens. Its id ties the later callback back to our order record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
}

/// Server-side boundary to the hosted payment provider.
#[async_trait]
pub trait PaymentGateway: Send + Sync + 'static {
    async fn create_payment_order(
        &self,
        amount: i64,
        currency: &str,
    ) -> Result<ProviderOrder, GatewayError>;
}

/// The three outcomes the rest of the system consumes from a payment
/// collection attempt, normalized from whatever the provider reports.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum PaymentSignal {
    Success {
        provider_order_id: String,
        provider_payment_id: String,
    },
    Failure {
        provider_order_id: String,
        reason: String,
    },
    Cancelled {
        provider_order_id: String,
    },
}
