use serde::{Deserialize, Serialize};
use storefront_types::domain::intent::OrderIntent;
use storefront_types::domain::order::{OrderRecord, OrderStatus};
use storefront_types::ports::order_store::OrderStore;
use storefront_types::ports::payment_gateway::{PaymentGateway, PaymentSignal};
use uuid::Uuid;

use crate::errors::AppError;

/// What the checkout UI needs to open the hosted payment flow for a
/// freshly created order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutHandle {
    pub order_id: Uuid,
    pub provider_order_id: String,
    pub amount: i64,
    pub currency: String,
    /// Publishable key for the provider's client-side widget.
    pub key_id: String,
    pub prefill: Prefill,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prefill {
    pub name: Option<String>,
    pub email: Option<String>,
    pub contact: Option<String>,
}

/// Shopper-facing outcome of a payment collection attempt.
///
/// `Confirmed` is reported even when the bookkeeping write fails: by that
/// point the provider has captured the money, and the discrepancy is an
/// operational reconciliation concern, never a user-facing error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PaymentOutcome {
    Confirmed {
        provider_order_id: String,
        provider_payment_id: String,
    },
    Failed {
        reason: String,
    },
    Cancelled,
}

pub struct CheckoutService<S: OrderStore, G: PaymentGateway> {
    store: S,
    gateway: G,
    key_id: String,
}

impl<S: OrderStore, G: PaymentGateway> CheckoutService<S, G> {
    pub fn new(store: S, gateway: G, key_id: impl Into<String>) -> Self {
        Self {
            store,
            gateway,
            key_id: key_id.into(),
        }
    }

    /// Turns a priced intent into a durable `created` record plus a provider
    /// payment order. The provider call comes first: if it fails, checkout
    /// is blocked and no record is written.
    pub async fn place_order(&self, intent: OrderIntent) -> Result<CheckoutHandle, AppError> {
        let provider_order = self
            .gateway
            .create_payment_order(intent.amount, &intent.currency)
            .await
            .map_err(|e| AppError::Gateway(e.to_string()))?;

        let prefill = Prefill {
            name: intent.customer.name().map(str::to_string),
            email: intent.customer.email().map(str::to_string),
            contact: intent.customer.phone().map(str::to_string),
        };

        let record = OrderRecord::from_intent(intent, provider_order.id.clone());
        let record = self
            .store
            .create(record)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?;

        tracing::info!(
            order_id = %record.id,
            provider_order_id = %record.provider_order_id,
            amount = record.amount,
            "order placed"
        );

        Ok(CheckoutHandle {
            order_id: record.id,
            provider_order_id: record.provider_order_id,
            amount: record.amount,
            currency: record.currency,
            key_id: self.key_id.clone(),
            prefill,
        })
    }

    /// Applies a normalized payment signal to the order record.
    ///
    /// Store failures on the success path are logged and absorbed; the
    /// shopper still sees `Confirmed`. Failure signals move a `created`
    /// order to `failed` and surface the reason; cancellation touches
    /// nothing.
    pub async fn handle_payment(&self, signal: PaymentSignal) -> PaymentOutcome {
        match signal {
            PaymentSignal::Success {
                provider_order_id,
                provider_payment_id,
            } => {
                match self
                    .store
                    .mark_paid(&provider_order_id, &provider_payment_id)
                    .await
                {
                    Ok(Some(record)) => {
                        tracing::info!(order_id = %record.id, %provider_order_id, "order paid");
                    }
                    Ok(None) => {
                        tracing::error!(
                            %provider_order_id,
                            "payment succeeded for unknown provider order id; needs reconciliation"
                        );
                    }
                    Err(e) => {
                        tracing::error!(
                            %provider_order_id,
                            error = %e,
                            "order paid but bookkeeping failed; needs reconciliation"
                        );
                    }
                }
                PaymentOutcome::Confirmed {
                    provider_order_id,
                    provider_payment_id,
                }
            }
            PaymentSignal::Failure {
                provider_order_id,
                reason,
            } => {
                if let Err(e) = self.store.mark_failed(&provider_order_id).await {
                    tracing::error!(%provider_order_id, error = %e, "failed-status write lost");
                }
                PaymentOutcome::Failed { reason }
            }
            PaymentSignal::Cancelled { provider_order_id } => {
                tracing::debug!(%provider_order_id, "payment cancelled; order stays created");
                PaymentOutcome::Cancelled
            }
        }
    }

    pub async fn get_order(&self, id: Uuid) -> Result<OrderRecord, AppError> {
        match self
            .store
            .get(id)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        {
            Some(record) => Ok(record),
            None => Err(AppError::NotFound(format!("order {}", id))),
        }
    }

    /// Admin read surface: newest-first, optional status filter, bounded.
    pub async fn list_orders(
        &self,
        status: Option<OrderStatus>,
        limit: usize,
    ) -> Result<Vec<OrderRecord>, AppError> {
        self.store
            .list(status, limit)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))
    }

    /// Admin mutation surface: the unrestricted operator transition.
    pub async fn set_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<OrderRecord, AppError> {
        match self
            .store
            .set_status(id, status)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
        {
            Some(record) => Ok(record),
            None => Err(AppError::NotFound(format!("order {}", id))),
        }
    }
}
