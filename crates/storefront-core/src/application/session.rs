use std::sync::Arc;

use storefront_types::domain::cart::CartStore;
use storefront_types::domain::intent::{CustomerInfo, OrderIntent, ShippingRule};
use storefront_types::ports::order_store::OrderStore;
use storefront_types::ports::payment_gateway::{PaymentGateway, PaymentSignal};

use super::checkout_service::{CheckoutHandle, CheckoutService, PaymentOutcome};
use crate::errors::AppError;

/// One shopper's checkout session: the cart plus the single in-flight
/// payment attempt.
///
/// Payment collection is the only long-lived suspension in the system, and
/// only one attempt may be open per session; `begin_checkout` refuses to
/// re-submit while one is pending. A failed or cancelled attempt re-arms
/// submission with the cart untouched.
pub struct CheckoutSession<S: OrderStore, G: PaymentGateway> {
    cart: CartStore,
    service: Arc<CheckoutService<S, G>>,
    in_flight: Option<String>,
}

impl<S: OrderStore, G: PaymentGateway> CheckoutSession<S, G> {
    pub fn new(cart: CartStore, service: Arc<CheckoutService<S, G>>) -> Self {
        Self {
            cart,
            service,
            in_flight: None,
        }
    }

    pub fn cart(&self) -> &CartStore {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut CartStore {
        &mut self.cart
    }

    pub fn payment_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Prices the cart, creates the provider payment order and the durable
    /// `created` record, and suspends the session on the returned handle.
    /// Rejects an empty cart and double submission before any server call.
    pub async fn begin_checkout(
        &mut self,
        rule: &ShippingRule,
        customer: CustomerInfo,
    ) -> Result<CheckoutHandle, AppError> {
        if self.in_flight.is_some() {
            return Err(AppError::BadRequest("payment already in flight".into()));
        }
        let intent = OrderIntent::build(self.cart.lines(), rule, customer)
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        let handle = self.service.place_order(intent).await?;
        self.in_flight = Some(handle.provider_order_id.clone());
        Ok(handle)
    }

    /// Resolves the in-flight attempt with the normalized provider signal.
    ///
    /// On success the record update is attempted first, then the cart is
    /// cleared exactly once for this attempt; a lost bookkeeping write never
    /// withholds confirmation or keeps the cart (the money has moved). On
    /// failure or cancellation the cart stays intact for retry.
    pub async fn finish_payment(&mut self, signal: PaymentSignal) -> PaymentOutcome {
        let signal_order_id = match &signal {
            PaymentSignal::Success {
                provider_order_id, ..
            }
            | PaymentSignal::Failure {
                provider_order_id, ..
            }
            | PaymentSignal::Cancelled { provider_order_id } => provider_order_id.clone(),
        };
        let current = self.in_flight.as_deref() == Some(signal_order_id.as_str());

        let outcome = self.service.handle_payment(signal).await;

        if current {
            if matches!(outcome, PaymentOutcome::Confirmed { .. }) {
                self.cart.clear();
            }
            self.in_flight = None;
        }
        outcome
    }
}
