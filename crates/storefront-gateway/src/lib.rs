//! Outbound HTTP adapter for the hosted payment provider.
//!
//! Creates provider-side payment orders ahead of the client's hosted
//! collection flow. The provider, not this crate, is the system of record
//! for whether money moved.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use storefront_types::ports::payment_gateway::{GatewayError, PaymentGateway, ProviderOrder};

#[derive(Clone)]
pub struct PaymentClientBuilder {
    base: Url,
    key_id: String,
    key_secret: String,
    timeout: Option<Duration>,
    client: Option<reqwest::Client>,
}

/// REST client for the provider's order-creation endpoint, authenticated
/// with basic auth over the key pair.
#[derive(Clone)]
pub struct PaymentClient {
    base: Url,
    key_id: String,
    key_secret: String,
    client: reqwest::Client,
}

#[derive(Serialize, Debug, Clone)]
struct CreateProviderOrderRequest {
    amount: i64,
    currency: String,
    receipt: String,
}

#[derive(Deserialize, Debug, Clone)]
struct ProviderOrderResponse {
    id: String,
    amount: i64,
    currency: String,
}

#[derive(Deserialize, Debug)]
struct ProviderErrorBody {
    error: Option<ProviderErrorDetail>,
}

#[derive(Deserialize, Debug)]
struct ProviderErrorDetail {
    description: Option<String>,
}

impl PaymentClient {
    pub fn new(base_url: &str, key_id: &str, key_secret: &str) -> anyhow::Result<Self> {
        Self::builder(base_url, key_id, key_secret)?.build()
    }

    pub fn builder(
        base_url: &str,
        key_id: &str,
        key_secret: &str,
    ) -> anyhow::Result<PaymentClientBuilder> {
        let base = Url::parse(base_url).context("invalid gateway base url")?;
        Ok(PaymentClientBuilder {
            base,
            key_id: key_id.to_string(),
            key_secret: key_secret.to_string(),
            timeout: None,
            client: None,
        })
    }

    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    fn url(&self, path: &str) -> Result<Url, GatewayError> {
        self.base
            .join(path)
            .map_err(|e| GatewayError::Transport(e.to_string()))
    }
}

#[async_trait]
impl PaymentGateway for PaymentClient {
    async fn create_payment_order(
        &self,
        amount: i64,
        currency: &str,
    ) -> Result<ProviderOrder, GatewayError> {
        let body = CreateProviderOrderRequest {
            amount,
            currency: currency.to_string(),
            receipt: format!("order_{}", chrono::Utc::now().timestamp_millis()),
        };
        let res = self
            .client
            .post(self.url("v1/orders")?)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status();
            let description = res
                .json::<ProviderErrorBody>()
                .await
                .ok()
                .and_then(|b| b.error)
                .and_then(|e| e.description)
                .unwrap_or_else(|| "no detail".to_string());
            tracing::warn!(%status, %description, "provider order creation rejected");
            return Err(GatewayError::Rejected(format!("{status}: {description}")));
        }

        let order: ProviderOrderResponse = res
            .json()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;
        tracing::debug!(provider_order_id = %order.id, amount, "provider order created");
        Ok(ProviderOrder {
            id: order.id,
            amount: order.amount,
            currency: order.currency,
        })
    }
}

impl PaymentClientBuilder {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_reqwest_client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> anyhow::Result<PaymentClient> {
        let client = match self.client {
            Some(client) => client,
            None => {
                let mut builder = reqwest::Client::builder();
                if let Some(t) = self.timeout {
                    builder = builder.timeout(t);
                }
                builder.build()?
            }
        };
        Ok(PaymentClient {
            base: self.base,
            key_id: self.key_id,
            key_secret: self.key_secret,
            client,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn creates_provider_order_with_basic_auth() {
        let server = MockServer::start();

        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v1/orders")
                .header_exists("authorization")
                .json_body_partial(r#"{ "amount": 2499, "currency": "INR" }"#);
            then.status(200).json_body(serde_json::json!({
                "id": "order_Nxq3",
                "amount": 2499,
                "currency": "INR",
                "status": "created"
            }));
        });

        let client = PaymentClient::new(&server.base_url(), "key_test", "secret_test").unwrap();
        let order = client.create_payment_order(2499, "INR").await.unwrap();

        assert_eq!(order.id, "order_Nxq3");
        assert_eq!(order.amount, 2499);
        assert_eq!(order.currency, "INR");
        mock.assert();
    }

    #[tokio::test]
    async fn rejection_surfaces_provider_description() {
        let server = MockServer::start();

        server.mock(|when, then| {
            when.method(POST).path("/v1/orders");
            then.status(401).json_body(serde_json::json!({
                "error": { "description": "Authentication failed" }
            }));
        });

        let client = PaymentClient::new(&server.base_url(), "key_bad", "secret_bad").unwrap();
        let err = client.create_payment_order(500, "INR").await.unwrap_err();

        match err {
            GatewayError::Rejected(msg) => assert!(msg.contains("Authentication failed")),
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_provider_is_a_transport_error() {
        // Nothing listens on this port.
        let client = PaymentClient::builder("http://127.0.0.1:9", "k", "s")
            .unwrap()
            .with_timeout(Duration::from_millis(200))
            .build()
            .unwrap();
        let err = client.create_payment_order(500, "INR").await.unwrap_err();
        assert!(matches!(err, GatewayError::Transport(_)));
    }
}
