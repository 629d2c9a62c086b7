use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use storefront_core::application::checkout_service::CheckoutService;
use storefront_core::inbound::http::{HttpServer, HttpServerConfig};
use storefront_repo::memory::InMemoryStore;
use storefront_types::domain::intent::ShippingRule;
use storefront_types::ports::payment_gateway::{GatewayError, PaymentGateway, ProviderOrder};

fn find_free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

#[derive(Clone, Default)]
struct FakeGateway {
    calls: Arc<AtomicU32>,
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_payment_order(
        &self,
        amount: i64,
        currency: &str,
    ) -> Result<ProviderOrder, GatewayError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ProviderOrder {
            id: format!("order_http_{n}"),
            amount,
            currency: currency.to_string(),
        })
    }
}

async fn spawn_server() -> (String, tokio::task::JoinHandle<()>) {
    let port = find_free_port();
    let config = HttpServerConfig {
        port: port.to_string(),
        admin_token: "secret-admin-token".into(),
        shipping: ShippingRule {
            free_over: 2000,
            flat_fee: 199,
        },
    };
    let service = CheckoutService::new(InMemoryStore::new(), FakeGateway::default(), "key_pub");
    let server = HttpServer::new(service, config).await.unwrap();
    let addr = format!("http://127.0.0.1:{}", port);
    let handle = tokio::spawn(async move {
        server.run().await.expect("server run");
    });
    // Give the server a moment to start.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    (addr, handle)
}

fn order_body() -> serde_json::Value {
    json!({
        "items": [
            { "product_id": "sock-01", "name": "Socks", "unit_price": 500,
              "size": "M", "quantity": 1 }
        ],
        "customer": {
            "kind": "partial",
            "name": "Asha",
            "email": null,
            "phone": null
        }
    })
}

#[tokio::test]
async fn place_pay_and_fulfill_over_http() {
    let (addr, handle) = spawn_server().await;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/orders", addr))
        .json(&order_body())
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::CREATED);
    let created: serde_json::Value = res.json().await.unwrap();
    // Below the free-shipping threshold: 500 + 199.
    assert_eq!(created["amount"], 699);
    assert_eq!(created["currency"], "INR");
    assert_eq!(created["key_id"], "key_pub");
    assert_eq!(created["prefill"]["name"], "Asha");
    let provider_order_id = created["provider_order_id"].as_str().unwrap().to_string();

    let res = client
        .post(format!("{}/payments/callback", addr))
        .json(&json!({
            "result": "success",
            "provider_order_id": provider_order_id,
            "provider_payment_id": "pay_http_1"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let outcome: serde_json::Value = res.json().await.unwrap();
    assert_eq!(outcome["outcome"], "confirmed");

    let res = client
        .get(format!("{}/admin/orders?status=paid", addr))
        .bearer_auth("secret-admin-token")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    let orders = body["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["provider_payment_id"], "pay_http_1");
    let order_id = orders[0]["id"].as_str().unwrap().to_string();

    let res = client
        .patch(format!("{}/admin/orders/{}/status", addr, order_id))
        .bearer_auth("secret-admin-token")
        .json(&json!({ "status": "shipped" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let updated: serde_json::Value = res.json().await.unwrap();
    assert_eq!(updated["status"], "shipped");

    handle.abort();
}

#[tokio::test]
async fn admin_surface_requires_bearer_token() {
    let (addr, handle) = spawn_server().await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/admin/orders", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::UNAUTHORIZED);

    let res = client
        .get(format!("{}/admin/orders", addr))
        .bearer_auth("wrong-token")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::UNAUTHORIZED);

    let res = client
        .patch(format!(
            "{}/admin/orders/{}/status",
            addr,
            uuid::Uuid::new_v4()
        ))
        .json(&json!({ "status": "paid" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::UNAUTHORIZED);

    handle.abort();
}

#[tokio::test]
async fn validation_rejects_bad_submissions() {
    let (addr, handle) = spawn_server().await;
    let client = reqwest::Client::new();

    // Empty cart cannot be built into an order.
    let res = client
        .post(format!("{}/orders", addr))
        .json(&json!({
            "items": [],
            "customer": { "kind": "partial", "name": null, "email": null, "phone": null }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);

    // Unknown fields are rejected at the boundary, not passed through.
    let mut body = order_body();
    body["notes"] = json!("gift wrap please");
    let res = client
        .post(format!("{}/orders", addr))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert!(res.status().is_client_error());

    // Unknown status string on the admin filter.
    let res = client
        .get(format!("{}/admin/orders?status=refunded", addr))
        .bearer_auth("secret-admin-token")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::BAD_REQUEST);

    handle.abort();
}

#[tokio::test]
async fn cancellation_signal_keeps_order_created() {
    let (addr, handle) = spawn_server().await;
    let client = reqwest::Client::new();

    let created: serde_json::Value = client
        .post(format!("{}/orders", addr))
        .json(&order_body())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let provider_order_id = created["provider_order_id"].as_str().unwrap();

    let outcome: serde_json::Value = client
        .post(format!("{}/payments/callback", addr))
        .json(&json!({
            "result": "cancelled",
            "provider_order_id": provider_order_id
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(outcome["outcome"], "cancelled");

    let body: serde_json::Value = client
        .get(format!("{}/admin/orders", addr))
        .bearer_auth("secret-admin-token")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["orders"][0]["status"], "created");

    handle.abort();
}
