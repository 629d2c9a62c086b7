use storefront_core::application::checkout_service::CheckoutService;
use storefront_core::config::Config;
use storefront_core::inbound::http::{HttpServer, HttpServerConfig};
use storefront_gateway::PaymentClient;
use storefront_repo::{build_store, Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env for DATABASE_URL / payment keys when present.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "debug".to_string()))
        .init();

    let config = Config::from_env()?;
    let store: Store = build_store(config.database_url.as_deref()).await?;
    let gateway = PaymentClient::new(
        &config.payment_base_url,
        &config.payment_key_id,
        &config.payment_key_secret,
    )?;
    let service = CheckoutService::new(store, gateway, config.payment_key_id.clone());

    let server_cfg = HttpServerConfig {
        port: config.server_port.clone(),
        admin_token: config.admin_token.clone(),
        shipping: config.shipping,
    };

    let http = HttpServer::new(service, server_cfg).await?;
    http.run().await
}
