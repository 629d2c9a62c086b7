use anyhow::Context;
use serde::Deserialize;
use std::env;
use storefront_types::domain::intent::ShippingRule;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server_port: String,
    pub database_url: Option<String>,
    /// Opaque bearer credential for the admin mutation surface.
    pub admin_token: String,
    pub payment_base_url: String,
    pub payment_key_id: String,
    pub payment_key_secret: String,
    pub shipping: ShippingRule,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let server_port = env::var("SERVER_PORT").unwrap_or_else(|_| "3000".into());
        let database_url = env::var("DATABASE_URL").ok();
        let admin_token = env::var("ADMIN_TOKEN").context("ADMIN_TOKEN not set")?;
        let payment_base_url =
            env::var("PAYMENT_BASE_URL").unwrap_or_else(|_| "https://api.razorpay.com".into());
        let payment_key_id = env::var("PAYMENT_KEY_ID").context("PAYMENT_KEY_ID not set")?;
        let payment_key_secret =
            env::var("PAYMENT_KEY_SECRET").context("PAYMENT_KEY_SECRET not set")?;
        let shipping = ShippingRule {
            free_over: parse_amount("FREE_SHIPPING_OVER", 2000)?,
            flat_fee: parse_amount("SHIPPING_FLAT_FEE", 199)?,
        };
        Ok(Self {
            server_port,
            database_url,
            admin_token,
            payment_base_url,
            payment_key_id,
            payment_key_secret,
            shipping,
        })
    }
}

fn parse_amount(var: &str, default: i64) -> anyhow::Result<i64> {
    match env::var(var) {
        Ok(v) => v.parse().with_context(|| format!("{var} must be an integer")),
        Err(_) => Ok(default),
    }
}
