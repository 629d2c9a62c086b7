use axum::{
    extract::State,
    routing::{get, patch, post},
    serve, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::application::checkout_service::{CheckoutHandle, CheckoutService, PaymentOutcome};
use crate::errors::AppError;
use storefront_types::domain::cart::CartLine;
use storefront_types::domain::intent::{CustomerInfo, OrderIntent, ShippingRule};
use storefront_types::domain::order::{OrderRecord, OrderStatus};
use storefront_types::ports::order_store::OrderStore;
use storefront_types::ports::payment_gateway::{PaymentGateway, PaymentSignal};

const DEFAULT_LIST_LIMIT: usize = 50;
const MAX_LIST_LIMIT: usize = 200;

#[derive(Clone)]
pub struct HttpServerConfig {
    pub port: String,
    pub admin_token: String,
    pub shipping: ShippingRule,
}

pub struct HttpServer<S, G>
where
    S: OrderStore,
    G: PaymentGateway,
{
    pub state: AppState<S, G>,
    pub config: HttpServerConfig,
}

pub struct AppState<S, G>
where
    S: OrderStore,
    G: PaymentGateway,
{
    pub service: Arc<CheckoutService<S, G>>,
    pub admin_token: Arc<str>,
    pub shipping: ShippingRule,
}

impl<S: OrderStore, G: PaymentGateway> Clone for AppState<S, G> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            admin_token: self.admin_token.clone(),
            shipping: self.shipping,
        }
    }
}

/// Checkout submission. Unknown or extra fields are rejected at the
/// boundary rather than passed through.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlaceOrderRequest {
    pub items: Vec<LineInput>,
    pub customer: CustomerInfo,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineInput {
    pub product_id: String,
    pub name: String,
    pub unit_price: i64,
    pub size: String,
    #[serde(default)]
    pub color: String,
    pub quantity: u32,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub slug: String,
}

impl From<LineInput> for CartLine {
    fn from(input: LineInput) -> Self {
        CartLine {
            product_id: input.product_id,
            name: input.name,
            unit_price: input.unit_price,
            image: input.image,
            size: input.size,
            color: input.color,
            quantity: input.quantity,
            slug: input.slug,
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusUpdate {
    pub status: OrderStatus,
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct ListOrdersResponse {
    pub orders: Vec<OrderRecord>,
}

impl<S, G> HttpServer<S, G>
where
    S: OrderStore,
    G: PaymentGateway,
{
    pub async fn new(
        service: CheckoutService<S, G>,
        config: HttpServerConfig,
    ) -> anyhow::Result<Self> {
        let state = AppState {
            service: Arc::new(service),
            admin_token: config.admin_token.clone().into(),
            shipping: config.shipping,
        };
        Ok(Self { state, config })
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &axum::extract::Request<_>| {
                let uri = request.uri().to_string();
                let request_id = Uuid::new_v4();
                tracing::info_span!(
                    "http_request",
                    %request_id,
                    method = %request.method(),
                    uri
                )
            })
            .on_request(
                |request: &axum::extract::Request<_>, span: &tracing::Span| {
                    tracing::info!(
                        parent: span,
                        method = %request.method(),
                        uri = %request.uri(),
                        "request"
                    );
                },
            )
            .on_response(
                |response: &axum::response::Response, latency: Duration, span: &tracing::Span| {
                    tracing::info!(
                        parent: span,
                        status = %response.status(),
                        latency_ms = %latency.as_millis(),
                        "response"
                    );
                },
            );

        let app = Router::new()
            .route("/health", get(health))
            .route("/orders", post(place_order::<S, G>))
            .route("/payments/callback", post(payment_callback::<S, G>))
            .route("/admin/orders", get(list_orders::<S, G>))
            .route("/admin/orders/{id}/status", patch(set_status::<S, G>))
            .layer(trace_layer)
            .with_state(self.state);

        let addr: SocketAddr = format!("0.0.0.0:{}", self.config.port).parse()?;
        tracing::info!("starting server on {}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await?;
        serve(listener, app.into_make_service()).await?;
        Ok(())
    }
}

fn require_admin<S: OrderStore, G: PaymentGateway>(
    state: &AppState<S, G>,
    headers: &axum::http::HeaderMap,
) -> Result<(), AppError> {
    let presented = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    match presented {
        Some(token) if token == &*state.admin_token => Ok(()),
        _ => Err(AppError::Unauthorized),
    }
}

async fn health() -> (axum::http::StatusCode, Json<serde_json::Value>) {
    (
        axum::http::StatusCode::OK,
        Json(serde_json::json!({ "status": "ok" })),
    )
}

async fn place_order<S, G>(
    State(state): State<AppState<S, G>>,
    Json(payload): Json<PlaceOrderRequest>,
) -> Result<(axum::http::StatusCode, Json<CheckoutHandle>), AppError>
where
    S: OrderStore,
    G: PaymentGateway,
{
    let lines: Vec<CartLine> = payload.items.into_iter().map(CartLine::from).collect();
    let intent = OrderIntent::build(&lines, &state.shipping, payload.customer)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let handle = state.service.place_order(intent).await?;
    Ok((axum::http::StatusCode::CREATED, Json(handle)))
}

async fn payment_callback<S, G>(
    State(state): State<AppState<S, G>>,
    Json(signal): Json<PaymentSignal>,
) -> Json<PaymentOutcome>
where
    S: OrderStore,
    G: PaymentGateway,
{
    Json(state.service.handle_payment(signal).await)
}

async fn list_orders<S, G>(
    State(state): State<AppState<S, G>>,
    headers: axum::http::HeaderMap,
    axum::extract::Query(query): axum::extract::Query<ListQuery>,
) -> Result<Json<ListOrdersResponse>, AppError>
where
    S: OrderStore,
    G: PaymentGateway,
{
    require_admin(&state, &headers)?;
    let status = match query.status.as_deref() {
        None | Some("all") => None,
        Some(s) => Some(
            OrderStatus::parse(s)
                .ok_or_else(|| AppError::BadRequest(format!("unknown status {s}")))?,
        ),
    };
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .min(MAX_LIST_LIMIT);
    let orders = state.service.list_orders(status, limit).await?;
    Ok(Json(ListOrdersResponse { orders }))
}

async fn set_status<S, G>(
    State(state): State<AppState<S, G>>,
    headers: axum::http::HeaderMap,
    axum::extract::Path(id): axum::extract::Path<String>,
    Json(payload): Json<StatusUpdate>,
) -> Result<Json<OrderRecord>, AppError>
where
    S: OrderStore,
    G: PaymentGateway,
{
    require_admin(&state, &headers)?;
    let uuid = Uuid::parse_str(&id).map_err(|e| AppError::BadRequest(e.to_string()))?;
    let updated = state.service.set_status(uuid, payload.status).await?;
    Ok(Json(updated))
}
