use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::order::{OrderRecord, OrderStatus};

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("db error: {0}")]
    Db(String),
}

/// Durable store of order records. Append-only: there is no delete, the
/// admin surface only mutates status.
#[async_trait]
pub trait OrderStore: Send + Sync + 'static {
    async fn create(&self, record: OrderRecord) -> Result<OrderRecord, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<OrderRecord>, StoreError>;

    /// Point lookup by the payment provider's order id; how callbacks are
    /// correlated back to a record.
    async fn find_by_provider_order_id(
        &self,
        provider_order_id: &str,
    ) -> Result<Option<OrderRecord>, StoreError>;

    /// Newest-first, optionally filtered by status, bounded by `limit`.
    async fn list(
        &self,
        status: Option<OrderStatus>,
        limit: usize,
    ) -> Result<Vec<OrderRecord>, StoreError>;

    /// Unrestricted operator transition.
    async fn set_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<OrderRecord>, StoreError>;

    /// Match-and-set `created -> paid`. Must be idempotent: redelivering the
    /// same callback leaves the record as-is. Returns `None` when no record
    /// matches the provider order id.
    async fn mark_paid(
        &self,
        provider_order_id: &str,
        payment_id: &str,
    ) -> Result<Option<OrderRecord>, StoreError>;

    /// `created -> failed` on a failure signal; no-op for any other state.
    async fn mark_failed(&self, provider_order_id: &str)
        -> Result<Option<OrderRecord>, StoreError>;
}
