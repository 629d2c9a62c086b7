use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use storefront_types::domain::order::{OrderRecord, OrderStatus};
use storefront_types::ports::order_store::{OrderStore, StoreError};
use uuid::Uuid;

#[derive(Clone)]
pub struct InMemoryStore {
    map: Arc<DashMap<Uuid, OrderRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            map: Arc::new(DashMap::new()),
        }
    }

    fn id_for_provider(&self, provider_order_id: &str) -> Option<Uuid> {
        self.map
            .iter()
            .find(|kv| kv.value().provider_order_id == provider_order_id)
            .map(|kv| *kv.key())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn create(&self, record: OrderRecord) -> Result<OrderRecord, StoreError> {
        self.map.insert(record.id, record.clone());
        Ok(record)
    }

    async fn get(&self, id: Uuid) -> Result<Option<OrderRecord>, StoreError> {
        Ok(self.map.get(&id).map(|r| r.clone()))
    }

    async fn find_by_provider_order_id(
        &self,
        provider_order_id: &str,
    ) -> Result<Option<OrderRecord>, StoreError> {
        Ok(self
            .id_for_provider(provider_order_id)
            .and_then(|id| self.map.get(&id).map(|r| r.clone())))
    }

    async fn list(
        &self,
        status: Option<OrderStatus>,
        limit: usize,
    ) -> Result<Vec<OrderRecord>, StoreError> {
        let mut records: Vec<OrderRecord> = self
            .map
            .iter()
            .map(|kv| kv.value().clone())
            .filter(|r| status.map_or(true, |s| r.status == s))
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records.truncate(limit);
        Ok(records)
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<OrderRecord>, StoreError> {
        if let Some(mut v) = self.map.get_mut(&id) {
            v.set_status(status);
            return Ok(Some(v.clone()));
        }
        Ok(None)
    }

    async fn mark_paid(
        &self,
        provider_order_id: &str,
        payment_id: &str,
    ) -> Result<Option<OrderRecord>, StoreError> {
        let Some(id) = self.id_for_provider(provider_order_id) else {
            return Ok(None);
        };
        if let Some(mut v) = self.map.get_mut(&id) {
            v.apply_payment(payment_id);
            return Ok(Some(v.clone()));
        }
        Ok(None)
    }

    async fn mark_failed(
        &self,
        provider_order_id: &str,
    ) -> Result<Option<OrderRecord>, StoreError> {
        let Some(id) = self.id_for_provider(provider_order_id) else {
            return Ok(None);
        };
        if let Some(mut v) = self.map.get_mut(&id) {
            v.apply_failure();
            return Ok(Some(v.clone()));
        }
        Ok(None)
    }
}
