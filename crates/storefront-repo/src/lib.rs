#[cfg(not(any(feature = "memory", feature = "sqlite")))]
compile_error!("Enable a store feature: `memory` or `sqlite`.");

use async_trait::async_trait;
use storefront_types::domain::order::{OrderRecord, OrderStatus};
use storefront_types::ports::order_store::{OrderStore, StoreError};
use uuid::Uuid;

#[cfg(feature = "memory")]
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

/// Feature-selected store facade. With both features enabled the sqlite
/// adapter is the durable backend.
pub struct Store {
    #[cfg(all(feature = "memory", not(feature = "sqlite")))]
    memory: memory::InMemoryStore,
    #[cfg(feature = "sqlite")]
    sqlite: sqlite::SqliteStore,
}

pub async fn build_store(url: Option<&str>) -> anyhow::Result<Store> {
    Store::build(url).await
}

impl Store {
    #[cfg(all(feature = "memory", not(feature = "sqlite")))]
    pub async fn build(_: Option<&str>) -> anyhow::Result<Self> {
        Ok(Self {
            memory: memory::InMemoryStore::new(),
        })
    }

    #[cfg(feature = "sqlite")]
    pub async fn build(database_url: Option<&str>) -> anyhow::Result<Self> {
        let url = database_url.unwrap_or("sqlite://orders.db");
        let sqlite = sqlite::SqliteStore::new(url).await?;
        Ok(Self { sqlite })
    }

    #[cfg(all(feature = "memory", not(feature = "sqlite")))]
    fn inner(&self) -> &dyn OrderStore {
        &self.memory
    }

    #[cfg(feature = "sqlite")]
    fn inner(&self) -> &dyn OrderStore {
        &self.sqlite
    }
}

#[async_trait]
impl OrderStore for Store {
    async fn create(&self, record: OrderRecord) -> Result<OrderRecord, StoreError> {
        self.inner().create(record).await
    }

    async fn get(&self, id: Uuid) -> Result<Option<OrderRecord>, StoreError> {
        self.inner().get(id).await
    }

    async fn find_by_provider_order_id(
        &self,
        provider_order_id: &str,
    ) -> Result<Option<OrderRecord>, StoreError> {
        self.inner().find_by_provider_order_id(provider_order_id).await
    }

    async fn list(
        &self,
        status: Option<OrderStatus>,
        limit: usize,
    ) -> Result<Vec<OrderRecord>, StoreError> {
        self.inner().list(status, limit).await
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<OrderRecord>, StoreError> {
        self.inner().set_status(id, status).await
    }

    async fn mark_paid(
        &self,
        provider_order_id: &str,
        payment_id: &str,
    ) -> Result<Option<OrderRecord>, StoreError> {
        self.inner().mark_paid(provider_order_id, payment_id).await
    }

    async fn mark_failed(
        &self,
        provider_order_id: &str,
    ) -> Result<Option<OrderRecord>, StoreError> {
        self.inner().mark_failed(provider_order_id).await
    }
}
