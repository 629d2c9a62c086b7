use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{FromRow, SqlitePool};
use std::str::FromStr;
use storefront_types::domain::intent::CustomerInfo;
use storefront_types::domain::order::{ItemSnapshot, OrderRecord, OrderStatus};
use storefront_types::ports::order_store::{OrderStore, StoreError};
use uuid::Uuid;

pub struct SqliteStore {
    pool: SqlitePool,
}

#[derive(FromRow)]
struct DbOrder {
    id: String,
    provider_order_id: String,
    amount: i64,
    currency: String,
    status: String,
    customer_json: String,
    items_json: String,
    provider_payment_id: Option<String>,
    created_at: String,
    updated_at: String,
}

const SELECT_COLS: &str = "id, provider_order_id, amount, currency, status, customer_json, \
     items_json, provider_payment_id, created_at, updated_at";

impl DbOrder {
    fn into_record(self) -> Result<OrderRecord, StoreError> {
        let status = OrderStatus::parse(&self.status)
            .ok_or_else(|| StoreError::Db(format!("unknown status {}", self.status)))?;
        let customer: CustomerInfo = serde_json::from_str(&self.customer_json)
            .map_err(|e| StoreError::Db(e.to_string()))?;
        let items: Vec<ItemSnapshot> =
            serde_json::from_str(&self.items_json).map_err(|e| StoreError::Db(e.to_string()))?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| StoreError::Db(e.to_string()))?
            .with_timezone(&Utc);
        let updated_at = DateTime::parse_from_rfc3339(&self.updated_at)
            .map_err(|e| StoreError::Db(e.to_string()))?
            .with_timezone(&Utc);
        let id = Uuid::parse_str(&self.id).map_err(|e| StoreError::Db(e.to_string()))?;
        Ok(OrderRecord {
            id,
            provider_order_id: self.provider_order_id,
            amount: self.amount,
            currency: self.currency,
            status,
            customer,
            items,
            provider_payment_id: self.provider_payment_id,
            created_at,
            updated_at,
        })
    }
}

impl SqliteStore {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePool::connect_with(options).await?;

        let ddl = include_str!("../migrations/0001_create_orders.sql");
        sqlx::query(ddl).execute(&pool).await?;

        Ok(Self { pool })
    }

    async fn fetch_by_provider(
        &self,
        provider_order_id: &str,
    ) -> Result<Option<OrderRecord>, StoreError> {
        let row: Option<DbOrder> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLS} FROM orders WHERE provider_order_id = ?"
        ))
        .bind(provider_order_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Db(e.to_string()))?;
        row.map(|r| r.into_record()).transpose()
    }
}

#[async_trait]
impl OrderStore for SqliteStore {
    async fn create(&self, record: OrderRecord) -> Result<OrderRecord, StoreError> {
        let customer_json =
            serde_json::to_string(&record.customer).map_err(|e| StoreError::Db(e.to_string()))?;
        let items_json =
            serde_json::to_string(&record.items).map_err(|e| StoreError::Db(e.to_string()))?;
        sqlx::query(
            "INSERT INTO orders (id, provider_order_id, amount, currency, status, customer_json, \
             items_json, provider_payment_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.id.to_string())
        .bind(&record.provider_order_id)
        .bind(record.amount)
        .bind(&record.currency)
        .bind(record.status.as_str())
        .bind(customer_json)
        .bind(items_json)
        .bind(&record.provider_payment_id)
        .bind(record.created_at.to_rfc3339())
        .bind(record.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Db(e.to_string()))?;
        Ok(record)
    }

    async fn get(&self, id: Uuid) -> Result<Option<OrderRecord>, StoreError> {
        let row: Option<DbOrder> =
            sqlx::query_as(&format!("SELECT {SELECT_COLS} FROM orders WHERE id = ?"))
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| StoreError::Db(e.to_string()))?;
        row.map(|r| r.into_record()).transpose()
    }

    async fn find_by_provider_order_id(
        &self,
        provider_order_id: &str,
    ) -> Result<Option<OrderRecord>, StoreError> {
        self.fetch_by_provider(provider_order_id).await
    }

    async fn list(
        &self,
        status: Option<OrderStatus>,
        limit: usize,
    ) -> Result<Vec<OrderRecord>, StoreError> {
        let limit = limit as i64;
        let rows: Vec<DbOrder> = match status {
            Some(s) => sqlx::query_as(&format!(
                "SELECT {SELECT_COLS} FROM orders WHERE status = ? \
                 ORDER BY created_at DESC LIMIT ?"
            ))
            .bind(s.as_str())
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Db(e.to_string()))?,
            None => sqlx::query_as(&format!(
                "SELECT {SELECT_COLS} FROM orders ORDER BY created_at DESC LIMIT ?"
            ))
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Db(e.to_string()))?,
        };
        rows.into_iter().map(|r| r.into_record()).collect()
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Option<OrderRecord>, StoreError> {
        let updated = sqlx::query("UPDATE orders SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(Utc::now().to_rfc3339())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Db(e.to_string()))?;
        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        self.get(id).await
    }

    async fn mark_paid(
        &self,
        provider_order_id: &str,
        payment_id: &str,
    ) -> Result<Option<OrderRecord>, StoreError> {
        // Conditional update: only a created order takes the payment. A
        // redelivered callback matches zero rows and the fetch below returns
        // the already-paid record unchanged.
        sqlx::query(
            "UPDATE orders SET status = 'paid', provider_payment_id = ?, updated_at = ? \
             WHERE provider_order_id = ? AND status = 'created'",
        )
        .bind(payment_id)
        .bind(Utc::now().to_rfc3339())
        .bind(provider_order_id)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Db(e.to_string()))?;
        self.fetch_by_provider(provider_order_id).await
    }

    async fn mark_failed(
        &self,
        provider_order_id: &str,
    ) -> Result<Option<OrderRecord>, StoreError> {
        sqlx::query(
            "UPDATE orders SET status = 'failed', updated_at = ? \
             WHERE provider_order_id = ? AND status = 'created'",
        )
        .bind(Utc::now().to_rfc3339())
        .bind(provider_order_id)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Db(e.to_string()))?;
        self.fetch_by_provider(provider_order_id).await
    }
}
