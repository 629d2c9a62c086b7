#![cfg(feature = "memory")]

use storefront_repo::memory::InMemoryStore;
use storefront_types::domain::intent::{CustomerInfo, OrderIntent};
use storefront_types::domain::order::{ItemSnapshot, OrderRecord, OrderStatus};
use storefront_types::ports::order_store::OrderStore;

fn record(provider_order_id: &str, amount: i64) -> OrderRecord {
    let intent = OrderIntent {
        amount,
        currency: "INR".into(),
        items: vec![ItemSnapshot {
            name: "Linen Shirt".into(),
            unit_price: amount,
            qty: 1,
        }],
        customer: CustomerInfo::Partial {
            name: None,
            email: None,
            phone: None,
        },
    };
    OrderRecord::from_intent(intent, provider_order_id.into())
}

#[tokio::test]
async fn create_get_and_find_by_provider_id() {
    let store = InMemoryStore::new();
    let created = store.create(record("order_a", 2499)).await.unwrap();

    let by_id = store.get(created.id).await.unwrap().unwrap();
    assert_eq!(by_id.provider_order_id, "order_a");

    let by_provider = store
        .find_by_provider_order_id("order_a")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_provider.id, created.id);

    assert!(store
        .find_by_provider_order_id("order_missing")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn mark_paid_is_idempotent_match_and_set() {
    let store = InMemoryStore::new();
    store.create(record("order_a", 2499)).await.unwrap();

    let paid = store.mark_paid("order_a", "pay_1").await.unwrap().unwrap();
    assert_eq!(paid.status, OrderStatus::Paid);
    assert_eq!(paid.provider_payment_id.as_deref(), Some("pay_1"));

    // Redelivered callback: same end state, payment id unchanged.
    let again = store.mark_paid("order_a", "pay_1").await.unwrap().unwrap();
    assert_eq!(again.status, OrderStatus::Paid);
    assert_eq!(again.provider_payment_id.as_deref(), Some("pay_1"));

    assert!(store.mark_paid("order_x", "pay_2").await.unwrap().is_none());
}

#[tokio::test]
async fn mark_failed_only_downs_created_orders() {
    let store = InMemoryStore::new();
    store.create(record("order_a", 500)).await.unwrap();
    store.create(record("order_b", 700)).await.unwrap();
    store.mark_paid("order_b", "pay_1").await.unwrap();

    let failed = store.mark_failed("order_a").await.unwrap().unwrap();
    assert_eq!(failed.status, OrderStatus::Failed);

    // A paid order is not demoted by a stray failure signal.
    let still_paid = store.mark_failed("order_b").await.unwrap().unwrap();
    assert_eq!(still_paid.status, OrderStatus::Paid);
}

#[tokio::test]
async fn list_is_newest_first_filtered_and_bounded() {
    let store = InMemoryStore::new();
    for i in 0..5 {
        store
            .create(record(&format!("order_{i}"), 100 + i))
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }
    store.mark_paid("order_3", "pay_3").await.unwrap();

    let all = store.list(None, 10).await.unwrap();
    assert_eq!(all.len(), 5);
    assert_eq!(all[0].provider_order_id, "order_4");
    assert_eq!(all[4].provider_order_id, "order_0");

    let bounded = store.list(None, 2).await.unwrap();
    assert_eq!(bounded.len(), 2);
    assert_eq!(bounded[0].provider_order_id, "order_4");

    let paid = store.list(Some(OrderStatus::Paid), 10).await.unwrap();
    assert_eq!(paid.len(), 1);
    assert_eq!(paid[0].provider_order_id, "order_3");
}

#[tokio::test]
async fn operator_set_status_is_unrestricted() {
    let store = InMemoryStore::new();
    let created = store.create(record("order_a", 2499)).await.unwrap();

    let shipped = store
        .set_status(created.id, OrderStatus::Shipped)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(shipped.status, OrderStatus::Shipped);

    let missing = store
        .set_status(uuid::Uuid::new_v4(), OrderStatus::Paid)
        .await
        .unwrap();
    assert!(missing.is_none());
}
