use storefront_repo::{build_store, Store};
use storefront_types::ports::order_store::OrderStore;

#[tokio::test]
async fn builds_sqlite_store_from_url() {
    // Use a temp DB path for isolation.
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("orders-test.db");
    let url = format!("sqlite://{}", db_path.display());

    let store: Store = build_store(Some(&url)).await.expect("build store");
    // basic sanity: list should succeed and be empty
    let list = store.list(None, 10).await.expect("list");
    assert!(list.is_empty());
}
