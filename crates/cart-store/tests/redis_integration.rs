//! Redis backend integration tests
//!
//! These tests share one Redis container. Each test uses its own user IDs,
//! so they can run in parallel:
//!
//! ```bash
//! cargo test -p cart-store --test redis_integration
//! ```

use std::sync::Arc;
use std::time::Duration;

use cart_store::{
    BackendKind, CartItem, CartStore, CartStoreConfig, CartStoreError, ProductId, RedisCartStore,
    UserId, connect,
};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::redis::{REDIS_PORT, Redis};
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Redis>,
    addr: String,
}

static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Redis::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(REDIS_PORT).await.unwrap();

            Arc::new(ContainerInfo {
                container,
                addr: format!("{}:{}", host, port),
            })
        })
        .await
        .clone()
}

async fn get_test_store() -> RedisCartStore {
    let info = get_container_info().await;
    RedisCartStore::connect(&info.addr, Duration::from_secs(5))
        .await
        .unwrap()
}

#[tokio::test]
async fn unknown_user_gets_empty_cart() {
    let store = get_test_store().await;
    let cart = store.get_cart(&UserId::new("redis-unknown")).await.unwrap();
    assert!(cart.is_empty());
}

#[tokio::test]
async fn add_item_merges_by_product() {
    let store = get_test_store().await;
    let user = UserId::new("redis-merge");
    let p1 = ProductId::new("P1");

    store.add_item(&user, &p1, 2).await.unwrap();
    store.add_item(&user, &p1, 3).await.unwrap();
    store
        .add_item(&user, &ProductId::new("P2"), 1)
        .await
        .unwrap();

    let cart = store.get_cart(&user).await.unwrap();
    assert_eq!(cart.items.len(), 2);
    assert_eq!(cart.quantity_of(&p1), Some(5));
    assert_eq!(cart.quantity_of(&ProductId::new("P2")), Some(1));
}

#[tokio::test]
async fn empty_then_get_yields_no_items() {
    let store = get_test_store().await;
    let user = UserId::new("redis-empty");

    store
        .add_item(&user, &ProductId::new("P1"), 4)
        .await
        .unwrap();
    store.empty_cart(&user).await.unwrap();
    store.empty_cart(&user).await.unwrap();

    let cart = store.get_cart(&user).await.unwrap();
    assert!(cart.is_empty());

    // Adding after an empty starts a fresh line.
    store
        .add_item(&user, &ProductId::new("P1"), 1)
        .await
        .unwrap();
    let cart = store.get_cart(&user).await.unwrap();
    assert_eq!(cart.items, vec![CartItem::new("P1", 1)]);
}

#[tokio::test]
async fn zero_quantity_rejected_before_storage() {
    let store = get_test_store().await;
    let user = UserId::new("redis-zero");

    let result = store.add_item(&user, &ProductId::new("P1"), 0).await;
    assert!(matches!(
        result,
        Err(CartStoreError::InvalidQuantity { .. })
    ));
    assert!(store.get_cart(&user).await.unwrap().is_empty());
}

#[tokio::test]
async fn concurrent_adds_are_atomic_per_key() {
    let store = get_test_store().await;
    let user = UserId::new("redis-concurrent");

    let mut handles = Vec::new();
    for _ in 0..25 {
        let store = store.clone();
        let user = user.clone();
        handles.push(tokio::spawn(async move {
            store
                .add_item(&user, &ProductId::new("P1"), 2)
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let cart = store.get_cart(&user).await.unwrap();
    assert_eq!(cart.quantity_of(&ProductId::new("P1")), Some(50));
}

#[tokio::test]
async fn carts_survive_a_new_connection() {
    let user = UserId::new("redis-durable");
    {
        let store = get_test_store().await;
        store
            .add_item(&user, &ProductId::new("P7"), 3)
            .await
            .unwrap();
    }

    let store = get_test_store().await;
    let cart = store.get_cart(&user).await.unwrap();
    assert_eq!(cart.quantity_of(&ProductId::new("P7")), Some(3));
}

#[tokio::test]
async fn connect_selects_redis_when_reachable() {
    let info = get_container_info().await;
    let selected = connect(&CartStoreConfig {
        redis_addr: Some(info.addr.clone()),
        connect_timeout: Duration::from_secs(5),
    })
    .await;

    assert_eq!(selected.kind, BackendKind::Redis);
    assert!(!selected.kind.is_degraded());
}
