//! Startup-time choice of cart backend.

use std::sync::Arc;
use std::time::Duration;

use crate::{CartStore, InMemoryCartStore, RedisCartStore};

/// Which backend ended up serving carts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Redis,
    InMemory,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Redis => "redis",
            BackendKind::InMemory => "in-memory",
        }
    }

    /// True when carts are not durable.
    pub fn is_degraded(&self) -> bool {
        matches!(self, BackendKind::InMemory)
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cart backend settings.
#[derive(Debug, Clone)]
pub struct CartStoreConfig {
    /// Redis address; `None` selects the in-memory backend outright.
    pub redis_addr: Option<String>,
    /// Upper bound for the connect + PING handshake.
    pub connect_timeout: Duration,
}

impl Default for CartStoreConfig {
    fn default() -> Self {
        Self {
            redis_addr: None,
            connect_timeout: Duration::from_secs(5),
        }
    }
}

/// The backend chosen at startup, behind the shared trait object.
#[derive(Clone)]
pub struct SelectedBackend {
    pub store: Arc<dyn CartStore>,
    pub kind: BackendKind,
}

/// Picks the cart backend once at startup.
///
/// Redis is used when configured and reachable. If it is configured but the
/// handshake fails, the service keeps running on the in-memory backend: the
/// fallback is logged at warn level and exported as the
/// `cart_store_degraded` gauge so operators can see carts are not durable.
pub async fn connect(config: &CartStoreConfig) -> SelectedBackend {
    let Some(addr) = config.redis_addr.as_deref() else {
        tracing::info!("REDIS_ADDR not set, using in-memory cart store");
        return in_memory();
    };

    match RedisCartStore::connect(addr, config.connect_timeout).await {
        Ok(store) => {
            metrics::gauge!("cart_store_degraded").set(0.0);
            SelectedBackend {
                store: Arc::new(store),
                kind: BackendKind::Redis,
            }
        }
        Err(e) => {
            tracing::warn!(
                %addr,
                error = %e,
                "failed to connect to Redis, falling back to in-memory cart store; carts will not survive a restart"
            );
            in_memory()
        }
    }
}

fn in_memory() -> SelectedBackend {
    metrics::gauge!("cart_store_degraded").set(1.0);
    SelectedBackend {
        store: Arc::new(InMemoryCartStore::new()),
        kind: BackendKind::InMemory,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ProductId, UserId};

    #[tokio::test]
    async fn test_no_address_selects_in_memory() {
        let selected = connect(&CartStoreConfig::default()).await;
        assert_eq!(selected.kind, BackendKind::InMemory);
        assert!(selected.kind.is_degraded());
    }

    #[tokio::test]
    async fn test_unreachable_redis_falls_back() {
        let config = CartStoreConfig {
            redis_addr: Some("127.0.0.1:1".to_string()),
            connect_timeout: Duration::from_millis(300),
        };
        let selected = connect(&config).await;
        assert_eq!(selected.kind, BackendKind::InMemory);

        // The fallback keeps serving requests.
        let user = UserId::new("u1");
        selected
            .store
            .add_item(&user, &ProductId::new("P1"), 1)
            .await
            .unwrap();
        let cart = selected.store.get_cart(&user).await.unwrap();
        assert_eq!(cart.items.len(), 1);
    }

    #[test]
    fn test_backend_kind_display() {
        assert_eq!(BackendKind::Redis.to_string(), "redis");
        assert_eq!(BackendKind::InMemory.to_string(), "in-memory");
        assert!(!BackendKind::Redis.is_degraded());
    }
}
