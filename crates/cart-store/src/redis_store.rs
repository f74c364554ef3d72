use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Script};

use crate::store::validate_quantity;
use crate::{Cart, CartItem, CartStore, CartStoreError, ProductId, Result, UserId};

/// Merges a quantity into the JSON cart stored at KEYS[1] in one server-side
/// step, so concurrent adds for the same user cannot overwrite each other.
///
/// ARGV[1] = product id, ARGV[2] = quantity. Quantities saturate at u32::MAX.
const ADD_ITEM_SCRIPT: &str = r#"
local raw = redis.call("GET", KEYS[1])
local items = {}
if raw then
    items = cjson.decode(raw)
end
local qty = tonumber(ARGV[2])
local found = false
for _, item in ipairs(items) do
    if item.product_id == ARGV[1] then
        item.quantity = math.min(item.quantity + qty, 4294967295)
        found = true
        break
    end
end
if not found then
    table.insert(items, { product_id = ARGV[1], quantity = qty })
end
redis.call("SET", KEYS[1], cjson.encode(items))
return #items
"#;

/// Durable cart store backed by Redis.
///
/// Each cart is a JSON array of [`CartItem`] stored under `cart:<user_id>`
/// with no expiry. Cloning shares the multiplexed connection.
#[derive(Clone)]
pub struct RedisCartStore {
    conn: MultiplexedConnection,
    add_item: Script,
}

impl RedisCartStore {
    /// Connects to Redis and verifies the connection with a PING.
    ///
    /// `addr` may be a full `redis://` URL or a bare `host:port`. The whole
    /// handshake must finish within `timeout`.
    pub async fn connect(addr: &str, timeout: Duration) -> Result<Self> {
        let url = normalize_addr(addr);
        let client = redis::Client::open(url.as_str())?;

        let handshake = async {
            let mut conn = client.get_multiplexed_async_connection().await?;
            let _: String = redis::cmd("PING").query_async(&mut conn).await?;
            Ok::<_, redis::RedisError>(conn)
        };

        let conn = tokio::time::timeout(timeout, handshake)
            .await
            .map_err(|_| {
                CartStoreError::StoreUnavailable(format!(
                    "timed out after {}ms connecting to Redis at {addr}",
                    timeout.as_millis()
                ))
            })??;

        tracing::info!(%addr, "connected to Redis");

        Ok(Self {
            conn,
            add_item: Script::new(ADD_ITEM_SCRIPT),
        })
    }

    fn key(user_id: &UserId) -> String {
        format!("cart:{user_id}")
    }
}

#[async_trait]
impl CartStore for RedisCartStore {
    #[tracing::instrument(skip(self), fields(backend = "redis"))]
    async fn add_item(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<()> {
        validate_quantity(quantity)?;

        let mut conn = self.conn.clone();
        let _: i64 = self
            .add_item
            .key(Self::key(user_id))
            .arg(product_id.as_str())
            .arg(quantity)
            .invoke_async(&mut conn)
            .await?;
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(backend = "redis"))]
    async fn get_cart(&self, user_id: &UserId) -> Result<Cart> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(Self::key(user_id)).await?;

        let items = match raw {
            Some(payload) => serde_json::from_str::<Vec<CartItem>>(&payload)?,
            None => Vec::new(),
        };

        Ok(Cart {
            user_id: user_id.clone(),
            items,
        })
    }

    #[tracing::instrument(skip(self), fields(backend = "redis"))]
    async fn empty_cart(&self, user_id: &UserId) -> Result<()> {
        let payload = serde_json::to_string(&Vec::<CartItem>::new())?;
        let mut conn = self.conn.clone();
        let _: () = conn.set(Self::key(user_id), payload).await?;
        Ok(())
    }
}

/// Accepts the `host:port` form used by deployment manifests as well as URLs.
fn normalize_addr(addr: &str) -> String {
    if addr.contains("://") {
        addr.to_string()
    } else {
        format!("redis://{addr}")
    }
}
