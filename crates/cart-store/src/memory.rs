use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::cart::merge_item;
use crate::store::validate_quantity;
use crate::{Cart, CartItem, CartStore, ProductId, Result, UserId};

/// In-process cart store, used when Redis is not configured or unreachable.
///
/// Carts live for the lifetime of the process. The map is shared by every
/// request handler and guarded by a single mutex; clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCartStore {
    carts: Arc<Mutex<HashMap<UserId, Vec<CartItem>>>>,
}

impl InMemoryCartStore {
    /// Creates a new empty in-memory cart store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of users with a cart entry (including emptied carts).
    pub async fn cart_count(&self) -> usize {
        self.carts.lock().await.len()
    }
}

#[async_trait]
impl CartStore for InMemoryCartStore {
    #[tracing::instrument(skip(self), fields(backend = "in-memory"))]
    async fn add_item(
        &self,
        user_id: &UserId,
        product_id: &ProductId,
        quantity: u32,
    ) -> Result<()> {
        validate_quantity(quantity)?;

        let mut carts = self.carts.lock().await;
        let items = carts.entry(user_id.clone()).or_default();
        merge_item(items, product_id, quantity);
        Ok(())
    }

    #[tracing::instrument(skip(self), fields(backend = "in-memory"))]
    async fn get_cart(&self, user_id: &UserId) -> Result<Cart> {
        let carts = self.carts.lock().await;
        Ok(Cart {
            user_id: user_id.clone(),
            items: carts.get(user_id).cloned().unwrap_or_default(),
        })
    }

    #[tracing::instrument(skip(self), fields(backend = "in-memory"))]
    async fn empty_cart(&self, user_id: &UserId) -> Result<()> {
        let mut carts = self.carts.lock().await;
        carts.insert(user_id.clone(), Vec::new());
        Ok(())
    }
}
