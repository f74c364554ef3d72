use async_trait::async_trait;

use crate::{Cart, CartStoreError, ProductId, Result, UserId};

/// Core trait for cart storage backends.
///
/// Backends are shared across request handlers, so all implementations must
/// be thread-safe (Send + Sync). Unknown users are never an error: they have
/// an empty cart.
///
/// Methods take no request context. A checkout's cart read and cart clear are
/// attributed to it through the enclosing `place_order` span, which carries
/// the correlation ID.
#[async_trait]
pub trait CartStore: Send + Sync {
    /// Adds `quantity` units of a product to the user's cart.
    ///
    /// Quantities for a product already in the cart are summed into the
    /// existing line. Fails with `InvalidQuantity` for zero.
    async fn add_item(&self, user_id: &UserId, product_id: &ProductId, quantity: u32)
    -> Result<()>;

    /// Returns the user's cart, empty if nothing was ever added.
    async fn get_cart(&self, user_id: &UserId) -> Result<Cart>;

    /// Replaces the user's cart with an empty one. Idempotent.
    async fn empty_cart(&self, user_id: &UserId) -> Result<()>;
}

/// Rejects quantities the contract does not allow, before any backend work.
pub(crate) fn validate_quantity(quantity: u32) -> Result<()> {
    if quantity == 0 {
        return Err(CartStoreError::InvalidQuantity { quantity });
    }
    Ok(())
}
