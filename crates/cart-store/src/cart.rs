//! Cart contents.

use common::{ProductId, UserId};
use serde::{Deserialize, Serialize};

/// One line of a cart.
///
/// This is also the stored representation: the Redis backend keeps a JSON
/// array of these under the user's key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

impl CartItem {
    pub fn new(product_id: impl Into<ProductId>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// A user's cart. Line order carries no meaning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    pub user_id: UserId,
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Creates an empty cart for a user.
    pub fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            items: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the quantity held for a product, if present.
    pub fn quantity_of(&self, product_id: &ProductId) -> Option<u32> {
        self.items
            .iter()
            .find(|item| &item.product_id == product_id)
            .map(|item| item.quantity)
    }
}

/// Merges a quantity into a list of lines, summing with an existing line for
/// the same product or appending a new one.
pub(crate) fn merge_item(items: &mut Vec<CartItem>, product_id: &ProductId, quantity: u32) {
    match items.iter_mut().find(|item| &item.product_id == product_id) {
        Some(existing) => existing.quantity = existing.quantity.saturating_add(quantity),
        None => items.push(CartItem::new(product_id.clone(), quantity)),
    }
}
