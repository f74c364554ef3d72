//! Cart storage for the storefront.
//!
//! Every backend implements [`CartStore`]. [`connect`] picks one at startup:
//! Redis when it is configured and reachable, otherwise the in-process
//! [`InMemoryCartStore`].

pub mod cart;
pub mod error;
pub mod memory;
pub mod redis_store;
pub mod select;
pub mod store;

pub use cart::{Cart, CartItem};
pub use common::{ProductId, UserId};
pub use error::{CartStoreError, Result};
pub use memory::InMemoryCartStore;
pub use redis_store::RedisCartStore;
pub use select::{BackendKind, CartStoreConfig, SelectedBackend, connect};
pub use store::CartStore;
