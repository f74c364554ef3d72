//! Shared types for the storefront checkout core.

pub mod money;
pub mod types;

pub use money::{CurrencyCode, Money, MoneyError};
pub use types::{OrderId, ProductId, UserId};
