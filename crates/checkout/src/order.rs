//! Order request and result types.

use chrono::{DateTime, Utc};
use common::{CurrencyCode, Money, OrderId, ProductId, UserId};
use serde::{Deserialize, Serialize};

/// Shipping destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub zip_code: String,
}

/// Payment credential. Never serialized back out, and `Debug` only shows the
/// last four digits.
#[derive(Clone, Deserialize)]
pub struct CreditCard {
    pub number: String,
    pub cvv: u32,
    pub expiration_year: i32,
    pub expiration_month: u32,
}

impl CreditCard {
    /// Last four digits, for logs and receipts.
    pub fn last_four(&self) -> &str {
        let len = self.number.len();
        self.number.get(len.saturating_sub(4)..).unwrap_or("")
    }
}

impl std::fmt::Debug for CreditCard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreditCard")
            .field("number", &format_args!("****{}", self.last_four()))
            .field("expiration_year", &self.expiration_year)
            .field("expiration_month", &self.expiration_month)
            .finish_non_exhaustive()
    }
}

/// Everything needed to place one order. Built per call, never stored.
#[derive(Debug, Clone, Deserialize)]
pub struct OrderRequest {
    pub user_id: UserId,
    pub currency_code: CurrencyCode,
    pub address: Address,
    pub email: String,
    pub credit_card: CreditCard,
}

/// A purchased line, priced in the requested currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
    /// `unit_price * quantity`.
    pub cost: Money,
}

/// The outcome of a successful checkout.
///
/// This is the only record of what was bought: the cart is emptied
/// afterwards and orders are not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderResult {
    pub order_id: OrderId,
    pub items: Vec<OrderItem>,
    pub subtotal: Money,
    pub shipping_cost: Money,
    /// Amount charged: subtotal plus shipping.
    pub total_paid: Money,
    pub shipping_tracking_id: String,
    pub shipping_address: Address,
    pub transaction_id: String,
    pub placed_at: DateTime<Utc>,
}

impl OrderResult {
    /// Total number of units across all lines.
    pub fn unit_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}
