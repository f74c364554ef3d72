//! Checkout error types.

use std::time::Duration;

use cart_store::CartStoreError;
use common::{Money, MoneyError, ProductId, UserId};
use thiserror::Error;

use crate::services::{CatalogError, ChargeError, ConversionError, ShippingError};
use crate::steps;

/// Failure of a single bounded downstream call.
///
/// A timeout is treated exactly like an error returned by the service.
#[derive(Debug, Error)]
pub enum CallError<E> {
    #[error(transparent)]
    Service(E),

    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
}

impl<E> CallError<E> {
    /// Returns the service error, if the call did not time out.
    pub fn service(&self) -> Option<&E> {
        match self {
            CallError::Service(e) => Some(e),
            CallError::Timeout(_) => None,
        }
    }
}

/// Fatal checkout failures.
///
/// Every variant except [`CheckoutError::OrderPlacement`] is raised before
/// any money moved (or after a charge attempt that failed), so the whole
/// call is safe to retry.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart could not be read.
    #[error("Cart unavailable: {0}")]
    CartUnavailable(#[source] CallError<CartStoreError>),

    /// The cart has no line items.
    #[error("Cart for user {0} is empty")]
    EmptyCart(UserId),

    /// A cart line could not be resolved in the catalog.
    #[error("Product lookup failed for {product_id}: {source}")]
    ProductLookup {
        product_id: ProductId,
        #[source]
        source: CallError<CatalogError>,
    },

    /// A line price could not be converted.
    #[error("Currency conversion failed: {0}")]
    Currency(#[source] CallError<ConversionError>),

    /// Totals could not be computed.
    #[error("Pricing failed: {0}")]
    Pricing(#[from] MoneyError),

    /// No shipping quote could be obtained.
    #[error("Shipping quote failed: {0}")]
    ShippingQuote(#[source] CallError<ShippingError>),

    /// The shipping quote could not be converted into the order currency.
    #[error("Shipping quote conversion failed: {0}")]
    ShippingCurrency(#[source] CallError<ConversionError>),

    /// The charge was not accepted.
    #[error("Payment failed: {0}")]
    Payment(#[source] CallError<ChargeError>),

    /// The card was charged but the shipment could not be confirmed.
    ///
    /// Retrying the checkout would charge the card again. The transaction ID
    /// is kept here so the payment can be reconciled.
    #[error(
        "Order placement failed: payment {transaction_id} for {amount_charged} succeeded but shipment confirmation failed: {source}"
    )]
    OrderPlacement {
        transaction_id: String,
        amount_charged: Money,
        #[source]
        source: CallError<ShippingError>,
    },

    /// The caller went away before the named step started.
    #[error("Checkout cancelled before step '{step}'")]
    Cancelled { step: &'static str },
}

impl CheckoutError {
    /// True when repeating the whole checkout cannot cause a double charge.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, CheckoutError::OrderPlacement { .. })
    }

    /// The step the checkout stopped at.
    pub fn step(&self) -> &'static str {
        match self {
            CheckoutError::CartUnavailable(_) | CheckoutError::EmptyCart(_) => steps::FETCH_CART,
            CheckoutError::ProductLookup { .. } => steps::RESOLVE_ITEMS,
            CheckoutError::Currency(_) | CheckoutError::Pricing(_) => steps::CONVERT_PRICES,
            CheckoutError::ShippingQuote(_) | CheckoutError::ShippingCurrency(_) => {
                steps::QUOTE_SHIPPING
            }
            CheckoutError::Payment(_) => steps::CHARGE_PAYMENT,
            CheckoutError::OrderPlacement { .. } => steps::CONFIRM_SHIPMENT,
            CheckoutError::Cancelled { step } => *step,
        }
    }

    /// Transaction ID of a charge that went through, if any.
    pub fn transaction_id(&self) -> Option<&str> {
        match self {
            CheckoutError::OrderPlacement { transaction_id, .. } => Some(transaction_id),
            _ => None,
        }
    }
}
