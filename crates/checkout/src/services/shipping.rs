//! Shipping quoter trait and in-memory implementation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use cart_store::CartItem;
use common::{CurrencyCode, Money};
use thiserror::Error;

use super::CallRecorder;
use crate::context::RequestContext;
use crate::order::Address;

/// Errors returned by the shipping service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShippingError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("shipping service unavailable: {0}")]
    Unavailable(String),
}

/// Quotes shipping costs and books shipments.
#[async_trait]
pub trait ShippingQuoter: Send + Sync {
    /// Returns the cost of shipping `items` to `address`. No side effects.
    async fn quote(
        &self,
        ctx: &RequestContext,
        address: &Address,
        items: &[CartItem],
    ) -> Result<Money, ShippingError>;

    /// Books the shipment and returns its tracking ID.
    async fn confirm(
        &self,
        ctx: &RequestContext,
        address: &Address,
        items: &[CartItem],
    ) -> Result<String, ShippingError>;
}

/// In-memory shipping service charging a flat fee per order.
#[derive(Debug, Clone)]
pub struct InMemoryShippingQuoter {
    flat_fee: Money,
    fail_on_quote: Arc<AtomicBool>,
    fail_on_confirm: Arc<AtomicBool>,
    latency_ms: Arc<AtomicU64>,
    next_id: Arc<AtomicU32>,
    quotes: Arc<CallRecorder>,
    confirms: Arc<CallRecorder>,
}

impl InMemoryShippingQuoter {
    /// Creates a quoter charging `flat_fee` for every order.
    pub fn new(flat_fee: Money) -> Self {
        Self {
            flat_fee,
            fail_on_quote: Arc::default(),
            fail_on_confirm: Arc::default(),
            latency_ms: Arc::default(),
            next_id: Arc::default(),
            quotes: Arc::default(),
            confirms: Arc::default(),
        }
    }

    /// A quoter charging 8.99 in `currency`.
    pub fn with_default_fee(currency: CurrencyCode) -> Self {
        Self::new(Money::from_cents(899, currency))
    }

    /// Configures the service to fail every quote.
    pub fn set_fail_on_quote(&self, fail: bool) {
        self.fail_on_quote.store(fail, Ordering::SeqCst);
    }

    /// Configures the service to fail every shipment confirmation.
    pub fn set_fail_on_confirm(&self, fail: bool) {
        self.fail_on_confirm.store(fail, Ordering::SeqCst);
    }

    /// Adds artificial latency to every call.
    pub fn set_latency(&self, latency: Duration) {
        let millis = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        self.latency_ms.store(millis, Ordering::SeqCst);
    }

    /// Returns the number of quote calls, including failed ones.
    pub fn quote_count(&self) -> usize {
        self.quotes.count()
    }

    /// Returns the number of confirm calls, including failed ones.
    pub fn confirm_count(&self) -> usize {
        self.confirms.count()
    }

    /// Returns the number of shipments actually booked.
    pub fn shipment_count(&self) -> usize {
        self.next_id.load(Ordering::SeqCst) as usize
    }

    /// Correlation IDs seen by confirm calls, in call order.
    pub async fn confirm_correlation_ids(&self) -> Vec<Option<String>> {
        self.confirms.correlation_ids().await
    }

    async fn simulate_latency(&self) {
        let millis = self.latency_ms.load(Ordering::SeqCst);
        if millis > 0 {
            tokio::time::sleep(Duration::from_millis(millis)).await;
        }
    }
}

fn validate_address(address: &Address) -> Result<(), ShippingError> {
    if address.zip_code.trim().is_empty() || address.country.trim().is_empty() {
        return Err(ShippingError::InvalidAddress(
            "country and zip code are required".to_string(),
        ));
    }
    Ok(())
}

#[async_trait]
impl ShippingQuoter for InMemoryShippingQuoter {
    async fn quote(
        &self,
        ctx: &RequestContext,
        address: &Address,
        items: &[CartItem],
    ) -> Result<Money, ShippingError> {
        self.quotes.record(ctx).await;
        self.simulate_latency().await;

        if self.fail_on_quote.load(Ordering::SeqCst) {
            return Err(ShippingError::Unavailable("quote engine down".to_string()));
        }
        validate_address(address)?;

        if items.is_empty() {
            return Ok(Money::zero(self.flat_fee.currency().clone()));
        }
        Ok(self.flat_fee.clone())
    }

    async fn confirm(
        &self,
        ctx: &RequestContext,
        address: &Address,
        _items: &[CartItem],
    ) -> Result<String, ShippingError> {
        self.confirms.record(ctx).await;
        self.simulate_latency().await;

        if self.fail_on_confirm.load(Ordering::SeqCst) {
            return Err(ShippingError::Unavailable(
                "carrier booking failed".to_string(),
            ));
        }
        validate_address(address)?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("TRACK-{:04}", id))
    }
}
