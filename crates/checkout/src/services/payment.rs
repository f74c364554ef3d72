//! Payment processor trait and in-memory implementation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use common::Money;
use thiserror::Error;
use tokio::sync::Mutex;

use super::CallRecorder;
use crate::context::RequestContext;
use crate::order::CreditCard;

/// Errors returned by the payment service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChargeError {
    #[error("card declined: {0}")]
    Declined(String),

    #[error("invalid card: {0}")]
    InvalidCredential(String),

    #[error("payment service unavailable: {0}")]
    Unavailable(String),
}

/// Charges payment credentials.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Charges `amount` to `card` and returns the transaction ID.
    async fn charge(
        &self,
        ctx: &RequestContext,
        amount: &Money,
        card: &CreditCard,
    ) -> Result<String, ChargeError>;
}

/// In-memory payment service.
///
/// Accepts any all-digit card number unless told otherwise, and remembers
/// every amount it charged.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentProcessor {
    fail_on_charge: Arc<AtomicBool>,
    declined_card: Arc<Mutex<Option<String>>>,
    latency_ms: Arc<AtomicU64>,
    next_id: Arc<AtomicU32>,
    charged: Arc<Mutex<Vec<(String, Money)>>>,
    charges: Arc<CallRecorder>,
}

impl InMemoryPaymentProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the service to decline every charge.
    pub fn set_fail_on_charge(&self, fail: bool) {
        self.fail_on_charge.store(fail, Ordering::SeqCst);
    }

    /// Declines charges against this card number only.
    pub async fn decline_card(&self, number: impl Into<String>) {
        *self.declined_card.lock().await = Some(number.into());
    }

    /// Adds artificial latency to every charge.
    pub fn set_latency(&self, latency: Duration) {
        let millis = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
        self.latency_ms.store(millis, Ordering::SeqCst);
    }

    /// Returns the number of charge attempts, including failed ones.
    pub fn charge_count(&self) -> usize {
        self.charges.count()
    }

    /// Transaction IDs and amounts of the successful charges, in order.
    pub async fn charged(&self) -> Vec<(String, Money)> {
        self.charged.lock().await.clone()
    }

    /// Correlation IDs seen by charge calls, in call order.
    pub async fn seen_correlation_ids(&self) -> Vec<Option<String>> {
        self.charges.correlation_ids().await
    }
}

#[async_trait]
impl PaymentProcessor for InMemoryPaymentProcessor {
    async fn charge(
        &self,
        ctx: &RequestContext,
        amount: &Money,
        card: &CreditCard,
    ) -> Result<String, ChargeError> {
        self.charges.record(ctx).await;

        let millis = self.latency_ms.load(Ordering::SeqCst);
        if millis > 0 {
            tokio::time::sleep(Duration::from_millis(millis)).await;
        }

        if card.number.is_empty() || !card.number.chars().all(|c| c.is_ascii_digit()) {
            return Err(ChargeError::InvalidCredential(
                "card number must be digits".to_string(),
            ));
        }
        if self.fail_on_charge.load(Ordering::SeqCst) {
            return Err(ChargeError::Declined("insufficient funds".to_string()));
        }
        if self.declined_card.lock().await.as_deref() == Some(card.number.as_str()) {
            return Err(ChargeError::Declined(format!(
                "card ending {} declined",
                card.last_four()
            )));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let transaction_id = format!("PAY-{:04}", id);
        self.charged
            .lock()
            .await
            .push((transaction_id.clone(), amount.clone()));

        Ok(transaction_id)
    }
}
