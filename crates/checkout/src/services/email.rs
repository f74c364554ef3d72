//! Confirmation email trait and in-memory implementation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use common::OrderId;
use thiserror::Error;
use tokio::sync::Mutex;

use super::CallRecorder;
use crate::context::RequestContext;
use crate::order::OrderResult;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmailError {
    #[error("email service unavailable: {0}")]
    Unavailable(String),
}

/// Sends order confirmations.
#[async_trait]
pub trait EmailNotifier: Send + Sync {
    async fn send_confirmation(
        &self,
        ctx: &RequestContext,
        email: &str,
        order: &OrderResult,
    ) -> Result<(), EmailError>;
}

/// In-memory email service that keeps an outbox instead of sending.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEmailNotifier {
    fail_on_send: Arc<AtomicBool>,
    outbox: Arc<Mutex<Vec<(String, OrderId)>>>,
    sends: Arc<CallRecorder>,
}

impl InMemoryEmailNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_on_send(&self, fail: bool) {
        self.fail_on_send.store(fail, Ordering::SeqCst);
    }

    /// Returns the number of send attempts, including failed ones.
    pub fn send_count(&self) -> usize {
        self.sends.count()
    }

    /// Recipients and order IDs of the delivered confirmations.
    pub async fn sent(&self) -> Vec<(String, OrderId)> {
        self.outbox.lock().await.clone()
    }
}

#[async_trait]
impl EmailNotifier for InMemoryEmailNotifier {
    async fn send_confirmation(
        &self,
        ctx: &RequestContext,
        email: &str,
        order: &OrderResult,
    ) -> Result<(), EmailError> {
        self.sends.record(ctx).await;

        if self.fail_on_send.load(Ordering::SeqCst) {
            return Err(EmailError::Unavailable("smtp relay refused".to_string()));
        }

        self.outbox
            .lock()
            .await
            .push((email.to_string(), order.order_id));
        Ok(())
    }
}
