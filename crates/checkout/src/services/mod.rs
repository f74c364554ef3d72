//! Downstream service traits and in-memory implementations.
//!
//! The in-memory implementations back the demo server and the tests. Each
//! one counts its calls and records the correlation IDs it was handed.

pub mod catalog;
pub mod currency;
pub mod email;
pub mod payment;
pub mod shipping;

use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Mutex;

use crate::context::RequestContext;

pub use catalog::{CatalogError, InMemoryProductCatalog, Product, ProductCatalog};
pub use currency::{ConversionError, CurrencyConverter, InMemoryCurrencyConverter};
pub use email::{EmailError, EmailNotifier, InMemoryEmailNotifier};
pub use payment::{ChargeError, InMemoryPaymentProcessor, PaymentProcessor};
pub use shipping::{InMemoryShippingQuoter, ShippingError, ShippingQuoter};

/// Call bookkeeping for one operation of an in-memory service.
#[derive(Debug, Default)]
pub(crate) struct CallRecorder {
    count: AtomicUsize,
    correlation_ids: Mutex<Vec<Option<String>>>,
}

impl CallRecorder {
    pub(crate) async fn record(&self, ctx: &RequestContext) {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.correlation_ids
            .lock()
            .await
            .push(ctx.correlation_id().map(String::from));
    }

    pub(crate) fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    pub(crate) async fn correlation_ids(&self) -> Vec<Option<String>> {
        self.correlation_ids.lock().await.clone()
    }
}
