//! Request-scoped context passed to every downstream call.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Flag set when the inbound caller goes away.
///
/// Clones share the flag. The orchestrator only looks at it between steps,
/// so a call that was already dispatched always runs to completion.
#[derive(Debug, Clone, Default)]
pub struct CancellationSignal {
    cancelled: Arc<AtomicBool>,
}

impl CancellationSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Per-checkout context.
///
/// The correlation ID comes from the caller and is never generated here; it
/// is attached to the checkout span and handed to each downstream service so
/// their work can be attributed to the originating request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    correlation_id: Option<String>,
    cancellation: CancellationSignal,
}

impl RequestContext {
    pub fn new(correlation_id: Option<String>) -> Self {
        Self {
            correlation_id,
            cancellation: CancellationSignal::new(),
        }
    }

    /// Replaces the cancellation signal with one the caller controls.
    pub fn with_cancellation(mut self, cancellation: CancellationSignal) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn cancellation(&self) -> &CancellationSignal {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}
