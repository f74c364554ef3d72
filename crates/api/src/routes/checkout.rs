//! Checkout endpoint.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{Extension, Json};
use checkout::{CancellationSignal, OrderRequest, OrderResult, RequestContext};
use tracing::Instrument;

use crate::AppState;
use crate::error::ApiError;
use crate::middleware::CorrelationId;

/// Flips the cancellation signal when the handler future is dropped, which
/// is what happens when the client disconnects mid-checkout.
struct CancelOnDrop(CancellationSignal);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

/// POST /checkout: place an order for the user's cart.
///
/// The workflow runs on its own task so a disconnect never interrupts a
/// downstream call in flight; it only stops steps that have not started.
#[tracing::instrument(skip_all)]
pub async fn place_order(
    State(state): State<Arc<AppState>>,
    Extension(CorrelationId(correlation_id)): Extension<CorrelationId>,
    payload: Result<Json<OrderRequest>, JsonRejection>,
) -> Result<Json<OrderResult>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let signal = CancellationSignal::new();
    let _cancel_on_drop = CancelOnDrop(signal.clone());
    let ctx = RequestContext::new(correlation_id).with_cancellation(signal);

    let orchestrator = state.orchestrator.clone();
    let task = tokio::spawn(
        async move { orchestrator.place_order(&ctx, request).await }.in_current_span(),
    );

    let order = task
        .await
        .map_err(|e| ApiError::Internal(format!("checkout task failed: {e}")))??;
    Ok(Json(order))
}
