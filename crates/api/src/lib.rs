//! HTTP front door for the storefront's cart store and checkout.
//!
//! Provides the cart endpoints and `POST /checkout`, with structured logging
//! (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::Request;
use axum::routing::{get, post};
use cart_store::{BackendKind, CartStore, SelectedBackend};
use checkout::{
    CheckoutOrchestrator, Downstream, InMemoryCurrencyConverter, InMemoryEmailNotifier,
    InMemoryPaymentProcessor, InMemoryProductCatalog, InMemoryShippingQuoter, StepTimeouts,
};
use common::Money;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub orchestrator: CheckoutOrchestrator,
    pub carts: Arc<dyn CartStore>,
    pub cart_backend: BackendKind,
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/carts/{user_id}",
            get(routes::carts::get).delete(routes::carts::empty),
        )
        .route("/carts/{user_id}/items", post(routes::carts::add_item))
        .route("/checkout", post(routes::checkout::place_order))
        .with_state(state)
        .merge(metrics_router)
        .layer(axum::middleware::from_fn(
            middleware::request_id_middleware,
        ))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
}

/// Builds the state around an arbitrary set of downstream services.
pub fn create_state(
    downstream: Downstream,
    cart_backend: BackendKind,
    timeouts: StepTimeouts,
) -> Arc<AppState> {
    let carts = Arc::clone(&downstream.cart);
    Arc::new(AppState {
        orchestrator: CheckoutOrchestrator::new(downstream, timeouts),
        carts,
        cart_backend,
    })
}

/// Creates the default application state: the selected cart backend plus
/// the in-memory demo catalog, currency, shipping, payment and email services.
pub fn create_default_state(config: &Config, backend: SelectedBackend) -> Arc<AppState> {
    let currency = config.catalog_currency.clone();
    let downstream = Downstream {
        cart: backend.store,
        catalog: Arc::new(InMemoryProductCatalog::demo(currency.clone())),
        currency: Arc::new(InMemoryCurrencyConverter::new()),
        shipping: Arc::new(InMemoryShippingQuoter::new(Money::from_cents(
            config.shipping_flat_fee_cents,
            currency,
        ))),
        payment: Arc::new(InMemoryPaymentProcessor::new()),
        email: Arc::new(InMemoryEmailNotifier::new()),
    };

    create_state(downstream, backend.kind, config.step_timeouts())
}
