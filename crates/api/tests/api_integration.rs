//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use axum::body::Body;
use axum::http::{Request, StatusCode};
use cart_store::{BackendKind, InMemoryCartStore};
use checkout::{
    Downstream, InMemoryCurrencyConverter, InMemoryEmailNotifier, InMemoryPaymentProcessor,
    InMemoryProductCatalog, InMemoryShippingQuoter, StepTimeouts,
};
use common::{CurrencyCode, Money};
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

/// The app plus handles on the in-memory services behind it.
struct TestApp {
    app: axum::Router,
    catalog: InMemoryProductCatalog,
    shipping: InMemoryShippingQuoter,
    payment: InMemoryPaymentProcessor,
}

fn setup() -> TestApp {
    let usd = CurrencyCode::usd();
    let catalog = InMemoryProductCatalog::demo(usd.clone());
    let shipping = InMemoryShippingQuoter::new(Money::from_cents(500, usd));
    let payment = InMemoryPaymentProcessor::new();

    let downstream = Downstream {
        cart: Arc::new(InMemoryCartStore::new()),
        catalog: Arc::new(catalog.clone()),
        currency: Arc::new(InMemoryCurrencyConverter::new()),
        shipping: Arc::new(shipping.clone()),
        payment: Arc::new(payment.clone()),
        email: Arc::new(InMemoryEmailNotifier::new()),
    };
    let state = api::create_state(downstream, BackendKind::InMemory, StepTimeouts::default());

    TestApp {
        app: api::create_app(state, get_metrics_handle()),
        catalog,
        shipping,
        payment,
    }
}

async fn send(app: &axum::Router, request: Request<Body>) -> axum::response::Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

async fn add_item(app: &axum::Router, user: &str, product: &str, quantity: u32) -> StatusCode {
    let response = send(
        app,
        json_request(
            "POST",
            &format!("/carts/{user}/items"),
            serde_json::json!({ "product_id": product, "quantity": quantity }),
        ),
    )
    .await;
    response.status()
}

fn checkout_body(user: &str, currency: &str, card: &str) -> serde_json::Value {
    serde_json::json!({
        "user_id": user,
        "email": format!("{user}@example.com"),
        "currency_code": currency,
        "address": {
            "street_address": "1600 Amphitheatre Parkway",
            "city": "Mountain View",
            "state": "CA",
            "country": "United States",
            "zip_code": "94043"
        },
        "credit_card": {
            "number": card,
            "cvv": 672,
            "expiration_year": 2030,
            "expiration_month": 1
        }
    })
}

const GOOD_CARD: &str = "4432801561520454";

#[tokio::test]
async fn test_health_check() {
    let t = setup();

    let response = send(
        &t.app,
        Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap(),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["cart_backend"], "in-memory");
}

#[tokio::test]
async fn test_add_items_merges_quantities() {
    let t = setup();

    assert_eq!(add_item(&t.app, "u1", "6E92ZMYYFZ", 2).await, StatusCode::NO_CONTENT);
    assert_eq!(add_item(&t.app, "u1", "6E92ZMYYFZ", 3).await, StatusCode::NO_CONTENT);

    let response = send(
        &t.app,
        Request::builder()
            .uri("/carts/u1")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["user_id"], "u1");
    assert_eq!(json["items"].as_array().unwrap().len(), 1);
    assert_eq!(json["items"][0]["product_id"], "6E92ZMYYFZ");
    assert_eq!(json["items"][0]["quantity"], 5);
}

#[tokio::test]
async fn test_zero_quantity_is_bad_request() {
    let t = setup();
    assert_eq!(add_item(&t.app, "u1", "6E92ZMYYFZ", 0).await, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let t = setup();

    let response = send(
        &t.app,
        json_request("POST", "/carts/u1/items", serde_json::json!({ "quantity": 1 })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_empty_cart_then_get() {
    let t = setup();
    add_item(&t.app, "u1", "6E92ZMYYFZ", 1).await;

    let response = send(
        &t.app,
        Request::builder()
            .method("DELETE")
            .uri("/carts/u1")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(
        &t.app,
        Request::builder()
            .uri("/carts/u1")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    let json = body_json(response).await;
    assert!(json["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_checkout_happy_path_echoes_request_id() {
    let t = setup();
    // Sunglasses 19.99 x2
    add_item(&t.app, "alice", "OLJCESPC7Z", 2).await;

    let mut request = json_request("POST", "/checkout", checkout_body("alice", "USD", GOOD_CARD));
    request
        .headers_mut()
        .insert("x-request-id", "req-123".parse().unwrap());
    let response = send(&t.app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-request-id"], "req-123");
    let json = body_json(response).await;
    assert_eq!(json["items"][0]["product_id"], "OLJCESPC7Z");
    assert_eq!(json["items"][0]["quantity"], 2);
    assert_eq!(json["subtotal"]["cents"], 3998);
    assert_eq!(json["shipping_cost"]["cents"], 500);
    assert_eq!(json["total_paid"]["cents"], 4498);
    assert_eq!(json["total_paid"]["currency"], "USD");
    assert_eq!(json["shipping_tracking_id"], "TRACK-0001");
    assert_eq!(json["transaction_id"], "PAY-0001");

    assert_eq!(
        t.catalog.seen_correlation_ids().await,
        vec![Some("req-123".to_string())]
    );

    // The cart was emptied.
    let response = send(
        &t.app,
        Request::builder()
            .uri("/carts/alice")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert!(body_json(response).await["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_request_id_is_not_generated() {
    let t = setup();

    let response = send(
        &t.app,
        Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert!(response.headers().get("x-request-id").is_none());
}

#[tokio::test]
async fn test_checkout_empty_cart() {
    let t = setup();

    let response = send(
        &t.app,
        json_request("POST", "/checkout", checkout_body("nobody", "USD", GOOD_CARD)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["step"], "fetch_cart");
    assert_eq!(json["retryable"], true);
    assert!(json.get("transaction_id").is_none());
}

#[tokio::test]
async fn test_checkout_unknown_product() {
    let t = setup();
    add_item(&t.app, "u1", "NOT-IN-CATALOG", 1).await;

    let response = send(
        &t.app,
        json_request("POST", "/checkout", checkout_body("u1", "USD", GOOD_CARD)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["step"], "resolve_items");
}

#[tokio::test]
async fn test_checkout_catalog_unavailable() {
    let t = setup();
    add_item(&t.app, "u1", "6E92ZMYYFZ", 1).await;
    t.catalog.set_fail_on_lookup(true);

    let response = send(
        &t.app,
        json_request("POST", "/checkout", checkout_body("u1", "USD", GOOD_CARD)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["retryable"], true);
}

#[tokio::test]
async fn test_checkout_declined_card() {
    let t = setup();
    add_item(&t.app, "u1", "6E92ZMYYFZ", 1).await;
    t.payment.set_fail_on_charge(true);

    let response = send(
        &t.app,
        json_request("POST", "/checkout", checkout_body("u1", "USD", GOOD_CARD)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    let json = body_json(response).await;
    assert_eq!(json["step"], "charge_payment");
    assert_eq!(json["retryable"], true);
    assert_eq!(t.shipping.confirm_count(), 0);
}

#[tokio::test]
async fn test_checkout_shipment_failure_reports_transaction() {
    let t = setup();
    add_item(&t.app, "u1", "6E92ZMYYFZ", 1).await;
    t.shipping.set_fail_on_confirm(true);

    let response = send(
        &t.app,
        json_request("POST", "/checkout", checkout_body("u1", "USD", GOOD_CARD)),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["step"], "confirm_shipment");
    assert_eq!(json["retryable"], false);
    assert_eq!(json["transaction_id"], "PAY-0001");
}

#[tokio::test]
async fn test_checkout_invalid_currency_code_is_bad_request() {
    let t = setup();

    let response = send(
        &t.app,
        json_request("POST", "/checkout", checkout_body("u1", "DOLLARS", GOOD_CARD)),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let t = setup();
    add_item(&t.app, "m1", "6E92ZMYYFZ", 1).await;
    send(
        &t.app,
        json_request("POST", "/checkout", checkout_body("m1", "EUR", GOOD_CARD)),
    )
    .await;

    let response = send(
        &t.app,
        Request::builder()
            .uri("/metrics")
            .body(Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("checkout_orders_total"));
}
