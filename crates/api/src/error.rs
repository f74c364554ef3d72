//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cart_store::CartStoreError;
use checkout::{
    CallError, CatalogError, ChargeError, CheckoutError, ConversionError, ShippingError,
};

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client.
    BadRequest(String),
    /// Cart store error.
    CartStore(CartStoreError),
    /// Checkout workflow error.
    Checkout(CheckoutError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, serde_json::json!({ "error": msg })),
            ApiError::CartStore(err) => {
                let status = match err {
                    CartStoreError::InvalidQuantity { .. } => StatusCode::BAD_REQUEST,
                    CartStoreError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                };
                (status, serde_json::json!({ "error": err.to_string() }))
            }
            ApiError::Checkout(err) => {
                let mut body = serde_json::json!({
                    "error": err.to_string(),
                    "step": err.step(),
                    "retryable": err.is_retryable(),
                });
                if let Some(transaction_id) = err.transaction_id() {
                    body["transaction_id"] = transaction_id.into();
                }
                (checkout_status(&err), body)
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, serde_json::json!({ "error": msg }))
            }
        };

        (status, axum::Json(body)).into_response()
    }
}

fn checkout_status(err: &CheckoutError) -> StatusCode {
    match err {
        CheckoutError::EmptyCart(_) | CheckoutError::Pricing(_) => StatusCode::BAD_REQUEST,
        CheckoutError::CartUnavailable(_) | CheckoutError::Cancelled { .. } => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        CheckoutError::ProductLookup { source, .. } => call_status(source, |e| match e {
            CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
            CatalogError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }),
        CheckoutError::Currency(source) | CheckoutError::ShippingCurrency(source) => {
            call_status(source, conversion_status)
        }
        CheckoutError::ShippingQuote(source) => call_status(source, |e| match e {
            ShippingError::InvalidAddress(_) => StatusCode::BAD_REQUEST,
            ShippingError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }),
        CheckoutError::Payment(source) => call_status(source, |e| match e {
            ChargeError::Declined(_) => StatusCode::PAYMENT_REQUIRED,
            ChargeError::InvalidCredential(_) => StatusCode::BAD_REQUEST,
            ChargeError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }),
        CheckoutError::OrderPlacement { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn conversion_status(err: &ConversionError) -> StatusCode {
    match err {
        ConversionError::UnsupportedCurrency(_) | ConversionError::OutOfRange => {
            StatusCode::BAD_REQUEST
        }
        ConversionError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn call_status<E>(err: &CallError<E>, service: impl Fn(&E) -> StatusCode) -> StatusCode {
    match err {
        CallError::Service(e) => service(e),
        CallError::Timeout(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

impl From<CartStoreError> for ApiError {
    fn from(err: CartStoreError) -> Self {
        ApiError::CartStore(err)
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}
