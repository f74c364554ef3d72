//! Checkout orchestration for the storefront.
//!
//! [`CheckoutOrchestrator::place_order`] turns a user's cart into a placed
//! order by calling the downstream services one after another:
//! 1. Read the cart
//! 2. Resolve every product in the catalog
//! 3. Convert prices into the shopper's currency
//! 4. Quote shipping
//! 5. Charge the card
//! 6. Confirm the shipment
//! 7. Send the confirmation email (best effort)
//! 8. Empty the cart (best effort)
//!
//! There is no compensation. Steps 1-4 have no side effects, so a failure
//! there is safe to retry. A failure at step 6 happens after the card was
//! charged and is reported as [`CheckoutError::OrderPlacement`] carrying the
//! transaction ID, so it can be reconciled instead of retried.

pub mod context;
pub mod error;
pub mod order;
pub mod orchestrator;
pub mod services;
pub mod steps;

pub use context::{CancellationSignal, RequestContext};
pub use error::{CallError, CheckoutError};
pub use order::{Address, CreditCard, OrderItem, OrderRequest, OrderResult};
pub use orchestrator::{CheckoutOrchestrator, Downstream, StepTimeouts};
pub use services::{
    CatalogError, ChargeError, ConversionError, CurrencyConverter, EmailError, EmailNotifier,
    InMemoryCurrencyConverter, InMemoryEmailNotifier, InMemoryPaymentProcessor,
    InMemoryProductCatalog, InMemoryShippingQuoter, PaymentProcessor, Product, ProductCatalog,
    ShippingError, ShippingQuoter,
};
