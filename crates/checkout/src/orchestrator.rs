//! The checkout workflow.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use cart_store::CartStore;
use chrono::Utc;
use common::{Money, OrderId};

use crate::context::RequestContext;
use crate::error::{CallError, CheckoutError};
use crate::order::{OrderItem, OrderRequest, OrderResult};
use crate::services::{
    CurrencyConverter, EmailNotifier, PaymentProcessor, Product, ProductCatalog, ShippingQuoter,
};
use crate::steps;

/// The services a checkout talks to.
#[derive(Clone)]
pub struct Downstream {
    pub cart: Arc<dyn CartStore>,
    pub catalog: Arc<dyn ProductCatalog>,
    pub currency: Arc<dyn CurrencyConverter>,
    pub shipping: Arc<dyn ShippingQuoter>,
    pub payment: Arc<dyn PaymentProcessor>,
    pub email: Arc<dyn EmailNotifier>,
}

/// Upper bound on each outbound call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepTimeouts {
    pub per_call: Duration,
}

impl StepTimeouts {
    pub fn new(per_call: Duration) -> Self {
        Self { per_call }
    }
}

impl Default for StepTimeouts {
    fn default() -> Self {
        Self {
            per_call: Duration::from_secs(5),
        }
    }
}

/// Drives a checkout from cart to placed order.
///
/// Stateless between calls: every checkout gets its own `place_order`
/// invocation and nothing is shared but the downstream handles.
#[derive(Clone)]
pub struct CheckoutOrchestrator {
    downstream: Downstream,
    timeouts: StepTimeouts,
}

impl CheckoutOrchestrator {
    pub fn new(downstream: Downstream, timeouts: StepTimeouts) -> Self {
        Self {
            downstream,
            timeouts,
        }
    }

    pub fn downstream(&self) -> &Downstream {
        &self.downstream
    }

    /// Places an order for everything in the user's cart.
    ///
    /// On success the card has been charged, the shipment booked and the cart
    /// emptied (best effort). See [`CheckoutError::is_retryable`] for which
    /// failures are safe to repeat.
    #[tracing::instrument(
        skip(self, ctx, request),
        fields(
            user_id = %request.user_id,
            currency = %request.currency_code,
            correlation_id = ctx.correlation_id(),
        )
    )]
    pub async fn place_order(
        &self,
        ctx: &RequestContext,
        request: OrderRequest,
    ) -> Result<OrderResult, CheckoutError> {
        metrics::counter!("checkout_orders_total").increment(1);
        let started = Instant::now();

        let result = self.run(ctx, request).await;

        let duration = started.elapsed().as_secs_f64();
        metrics::histogram!("checkout_duration_seconds").record(duration);

        match &result {
            Ok(order) => {
                metrics::counter!("checkout_orders_completed").increment(1);
                tracing::info!(
                    order_id = %order.order_id,
                    total = %order.total_paid,
                    transaction_id = %order.transaction_id,
                    tracking_id = %order.shipping_tracking_id,
                    duration,
                    "checkout completed"
                );
            }
            Err(e) => {
                metrics::counter!("checkout_orders_failed", "step" => e.step()).increment(1);
                if let CheckoutError::OrderPlacement {
                    transaction_id,
                    amount_charged,
                    ..
                } = e
                {
                    metrics::counter!("checkout_paid_unshipped_total").increment(1);
                    tracing::error!(
                        %transaction_id,
                        amount = %amount_charged,
                        error = %e,
                        "card charged but shipment not confirmed; needs reconciliation"
                    );
                } else {
                    tracing::warn!(step = e.step(), error = %e, "checkout failed");
                }
            }
        }

        result
    }

    async fn run(
        &self,
        ctx: &RequestContext,
        request: OrderRequest,
    ) -> Result<OrderResult, CheckoutError> {
        let OrderRequest {
            user_id,
            currency_code,
            address,
            email,
            credit_card,
        } = request;
        let ds = &self.downstream;

        // 1. Fetch cart
        ensure_not_cancelled(ctx, steps::FETCH_CART)?;
        tracing::info!(step = steps::FETCH_CART, "checkout step started");
        let cart = self
            .bounded(ds.cart.get_cart(&user_id))
            .await
            .map_err(CheckoutError::CartUnavailable)?;
        if cart.is_empty() {
            return Err(CheckoutError::EmptyCart(user_id));
        }

        // 2. Resolve items
        ensure_not_cancelled(ctx, steps::RESOLVE_ITEMS)?;
        tracing::info!(
            step = steps::RESOLVE_ITEMS,
            lines = cart.items.len(),
            "checkout step started"
        );
        let mut products: Vec<Product> = Vec::with_capacity(cart.items.len());
        for item in &cart.items {
            let product = self
                .bounded(ds.catalog.get_product(ctx, &item.product_id))
                .await
                .map_err(|source| CheckoutError::ProductLookup {
                    product_id: item.product_id.clone(),
                    source,
                })?;
            products.push(product);
        }

        // 3. Convert prices
        ensure_not_cancelled(ctx, steps::CONVERT_PRICES)?;
        tracing::info!(step = steps::CONVERT_PRICES, "checkout step started");
        let mut items = Vec::with_capacity(products.len());
        let mut subtotal = Money::zero(currency_code.clone());
        for (line, product) in cart.items.iter().zip(products) {
            let unit_price = self
                .bounded(ds.currency.convert(ctx, &product.price, &currency_code))
                .await
                .map_err(CheckoutError::Currency)?;
            let cost = unit_price.checked_mul(line.quantity)?;
            subtotal = subtotal.checked_add(&cost)?;
            items.push(OrderItem {
                product_id: product.id,
                name: product.name,
                quantity: line.quantity,
                unit_price,
                cost,
            });
        }

        // 4. Quote shipping
        ensure_not_cancelled(ctx, steps::QUOTE_SHIPPING)?;
        tracing::info!(step = steps::QUOTE_SHIPPING, "checkout step started");
        let quote = self
            .bounded(ds.shipping.quote(ctx, &address, &cart.items))
            .await
            .map_err(CheckoutError::ShippingQuote)?;
        let shipping_cost = self
            .bounded(ds.currency.convert(ctx, &quote, &currency_code))
            .await
            .map_err(CheckoutError::ShippingCurrency)?;
        let total = subtotal.checked_add(&shipping_cost)?;

        // 5. Charge payment. Last point at which cancellation is honoured.
        ensure_not_cancelled(ctx, steps::CHARGE_PAYMENT)?;
        tracing::info!(
            step = steps::CHARGE_PAYMENT,
            amount = %total,
            card = %credit_card.last_four(),
            "checkout step started"
        );
        let transaction_id = self
            .bounded(ds.payment.charge(ctx, &total, &credit_card))
            .await
            .map_err(CheckoutError::Payment)?;

        // 6. Confirm shipment
        tracing::info!(
            step = steps::CONFIRM_SHIPMENT,
            %transaction_id,
            "checkout step started"
        );
        let shipping_tracking_id = match self
            .bounded(ds.shipping.confirm(ctx, &address, &cart.items))
            .await
        {
            Ok(tracking_id) => tracking_id,
            Err(source) => {
                return Err(CheckoutError::OrderPlacement {
                    transaction_id,
                    amount_charged: total,
                    source,
                });
            }
        };

        let order = OrderResult {
            order_id: OrderId::new(),
            items,
            subtotal,
            shipping_cost,
            total_paid: total,
            shipping_tracking_id,
            shipping_address: address,
            transaction_id,
            placed_at: Utc::now(),
        };

        // 7. Send confirmation
        tracing::info!(step = steps::SEND_CONFIRMATION, "checkout step started");
        if let Err(e) = self
            .bounded(ds.email.send_confirmation(ctx, &email, &order))
            .await
        {
            metrics::counter!("checkout_email_failures_total").increment(1);
            tracing::warn!(order_id = %order.order_id, error = %e, "confirmation email not sent");
        }

        // 8. Empty cart
        tracing::info!(step = steps::EMPTY_CART, "checkout step started");
        if let Err(e) = self.bounded(ds.cart.empty_cart(&user_id)).await {
            metrics::counter!("checkout_cart_clear_failures_total").increment(1);
            tracing::warn!(order_id = %order.order_id, error = %e, "cart not emptied after checkout");
        }

        Ok(order)
    }

    /// Runs one downstream call under the per-call timeout.
    async fn bounded<T, E>(
        &self,
        call: impl Future<Output = Result<T, E>>,
    ) -> Result<T, CallError<E>> {
        match tokio::time::timeout(self.timeouts.per_call, call).await {
            Ok(result) => result.map_err(CallError::Service),
            Err(_) => Err(CallError::Timeout(self.timeouts.per_call)),
        }
    }
}

fn ensure_not_cancelled(ctx: &RequestContext, step: &'static str) -> Result<(), CheckoutError> {
    if ctx.is_cancelled() {
        return Err(CheckoutError::Cancelled { step });
    }
    Ok(())
}
