//! Product catalog trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use common::{CurrencyCode, Money, ProductId};
use thiserror::Error;

use super::CallRecorder;
use crate::context::RequestContext;

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    /// Unit price in the catalog's own currency.
    pub price: Money,
}

/// Errors returned by the product catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("product {0} not found")]
    NotFound(ProductId),

    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Resolves product IDs to price and description.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    async fn get_product(
        &self,
        ctx: &RequestContext,
        product_id: &ProductId,
    ) -> Result<Product, CatalogError>;
}

/// In-memory product catalog.
///
/// Products are registered up front with [`with_product`](Self::with_product);
/// the listing never changes afterwards.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProductCatalog {
    products: Arc<HashMap<ProductId, Product>>,
    fail_on_lookup: Arc<AtomicBool>,
    lookups: Arc<CallRecorder>,
}

impl InMemoryProductCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a product. Clones taken earlier keep the old listing.
    pub fn with_product(mut self, product: Product) -> Self {
        Arc::make_mut(&mut self.products).insert(product.id.clone(), product);
        self
    }

    /// The storefront's demo listing, priced in `currency`.
    pub fn demo(currency: CurrencyCode) -> Self {
        const LISTING: &[(&str, &str, &str, u64)] = &[
            ("OLJCESPC7Z", "Sunglasses", "Add a modern touch to your outfits.", 1999),
            ("66VCHSJNUP", "Tank Top", "Perfectly cropped cotton tank.", 1899),
            ("1YMWWN1N4O", "Watch", "This gold-tone stainless steel watch will work with most of your outfits.", 10999),
            ("L9ECAV7KIM", "Loafers", "A neat addition to your summer wardrobe.", 8999),
            ("2ZYFJ3GM2N", "Hairdryer", "This lightweight hairdryer has 3 heat and speed settings.", 2499),
            ("0PUK6V6EV0", "Candle Holder", "This small but intricate candle holder is an excellent gift.", 1899),
            ("LS4PSXUNUM", "Salt & Pepper Shakers", "Add some flavor to your kitchen.", 1849),
            ("9SIQT8TOJO", "Bamboo Glass Jar", "This bamboo glass jar can hold 57 oz (1.7 l).", 549),
            ("6E92ZMYYFZ", "Mug", "A simple mug with a mustard interior.", 899),
        ];

        LISTING
            .iter()
            .fold(Self::new(), |catalog, (id, name, description, cents)| {
                catalog.with_product(Product {
                    id: ProductId::new(*id),
                    name: name.to_string(),
                    description: description.to_string(),
                    price: Money::from_cents(*cents, currency.clone()),
                })
            })
    }

    /// Configures the catalog to fail every lookup.
    pub fn set_fail_on_lookup(&self, fail: bool) {
        self.fail_on_lookup.store(fail, Ordering::SeqCst);
    }

    /// Returns the number of lookups served, including failed ones.
    pub fn lookup_count(&self) -> usize {
        self.lookups.count()
    }

    /// Returns the correlation IDs seen, in call order.
    pub async fn seen_correlation_ids(&self) -> Vec<Option<String>> {
        self.lookups.correlation_ids().await
    }
}

#[async_trait]
impl ProductCatalog for InMemoryProductCatalog {
    async fn get_product(
        &self,
        ctx: &RequestContext,
        product_id: &ProductId,
    ) -> Result<Product, CatalogError> {
        self.lookups.record(ctx).await;

        if self.fail_on_lookup.load(Ordering::SeqCst) {
            return Err(CatalogError::Unavailable(
                "catalog backend unreachable".to_string(),
            ));
        }

        self.products
            .get(product_id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(product_id.clone()))
    }
}
