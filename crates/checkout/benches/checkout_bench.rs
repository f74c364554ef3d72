use std::sync::Arc;

use cart_store::{CartStore, InMemoryCartStore};
use checkout::{
    Address, CheckoutOrchestrator, CreditCard, Downstream, InMemoryCurrencyConverter,
    InMemoryEmailNotifier, InMemoryPaymentProcessor, InMemoryProductCatalog,
    InMemoryShippingQuoter, OrderRequest, RequestContext, StepTimeouts,
};
use common::{CurrencyCode, ProductId, UserId};
use criterion::{Criterion, criterion_group, criterion_main};

fn orchestrator(cart: &InMemoryCartStore) -> CheckoutOrchestrator {
    let usd = CurrencyCode::new("USD").unwrap();
    CheckoutOrchestrator::new(
        Downstream {
            cart: Arc::new(cart.clone()),
            catalog: Arc::new(InMemoryProductCatalog::demo(usd.clone())),
            currency: Arc::new(InMemoryCurrencyConverter::new()),
            shipping: Arc::new(InMemoryShippingQuoter::with_default_fee(usd)),
            payment: Arc::new(InMemoryPaymentProcessor::new()),
            email: Arc::new(InMemoryEmailNotifier::new()),
        },
        StepTimeouts::default(),
    )
}

fn request(currency: &str) -> OrderRequest {
    OrderRequest {
        user_id: UserId::new("bench-user"),
        currency_code: CurrencyCode::new(currency).unwrap(),
        address: Address {
            street_address: "1600 Amphitheatre Parkway".into(),
            city: "Mountain View".into(),
            state: "CA".into(),
            country: "United States".into(),
            zip_code: "94043".into(),
        },
        email: "bench@example.com".into(),
        credit_card: CreditCard {
            number: "4432801561520454".into(),
            cvv: 672,
            expiration_year: 2030,
            expiration_month: 1,
        },
    }
}

async fn fill(cart: &InMemoryCartStore) {
    let user = UserId::new("bench-user");
    for product in ["OLJCESPC7Z", "66VCHSJNUP", "1YMWWN1N4O", "6E92ZMYYFZ"] {
        cart.add_item(&user, &ProductId::new(product), 2)
            .await
            .unwrap();
    }
}

fn bench_place_order(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let cart = InMemoryCartStore::new();
    let orchestrator = orchestrator(&cart);

    for currency in ["USD", "EUR"] {
        c.bench_function(&format!("checkout/place_order_4_lines_{currency}"), |b| {
            b.iter(|| {
                rt.block_on(async {
                    fill(&cart).await;
                    orchestrator
                        .place_order(&RequestContext::default(), request(currency))
                        .await
                        .unwrap();
                });
            });
        });
    }
}

fn bench_cart_merge(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let cart = InMemoryCartStore::new();
    let user = UserId::new("bench-user");
    let product = ProductId::new("6E92ZMYYFZ");

    c.bench_function("checkout/in_memory_add_item", |b| {
        b.iter(|| {
            rt.block_on(async {
                cart.add_item(&user, &product, 1).await.unwrap();
            });
        });
    });
}

criterion_group!(benches, bench_place_order, bench_cart_merge);
criterion_main!(benches);
