use std::sync::Arc;

use criterion::{Criterion, criterion_group, criterion_main};
use domain::{
    AnyEvent, EntityId, EventDispatcher, Money, NewProduct, Order, OrderLine, OrderService,
    Product, ProductService, User, UserEvent, UserService, handlers,
};
use store::InMemoryRepository;

fn logging_dispatcher() -> Arc<EventDispatcher> {
    let dispatcher = handlers::default_handlers()
        .into_iter()
        .fold(EventDispatcher::new(), EventDispatcher::register);
    Arc::new(dispatcher)
}

fn bench_deliver_batch(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let dispatcher = logging_dispatcher();
    let events: Vec<AnyEvent> = (0..50)
        .map(|_| UserEvent::user_deleted(EntityId::new()).into())
        .collect();

    c.bench_function("domain/deliver_50_events", |b| {
        b.iter(|| {
            rt.block_on(async {
                dispatcher.deliver(&events).await.unwrap();
            });
        });
    });
}

fn bench_create_user(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let service = UserService::new(
        Arc::new(InMemoryRepository::<User>::new()),
        logging_dispatcher(),
    );
    let mut n: u64 = 0;

    c.bench_function("domain/create_user", |b| {
        b.iter(|| {
            n += 1;
            rt.block_on(async {
                service
                    .create_user(
                        &format!("user{n}@example.com"),
                        &format!("user{n}"),
                        "Bench",
                        "User",
                    )
                    .await
                    .unwrap();
            });
        });
    });
}

fn bench_delete_restore_cycle(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let service = UserService::new(
        Arc::new(InMemoryRepository::<User>::new()),
        logging_dispatcher(),
    );
    let user = rt.block_on(async {
        service
            .create_user("cycle@example.com", "cycle", "Cycle", "User")
            .await
            .unwrap()
    });

    c.bench_function("domain/soft_delete_restore", |b| {
        b.iter(|| {
            rt.block_on(async {
                service.soft_delete_user(user.id()).await.unwrap();
                service.restore_user(user.id()).await.unwrap();
            });
        });
    });
}

fn bench_place_order(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let dispatcher = logging_dispatcher();
    let user_repo = Arc::new(InMemoryRepository::<User>::new());
    let product_repo = Arc::new(InMemoryRepository::<Product>::new());
    let users = UserService::new(user_repo.clone(), dispatcher.clone());
    let products = ProductService::new(product_repo.clone(), dispatcher.clone());
    let orders = OrderService::new(
        Arc::new(InMemoryRepository::<Order>::new()),
        user_repo,
        product_repo,
        dispatcher,
    );

    let (user_id, lines) = rt.block_on(async {
        let user = users
            .create_user("buyer@example.com", "buyer", "Bench", "Buyer")
            .await
            .unwrap();
        let mut lines = Vec::new();
        for i in 0..10 {
            let product = products
                .create_product(NewProduct::new(
                    format!("Product {i}"),
                    format!("SKU-{i:03}"),
                    Money::from_cents(100 * (i + 1)),
                    user.id(),
                ))
                .await
                .unwrap();
            lines.push(OrderLine::new(product.id(), 1));
        }
        (user.id(), lines)
    });

    c.bench_function("domain/place_order_10_lines", |b| {
        b.iter(|| {
            rt.block_on(async {
                orders.place_order(user_id, lines.clone()).await.unwrap();
            });
        });
    });
}

criterion_group!(
    benches,
    bench_deliver_batch,
    bench_create_user,
    bench_delete_restore_cycle,
    bench_place_order,
);
criterion_main!(benches);
