//! Integration tests for the application context.

use std::sync::OnceLock;
use std::time::Duration;

use app::{AppContext, Config, telemetry};
use domain::{
    AnyEvent, DispatchError, DomainError, DomainEvent, ListQuery, Money, NewProduct, OrderLine,
    UserEvent,
};
use metrics_exporter_prometheus::PrometheusHandle;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| telemetry::install_metrics_recorder().expect("recorder installs once"))
        .clone()
}

fn event_types(batch: &[AnyEvent]) -> Vec<&'static str> {
    batch.iter().map(|e| e.event_type()).collect()
}

#[tokio::test]
async fn alice_scenario_publishes_each_batch() {
    let mut ctx = AppContext::build(Config::default());
    let mut receiver = ctx.take_event_receiver().expect("publisher enabled by default");
    assert!(ctx.take_event_receiver().is_none());

    let alice = ctx
        .users
        .create_user("alice@example.com", "alice", "Alice", "Liddell")
        .await
        .unwrap();
    let batch = receiver.recv().await.unwrap();
    assert_eq!(event_types(&batch), vec!["UserCreated"]);
    assert!(matches!(
        &batch[0],
        AnyEvent::User(UserEvent::UserCreated(data)) if data.user_id == alice.id()
    ));

    let err = ctx
        .users
        .create_user("alice@example.com", "alice-again", "A", "L")
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::DuplicateKey { field: "email", .. }));
    assert!(receiver.try_recv().is_err());

    ctx.users.soft_delete_user(alice.id()).await.unwrap();
    assert_eq!(
        event_types(&receiver.recv().await.unwrap()),
        vec!["UserDeleted"]
    );
    assert!(ctx.users.list_users(ListQuery::active()).await.unwrap().is_empty());
    assert_eq!(
        ctx.users.list_users(ListQuery::deleted_only()).await.unwrap().len(),
        1
    );

    ctx.users.restore_user(alice.id()).await.unwrap();
    assert!(receiver.try_recv().is_err());
    assert_eq!(ctx.users.list_users(ListQuery::active()).await.unwrap().len(), 1);
}

#[tokio::test]
async fn services_share_one_dispatcher() {
    let mut ctx = AppContext::build(Config::default());
    let mut receiver = ctx.take_event_receiver().unwrap();

    let user = ctx
        .users
        .create_user("shop@example.com", "shop", "Shop", "Keeper")
        .await
        .unwrap();
    let product = ctx
        .products
        .create_product(NewProduct::new("Lamp", "LMP-1", Money::from_cents(4200), user.id()))
        .await
        .unwrap();
    let order = ctx
        .orders
        .place_order(user.id(), vec![OrderLine::new(product.id(), 2)])
        .await
        .unwrap();
    ctx.orders.cancel_order(order.id()).await.unwrap();

    let mut seen = Vec::new();
    for _ in 0..4 {
        seen.extend(event_types(&receiver.recv().await.unwrap()));
    }
    assert_eq!(
        seen,
        vec!["UserCreated", "ProductCreated", "OrderCreated", "OrderCancelled"]
    );
    assert_eq!(ctx.dispatcher.handler_count(), 3);
}

#[tokio::test]
async fn publisher_can_be_disabled() {
    let config = Config {
        event_publisher_enabled: false,
        ..Config::default()
    };
    let mut ctx = AppContext::build(config);

    assert!(ctx.take_event_receiver().is_none());
    assert!(!ctx.dispatcher.has_publisher());
    ctx.users
        .create_user("nopub@example.com", "nopub", "No", "Pub")
        .await
        .unwrap();
}

#[tokio::test]
async fn dropped_receiver_fails_dispatch_but_keeps_the_write() {
    let mut ctx = AppContext::build(Config::default());
    drop(ctx.take_event_receiver());

    let err = ctx
        .users
        .create_user("late@example.com", "late", "Late", "Reader")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DomainError::Dispatch(DispatchError::Publisher { .. })
    ));
    let users = ctx.users.list_users(ListQuery::active()).await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].email(), "late@example.com");
}

#[tokio::test]
async fn metrics_render_when_a_recorder_is_attached() {
    let ctx = AppContext::build(Config::default());
    assert!(ctx.render_metrics().is_none());

    let mut ctx = ctx.with_metrics_handle(Some(get_metrics_handle()));
    let _receiver = ctx.take_event_receiver();
    ctx.users
        .create_user("metrics@example.com", "metrics", "Met", "Rics")
        .await
        .unwrap();

    let rendered = ctx.render_metrics().unwrap();
    assert!(rendered.contains("domain_events_dispatched_total"));
}

#[tokio::test]
async fn undrained_channel_fails_dispatch_instead_of_blocking() {
    let config = Config {
        event_channel_capacity: 1,
        ..Config::default()
    };
    let ctx = AppContext::build(config);

    ctx.users
        .create_user("first@example.com", "first", "First", "Writer")
        .await
        .unwrap();
    let second = tokio::time::timeout(
        Duration::from_secs(2),
        ctx.users
            .create_user("second@example.com", "second", "Second", "Writer"),
    )
    .await
    .expect("write returns while the channel is full");

    assert!(matches!(
        second,
        Err(DomainError::Dispatch(DispatchError::Publisher { .. }))
    ));
    let users = ctx.users.list_users(ListQuery::active()).await.unwrap();
    assert_eq!(users.len(), 2);
}
