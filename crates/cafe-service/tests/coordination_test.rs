use cafe_service::config::{ServiceConfig, WaiterConfig};
use cafe_service::error::ServiceError;
use cafe_service::feed::{anchor, parse_feed};
use cafe_service::lifecycle::{Coordinator, ServicePhase};
use cafe_service::model::{Order, OrderId};
use cafe_service::order_source::OrderSource;
use pipeline_framework::mock::{MockSource, SharedBuffer};
use std::time::Duration;
use tokio::time::Instant;

fn config() -> ServiceConfig {
    ServiceConfig {
        interactive: false,
        seed: Some(7),
        waiters: vec![
            WaiterConfig::named("Alice", 1.9),
            WaiterConfig::named("Charlie", 0.6),
            WaiterConfig::named("Dana", 1.0),
        ],
        ..ServiceConfig::default()
    }
}

/// Three waiters compete for the source, but the intake lock lets only one
/// of them inside `next()` at a time.
#[tokio::test(start_paused = true)]
async fn test_source_never_read_concurrently() {
    let mut source = MockSource::new();
    for id in 1..=5u32 {
        source
            .expect_next()
            .after(Duration::from_millis(150))
            .return_item(Order::new(id, ["espresso"]));
    }
    let stats = source.stats();

    let report = Coordinator::new(config())
        .run(source, SharedBuffer::new())
        .await
        .expect("Service failed");

    stats.verify();
    assert_eq!(stats.max_concurrent(), 1);
    // Five orders, then one end-marker per waiter.
    assert_eq!(stats.calls(), 5 + 3);
    assert_eq!(report.taken.len(), 5);
    assert!(report.is_conserved());
}

/// Cancelling during the countdown ends the run with an error, leaves
/// `closing` unset, and still flushes the cancellation notice to the journal.
#[tokio::test(start_paused = true)]
async fn test_cancel_mid_countdown() {
    let coordinator = Coordinator::new(config());
    let handle = coordinator.handle();
    let buffer = SharedBuffer::new();

    let canceller = {
        let handle = handle.clone();
        tokio::spawn(async move {
            handle.wait_for_phase(ServicePhase::Closing).await;
            tokio::time::sleep(Duration::from_millis(1_500)).await;
            handle.cancel();
        })
    };

    let result = coordinator
        .run(MockSource::from_items([Order::new(1, ["tea"])]), buffer.clone())
        .await;
    canceller.await.expect("Canceller panicked");

    let err = result.expect_err("Cancelled run should fail");
    assert!(matches!(err, ServiceError::Cancelled(ServicePhase::Closing)));
    assert!(err.is_cancelled());
    assert!(!handle.is_closing());
    assert_eq!(handle.phase(), ServicePhase::Closing);

    let lines = buffer.lines();
    assert!(lines.contains(&"[SYSTEM] closing cancelled".to_string()));
    assert!(!lines.contains(&"[SYSTEM] doors closed".to_string()));
}

/// Cancelling while the doors are open stops every worker.
#[tokio::test(start_paused = true)]
async fn test_cancel_while_open() {
    let coordinator = Coordinator::new(config());
    let handle = coordinator.handle();
    let orders = OrderSource::new(
        anchor(parse_feed("0 tea\n600 cake\n"), Instant::now()),
        Duration::from_millis(200),
    );

    let canceller = {
        let handle = handle.clone();
        tokio::spawn(async move {
            handle.wait_for_phase(ServicePhase::Open).await;
            tokio::time::sleep(Duration::from_secs(5)).await;
            handle.cancel();
        })
    };

    let start = Instant::now();
    let err = coordinator
        .run(orders, SharedBuffer::new())
        .await
        .expect_err("Cancelled run should fail");
    canceller.await.expect("Canceller panicked");

    assert!(matches!(err, ServiceError::Cancelled(ServicePhase::Open)));
    assert!(Instant::now() - start < Duration::from_secs(10));
}

/// A close request stops intake before the feed runs out; what was taken is
/// still prepared and served.
#[tokio::test(start_paused = true)]
async fn test_request_close_stops_intake() {
    let coordinator = Coordinator::new(config());
    let handle = coordinator.handle();
    let buffer = SharedBuffer::new();
    let orders = OrderSource::new(
        anchor(parse_feed("0 espresso,latte\n1 tea\n300 cake\n"), Instant::now()),
        Duration::from_millis(200),
    );

    let closer = {
        let handle = handle.clone();
        tokio::spawn(async move {
            handle.wait_for_phase(ServicePhase::Open).await;
            tokio::time::sleep(Duration::from_secs(10)).await;
            assert!(handle.request_close());
            assert!(!handle.request_close());
        })
    };

    let start = Instant::now();
    let report = coordinator
        .run(orders, buffer.clone())
        .await
        .expect("Service failed");
    closer.await.expect("Closer panicked");

    assert_eq!(report.taken, vec![OrderId(1), OrderId(2)]);
    assert!(report.is_conserved());
    assert!(Instant::now() - start < Duration::from_secs(300));
    assert_eq!(handle.phase(), ServicePhase::Stopped);
    assert!(buffer
        .lines()
        .contains(&"[SYSTEM] close requested, no new orders".to_string()));
}
