// tests/cross_view_sync.rs

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use fieldsched::backend::JobBackend;
use fieldsched::bus::{ScheduleBus, Topic};
use fieldsched::model::JobId;
use fieldsched::pool::PoolLocation;
use fieldsched::types::Granularity;
use fieldsched::view::CalendarView;
use fieldsched_test_utils::builders::{JobBuilder, day};
use fieldsched_test_utils::fake_backend::FakeBackend;
use fieldsched_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

const DEBOUNCE: Duration = Duration::from_millis(30);

fn open(backend: &FakeBackend, bus: &ScheduleBus, granularity: Granularity) -> CalendarView {
    let shared: Arc<dyn JobBackend> = Arc::new(backend.clone());
    CalendarView::open(shared, bus.clone(), day(2026, 10, 14), granularity, DEBOUNCE)
}

fn records() -> FakeBackend {
    FakeBackend::new(vec![
        JobBuilder::new(7).build(),
        JobBuilder::new(8).start("2026-10-13T08:00:00").build(),
    ])
}

#[tokio::test]
async fn drop_in_one_view_reloads_the_other() -> TestResult {
    init_tracing();
    let backend = records();
    let bus = ScheduleBus::new();

    let mut week = open(&backend, &bus, Granularity::Week);
    let mut month = open(&backend, &bus, Granularity::Month);
    week.refresh().await;
    month.refresh().await;
    assert_eq!(month.store().locate(JobId(7)), Some(PoolLocation::Unscheduled));

    week.drop_on_day("7", day(2026, 10, 22)).await;
    // Outside the week window, so the week view only sees it leave the pool.
    assert_eq!(week.store().locate(JobId(7)), None);

    assert!(with_timeout(month.wait_for_change()).await);
    assert_eq!(
        month.store().locate(JobId(7)),
        Some(PoolLocation::Day(day(2026, 10, 22)))
    );
    Ok(())
}

#[tokio::test]
async fn burst_of_notifications_causes_one_reload() -> TestResult {
    init_tracing();
    let backend = records();
    let bus = ScheduleBus::new();
    let mut view = open(&backend, &bus, Granularity::Week);

    for _ in 0..3 {
        assert_eq!(bus.publish(Topic::ScheduleChanged), 1);
    }
    assert!(with_timeout(view.wait_for_change()).await);

    // One reload: two open-status listings plus one windowed listing.
    assert_eq!(backend.calls().len(), 3);

    let pending = tokio::time::timeout(DEBOUNCE * 3, view.wait_for_change()).await;
    assert!(pending.is_err(), "no further reload expected");
    Ok(())
}

#[tokio::test]
async fn teardown_stops_delivery() -> TestResult {
    init_tracing();
    let backend = records();
    let bus = ScheduleBus::new();

    let mut a = open(&backend, &bus, Granularity::Week);
    let mut b = open(&backend, &bus, Granularity::Week);
    assert_eq!(bus.subscriber_count(), 2);

    b.teardown();
    assert_eq!(bus.subscriber_count(), 1);

    a.refresh().await;
    a.drop_on_day("7", day(2026, 10, 15)).await;
    backend.clear_calls();

    assert!(!with_timeout(b.wait_for_change()).await);
    assert!(backend.calls().is_empty());

    drop(a);
    assert_eq!(bus.subscriber_count(), 0);
    Ok(())
}

#[tokio::test]
async fn navigation_reloads_only_the_window() -> TestResult {
    init_tracing();
    let backend = records();
    let bus = ScheduleBus::new();
    let mut view = open(&backend, &bus, Granularity::Week);
    view.refresh().await;
    assert_eq!(view.store().bucket(day(2026, 10, 13)).len(), 1);

    backend.clear_calls();
    view.next().await;
    assert_eq!(view.window().range_start(), day(2026, 10, 19));
    assert!(view.store().bucket(day(2026, 10, 13)).is_empty());
    assert_eq!(backend.calls().len(), 1);

    view.previous().await;
    view.set_granularity(Granularity::Month).await;
    assert_eq!(view.window().range_start(), day(2026, 9, 28));
    assert_eq!(view.window().range_end(), day(2026, 10, 31));
    assert_eq!(view.store().bucket(day(2026, 10, 13)).len(), 1);
    // The unscheduled pool was never reloaded.
    assert_eq!(view.store().unscheduled().len(), 1);
    Ok(())
}
