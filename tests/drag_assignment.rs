// tests/drag_assignment.rs

use std::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use fieldsched::assign::{DragAssignmentController, DragState, DropOutcome, DropTarget};
use fieldsched::backend::JobBackend;
use fieldsched::bus::{ScheduleBus, Subscription, Topic};
use fieldsched::calendar::{CalendarWindow, compute_window};
use fieldsched::model::{JobId, SchedulePatch};
use fieldsched::pool::{JobPoolStore, PoolLocation};
use fieldsched::types::Granularity;
use fieldsched_test_utils::builders::{JobBuilder, day};
use fieldsched_test_utils::fake_backend::{BackendCall, FakeBackend};
use fieldsched_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

const DEBOUNCE: Duration = Duration::from_millis(50);

struct Harness {
    backend: FakeBackend,
    bus: ScheduleBus,
    store: JobPoolStore,
    window: CalendarWindow,
    controller: DragAssignmentController,
    published: Arc<AtomicUsize>,
    _subscription: Subscription,
}

async fn harness(backend: FakeBackend) -> Harness {
    init_tracing();
    let shared: Arc<dyn JobBackend> = Arc::new(backend.clone());
    let bus = ScheduleBus::new();
    let published = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&published);
    let subscription = bus.subscribe(Topic::ScheduleChanged, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let window = compute_window(day(2026, 10, 14), Granularity::Week);
    let mut store = JobPoolStore::new(Arc::clone(&shared));
    store.load_open().await;
    store
        .load_windowed(window.range_start(), window.range_end())
        .await;
    backend.clear_calls();

    Harness {
        controller: DragAssignmentController::new(shared, bus.clone(), DEBOUNCE),
        backend,
        bus,
        store,
        window,
        published,
        _subscription: subscription,
    }
}

async fn settle() {
    tokio::time::sleep(DEBOUNCE * 4).await;
}

fn board() -> FakeBackend {
    FakeBackend::new(vec![
        JobBuilder::new(7).address("1023 Cedar Ave").build(),
        JobBuilder::new(3)
            .start("2026-10-13T09:00:00")
            .end("2026-10-13T11:00:00")
            .crew(2)
            .build(),
    ])
}

#[tokio::test]
async fn drop_on_day_moves_job_out_of_unscheduled_pool() -> TestResult {
    let mut h = harness(board()).await;
    let wednesday = day(2026, 10, 14);
    assert_eq!(h.store.locate(JobId(7)), Some(PoolLocation::Unscheduled));

    let outcome = h
        .controller
        .drop_on_day("7", wednesday, &mut h.store, &h.window)
        .await;

    assert_eq!(
        outcome,
        DropOutcome::Settled {
            job: JobId(7),
            target: DropTarget::Day(wednesday),
            persisted: true,
        }
    );
    let stored = h.backend.job(JobId(7)).ok_or("job 7 missing")?;
    assert_eq!(stored.scheduled_start.as_deref(), Some("2026-10-14T00:00:00"));
    assert_eq!(stored.scheduled_end, None);

    assert!(h.store.unscheduled().iter().all(|j| j.id != JobId(7)));
    assert_eq!(h.store.locate(JobId(7)), Some(PoolLocation::Day(wednesday)));
    assert_eq!(h.store.bucket_for_key("2026-10-14").len(), 1);

    settle().await;
    assert_eq!(h.published.load(Ordering::SeqCst), 1);
    Ok(())
}

#[tokio::test]
async fn assign_day_leaves_existing_end_alone() -> TestResult {
    let mut h = harness(board()).await;
    h.controller
        .drop_on_day("#3", day(2026, 10, 16), &mut h.store, &h.window)
        .await;

    let stored = h.backend.job(JobId(3)).ok_or("job 3 missing")?;
    assert_eq!(stored.scheduled_start.as_deref(), Some("2026-10-16T00:00:00"));
    assert_eq!(stored.scheduled_end.as_deref(), Some("2026-10-13T11:00:00"));
    assert_eq!(h.store.locate(JobId(3)), Some(PoolLocation::Day(day(2026, 10, 16))));
    Ok(())
}

#[tokio::test]
async fn re_dropping_on_the_same_day_is_idempotent() -> TestResult {
    let mut h = harness(board()).await;
    let wednesday = day(2026, 10, 14);

    h.controller
        .drop_on_day("7", wednesday, &mut h.store, &h.window)
        .await;
    let first = h.backend.job(JobId(7));
    let first_bucket = h.store.bucket(wednesday).to_vec();

    h.controller
        .drop_on_day("7", wednesday, &mut h.store, &h.window)
        .await;

    assert_eq!(h.backend.job(JobId(7)), first);
    assert_eq!(h.store.bucket(wednesday), first_bucket.as_slice());
    let updates = h.backend.calls().iter().filter(|c| c.is_update()).count();
    assert_eq!(updates, 2);
    Ok(())
}

#[tokio::test]
async fn unschedule_clears_start_and_end() -> TestResult {
    let mut h = harness(board()).await;
    assert_eq!(h.store.locate(JobId(3)), Some(PoolLocation::Day(day(2026, 10, 13))));

    let outcome = h
        .controller
        .drop_on_unscheduled("3", &mut h.store, &h.window)
        .await;
    assert!(matches!(
        outcome,
        DropOutcome::Settled {
            target: DropTarget::Unscheduled,
            persisted: true,
            ..
        }
    ));

    let stored = h.backend.job(JobId(3)).ok_or("job 3 missing")?;
    assert_eq!(stored.scheduled_start, None);
    assert_eq!(stored.scheduled_end, None);
    assert_eq!(h.store.locate(JobId(3)), Some(PoolLocation::Unscheduled));
    assert!(h.store.bucket(day(2026, 10, 13)).is_empty());

    // And back onto the board.
    h.controller
        .drop_on_day("3", day(2026, 10, 15), &mut h.store, &h.window)
        .await;
    assert_eq!(h.store.locate(JobId(3)), Some(PoolLocation::Day(day(2026, 10, 15))));
    Ok(())
}

#[tokio::test]
async fn invalid_payloads_are_ignored_without_side_effects() -> TestResult {
    let mut h = harness(board()).await;

    for payload in ["", "abc", "0", "#", "-4"] {
        let outcome = h
            .controller
            .drop_on_day(payload, day(2026, 10, 14), &mut h.store, &h.window)
            .await;
        assert_eq!(outcome, DropOutcome::Ignored, "payload {payload:?}");
        assert_eq!(h.controller.state(), DragState::Idle);
    }
    let outcome = h
        .controller
        .drop_on_unscheduled("seven", &mut h.store, &h.window)
        .await;
    assert_eq!(outcome, DropOutcome::Ignored);

    assert!(h.backend.calls().is_empty());
    settle().await;
    assert_eq!(h.published.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn drop_without_active_drag_is_ignored() -> TestResult {
    let mut h = harness(board()).await;

    let outcome = h
        .controller
        .drop_on(DropTarget::Day(day(2026, 10, 14)), &mut h.store, &h.window)
        .await;
    assert_eq!(outcome, DropOutcome::Ignored);

    assert!(h.controller.begin_drag("7"));
    assert_eq!(h.controller.state(), DragState::Dragging(JobId(7)));
    h.controller.cancel_drag();
    let outcome = h
        .controller
        .drop_on(DropTarget::Unscheduled, &mut h.store, &h.window)
        .await;
    assert_eq!(outcome, DropOutcome::Ignored);
    assert!(h.backend.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn failed_write_still_reloads_but_does_not_publish() -> TestResult {
    let mut h = harness(board()).await;
    h.backend.fail_updates(true);

    let outcome = h
        .controller
        .drop_on_day("7", day(2026, 10, 14), &mut h.store, &h.window)
        .await;
    assert_eq!(
        outcome,
        DropOutcome::Settled {
            job: JobId(7),
            target: DropTarget::Day(day(2026, 10, 14)),
            persisted: false,
        }
    );

    let calls = h.backend.calls();
    assert!(calls[0].is_update());
    assert_eq!(calls.iter().filter(|c| c.is_list()).count(), 3);

    // Pools reflect the backend, which did not change.
    assert_eq!(h.store.locate(JobId(7)), Some(PoolLocation::Unscheduled));

    settle().await;
    assert_eq!(h.published.load(Ordering::SeqCst), 0);
    Ok(())
}

#[tokio::test]
async fn write_then_reload_then_publish() -> TestResult {
    let mut h = harness(board()).await;

    let seen_at_publish: Arc<Mutex<Option<Vec<BackendCall>>>> = Arc::new(Mutex::new(None));
    let slot = Arc::clone(&seen_at_publish);
    let backend = h.backend.clone();
    let _probe = h.bus.subscribe(Topic::ScheduleChanged, move |_| {
        *slot.lock().unwrap() = Some(backend.calls());
    });

    h.controller
        .drop_on_day("7", day(2026, 10, 15), &mut h.store, &h.window)
        .await;
    with_timeout(async {
        while seen_at_publish.lock().unwrap().is_none() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;

    let calls = seen_at_publish.lock().unwrap().clone().ok_or("never published")?;
    assert_eq!(
        calls[0],
        BackendCall::UpdateSchedule(JobId(7), SchedulePatch::AssignDay(day(2026, 10, 15)))
    );
    assert_eq!(calls.len(), 4);
    assert!(calls[1..].iter().all(BackendCall::is_list));
    Ok(())
}

#[tokio::test]
async fn bursts_of_drops_publish_once() -> TestResult {
    let mut h = harness(board()).await;

    h.controller
        .drop_on_day("7", day(2026, 10, 14), &mut h.store, &h.window)
        .await;
    h.controller
        .drop_on_day("3", day(2026, 10, 15), &mut h.store, &h.window)
        .await;

    settle().await;
    assert_eq!(h.published.load(Ordering::SeqCst), 1);
    Ok(())
}
