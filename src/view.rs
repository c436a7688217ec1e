// src/view.rs

//! One open calendar surface.
//!
//! A `CalendarView` owns its window, its pools and its drag controller, and
//! listens on the shared [`ScheduleBus`]. Several views can be open over the
//! same backend at once; each reloads in full when any of them announces a
//! change, so none depends on another's local state.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::assign::{DragAssignmentController, DropOutcome};
use crate::backend::JobBackend;
use crate::bus::{ScheduleBus, Subscription, Topic};
use crate::calendar::{CalendarWindow, compute_window};
use crate::model::CrewId;
use crate::pool::JobPoolStore;
use crate::types::Granularity;

#[derive(Debug)]
pub struct CalendarView {
    window: CalendarWindow,
    store: JobPoolStore,
    controller: DragAssignmentController,
    debounce: Duration,
    notifications: mpsc::UnboundedReceiver<Topic>,
    subscription: Option<Subscription>,
}

impl CalendarView {
    /// Open a view anchored on `anchor` and register it on `bus`.
    ///
    /// Nothing is loaded until [`refresh`](Self::refresh) is called.
    pub fn open(
        backend: Arc<dyn JobBackend>,
        bus: ScheduleBus,
        anchor: NaiveDate,
        granularity: Granularity,
        debounce: Duration,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let subscription = bus.subscribe(Topic::ScheduleChanged, move |topic| {
            // Receiver gone means the view was torn down; nothing to do.
            let _ = tx.send(topic);
        });

        Self {
            window: compute_window(anchor, granularity),
            store: JobPoolStore::new(Arc::clone(&backend)),
            controller: DragAssignmentController::new(backend, bus, debounce),
            debounce,
            notifications: rx,
            subscription: Some(subscription),
        }
    }

    pub fn window(&self) -> &CalendarWindow {
        &self.window
    }

    pub fn store(&self) -> &JobPoolStore {
        &self.store
    }

    pub fn controller(&self) -> &DragAssignmentController {
        &self.controller
    }

    /// Reload both pools for the current window.
    pub async fn refresh(&mut self) {
        self.store.load_open().await;
        self.reload_windowed().await;
    }

    /// Reload the crew directory used for labels and grouping.
    pub async fn load_crews(&mut self) {
        self.store.load_crews().await;
    }

    async fn reload_windowed(&mut self) {
        self.store
            .load_windowed(self.window.range_start(), self.window.range_end())
            .await;
    }

    pub async fn next(&mut self) {
        self.window = self.window.next();
        self.reload_windowed().await;
    }

    pub async fn previous(&mut self) {
        self.window = self.window.previous();
        self.reload_windowed().await;
    }

    /// Switch between week and month view, keeping the anchor.
    pub async fn set_granularity(&mut self, granularity: Granularity) {
        if granularity == self.window.granularity() {
            return;
        }
        self.window = compute_window(self.window.anchor(), granularity);
        self.reload_windowed().await;
    }

    pub async fn set_crew_filter(&mut self, crew: Option<CrewId>) {
        self.store.set_crew_filter(crew);
        self.reload_windowed().await;
    }

    pub async fn drop_on_day(&mut self, payload: &str, day: NaiveDate) -> DropOutcome {
        self.controller
            .drop_on_day(payload, day, &mut self.store, &self.window)
            .await
    }

    pub async fn drop_on_unscheduled(&mut self, payload: &str) -> DropOutcome {
        self.controller
            .drop_on_unscheduled(payload, &mut self.store, &self.window)
            .await
    }

    /// Wait for a schedule change notification, then reload.
    ///
    /// Further notifications arriving within the debounce window are folded
    /// into the same reload. Returns `false` once the view is torn down and
    /// no more notifications can arrive.
    pub async fn wait_for_change(&mut self) -> bool {
        if self.subscription.is_none() {
            return false;
        }
        let Some(topic) = self.notifications.recv().await else {
            return false;
        };

        let mut coalesced = 1usize;
        while let Ok(Some(_)) = tokio::time::timeout(self.debounce, self.notifications.recv()).await {
            coalesced += 1;
        }

        debug!(%topic, coalesced, "schedule changed elsewhere; reloading");
        self.refresh().await;
        true
    }

    /// Unregister from the bus. Late notifications are dropped.
    pub fn teardown(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
            self.notifications.close();
            info!(window = %self.window.title(), "calendar view closed");
        }
    }
}

impl Drop for CalendarView {
    fn drop(&mut self) {
        self.teardown();
    }
}
