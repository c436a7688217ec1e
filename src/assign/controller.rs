// src/assign/controller.rs

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::backend::JobBackend;
use crate::bus::{Debouncer, ScheduleBus, Topic};
use crate::calendar::{CalendarWindow, day_key};
use crate::model::{JobId, SchedulePatch};
use crate::pool::JobPoolStore;

/// Where a dragged job was released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropTarget {
    Day(NaiveDate),
    Unscheduled,
}

impl DropTarget {
    fn patch(&self) -> SchedulePatch {
        match self {
            DropTarget::Day(day) => SchedulePatch::AssignDay(*day),
            DropTarget::Unscheduled => SchedulePatch::Unschedule,
        }
    }
}

impl fmt::Display for DropTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropTarget::Day(day) => f.write_str(&day_key(*day)),
            DropTarget::Unscheduled => f.write_str("unscheduled"),
        }
    }
}

/// Per-operation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragState {
    Idle,
    Dragging(JobId),
    Dropped { job: JobId, target: DropTarget },
    Persisting { job: JobId, target: DropTarget },
    /// Write finished (`persisted` says whether it succeeded) and both pools
    /// were reloaded.
    Settled {
        job: JobId,
        target: DropTarget,
        persisted: bool,
    },
}

/// Result of one drop command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// Missing/invalid job id, or no drag in progress. Nothing was written.
    Ignored,
    Settled {
        job: JobId,
        target: DropTarget,
        persisted: bool,
    },
}

/// Orchestrates persist -> reload -> publish for a drop.
pub struct DragAssignmentController {
    backend: Arc<dyn JobBackend>,
    bus: ScheduleBus,
    publisher: Debouncer,
    state: DragState,
}

impl fmt::Debug for DragAssignmentController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragAssignmentController")
            .field("state", &self.state)
            .field("publish_delay", &self.publisher.delay())
            .finish_non_exhaustive()
    }
}

impl DragAssignmentController {
    pub fn new(backend: Arc<dyn JobBackend>, bus: ScheduleBus, publish_debounce: Duration) -> Self {
        Self {
            backend,
            bus,
            publisher: Debouncer::new(publish_debounce),
            state: DragState::Idle,
        }
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    /// Start dragging the job named by `payload`.
    ///
    /// An unparsable payload leaves the controller idle. Returns whether a
    /// drag is now in progress.
    pub fn begin_drag(&mut self, payload: &str) -> bool {
        match payload.parse::<JobId>() {
            Ok(job) => {
                debug!(%job, "drag started");
                self.state = DragState::Dragging(job);
                true
            }
            Err(reason) => {
                debug!(payload, %reason, "ignoring drag with invalid job id");
                self.state = DragState::Idle;
                false
            }
        }
    }

    /// Abandon a drag without dropping it anywhere.
    pub fn cancel_drag(&mut self) {
        if let DragState::Dragging(job) = self.state {
            debug!(%job, "drag cancelled");
        }
        self.state = DragState::Idle;
    }

    /// Drop `payload` onto `day`.
    pub async fn drop_on_day(
        &mut self,
        payload: &str,
        day: NaiveDate,
        store: &mut JobPoolStore,
        window: &CalendarWindow,
    ) -> DropOutcome {
        if !self.begin_drag(payload) {
            return DropOutcome::Ignored;
        }
        self.drop_on(DropTarget::Day(day), store, window).await
    }

    /// Drop `payload` onto the unscheduled zone.
    pub async fn drop_on_unscheduled(
        &mut self,
        payload: &str,
        store: &mut JobPoolStore,
        window: &CalendarWindow,
    ) -> DropOutcome {
        if !self.begin_drag(payload) {
            return DropOutcome::Ignored;
        }
        self.drop_on(DropTarget::Unscheduled, store, window).await
    }

    /// Release the current drag on `target`.
    ///
    /// Order within one call is fixed: the backend write completes, then the
    /// unscheduled and windowed pools are reloaded (whether or not the write
    /// succeeded), then, only on success, `scheduleChanged` is published
    /// through the debouncer.
    pub async fn drop_on(
        &mut self,
        target: DropTarget,
        store: &mut JobPoolStore,
        window: &CalendarWindow,
    ) -> DropOutcome {
        let DragState::Dragging(job) = self.state else {
            debug!(state = ?self.state, %target, "drop without an active drag; ignoring");
            return DropOutcome::Ignored;
        };

        self.state = DragState::Dropped { job, target };
        debug!(%job, %target, "job dropped");

        self.state = DragState::Persisting { job, target };
        let persisted = match self.backend.update_schedule(job, target.patch()).await {
            Ok(_) => {
                info!(%job, %target, "job schedule updated");
                true
            }
            Err(err) => {
                warn!(%job, %target, error = %err, "failed to update job schedule");
                false
            }
        };

        store.load_open().await;
        store
            .load_windowed(window.range_start(), window.range_end())
            .await;

        if persisted {
            let bus = self.bus.clone();
            self.publisher.call(move || {
                bus.publish(Topic::ScheduleChanged);
            });
        }

        self.state = DragState::Settled {
            job,
            target,
            persisted,
        };
        DropOutcome::Settled {
            job,
            target,
            persisted,
        }
    }
}
