// src/bus/mod.rs

//! In-process publish/subscribe used to keep independently open views in
//! agreement that the schedule changed.
//!
//! Topics carry no payload. Subscribers are expected to reload their own
//! queries in full rather than patch local state. Delivery is synchronous to
//! every handler registered at publish time; there is no replay.
//!
//! - [`ScheduleBus`] is a cheap-to-clone handle; inject one instance into
//!   every view and controller that should share notifications.
//! - [`Debouncer`] collapses bursts of calls into one, used for publishing.

pub mod debounce;

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, trace, warn};

pub use debounce::Debouncer;

/// Notification topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// A job's schedule was persisted; windowed queries may be stale.
    ScheduleChanged,
}

impl Topic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::ScheduleChanged => "scheduleChanged",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

type Handler = Arc<dyn Fn(Topic) + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    entries: Vec<(u64, Topic, Handler)>,
}

#[derive(Clone, Default)]
pub struct ScheduleBus {
    registry: Arc<Mutex<Registry>>,
}

impl fmt::Debug for ScheduleBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduleBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl ScheduleBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        match self.registry.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("bus registry mutex poisoned; continuing with inner state");
                poisoned.into_inner()
            }
        }
    }

    /// Register `handler` for `topic`.
    ///
    /// The returned [`Subscription`] must be kept alive for as long as the
    /// subscriber wants notifications; call
    /// [`Subscription::unsubscribe`] on teardown (dropping it also
    /// unregisters).
    pub fn subscribe<F>(&self, topic: Topic, handler: F) -> Subscription
    where
        F: Fn(Topic) + Send + Sync + 'static,
    {
        let mut registry = self.registry();
        registry.next_id += 1;
        let id = registry.next_id;
        registry.entries.push((id, topic, Arc::new(handler)));
        debug!(id, %topic, "bus subscription registered");

        Subscription {
            id,
            bus: Some(self.clone()),
        }
    }

    /// Deliver `topic` to every currently registered handler.
    ///
    /// Handlers run outside the registry lock, so they may subscribe or
    /// unsubscribe without deadlocking. Returns how many were notified.
    pub fn publish(&self, topic: Topic) -> usize {
        let handlers: Vec<Handler> = self
            .registry()
            .entries
            .iter()
            .filter(|(_, t, _)| *t == topic)
            .map(|(_, _, h)| Arc::clone(h))
            .collect();

        trace!(%topic, subscribers = handlers.len(), "publishing");
        for handler in &handlers {
            handler(topic);
        }
        handlers.len()
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry().entries.len()
    }

    fn remove(&self, id: u64) -> bool {
        let mut registry = self.registry();
        let before = registry.entries.len();
        registry.entries.retain(|(entry_id, _, _)| *entry_id != id);
        before != registry.entries.len()
    }
}

/// Registration handle returned by [`ScheduleBus::subscribe`].
#[must_use = "dropping a Subscription unregisters its handler"]
pub struct Subscription {
    id: u64,
    bus: Option<ScheduleBus>,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.bus.is_some())
            .finish()
    }
}

impl Subscription {
    /// Unregister the handler. Idempotent.
    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(bus) = self.bus.take() {
            if bus.remove(self.id) {
                debug!(id = self.id, "bus subscription removed");
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}
