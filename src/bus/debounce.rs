// src/bus/debounce.rs

//! Trailing-edge debouncer on the tokio timer.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::trace;

/// Runs only the last of a burst of calls, `delay` after that last call.
///
/// Each call bumps a generation counter and spawns a sleeper; a sleeper that
/// wakes to find a newer generation does nothing. Must be called from within
/// a tokio runtime.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    generation: Arc<AtomicU64>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn call<F>(&self, action: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let generation = Arc::clone(&self.generation);
        let delay = self.delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if generation.load(Ordering::SeqCst) == ticket {
                action();
            } else {
                trace!(ticket, "debounced call superseded");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test]
    async fn burst_collapses_to_one_call() {
        let debouncer = Debouncer::new(Duration::from_millis(20));
        let hits = Arc::new(AtomicUsize::new(0));

        for _ in 0..5 {
            let h = Arc::clone(&hits);
            debouncer.call(move || {
                h.fetch_add(1, Ordering::SeqCst);
            });
        }

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn spaced_calls_each_fire() {
        let debouncer = Debouncer::new(Duration::from_millis(10));
        let hits = Arc::new(AtomicUsize::new(0));

        for _ in 0..2 {
            let h = Arc::clone(&hits);
            debouncer.call(move || {
                h.fetch_add(1, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(80)).await;
        }

        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
