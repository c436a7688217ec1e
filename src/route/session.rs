// src/route/session.rs

//! One route-planning surface: stops, the optimize toggle, provider
//! readiness and the sequencer.
//!
//! Re-planning is due whenever the stop set or the optimize flag differ from
//! what the current result was planned for, or when the provider has just
//! become ready. Nothing re-plans on its own after a failure; a new trigger
//! is needed.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use crate::errors::Result;
use crate::model::{Depot, NewStop, Stop, StopId};
use crate::route::provider::RoutingProvider;
use crate::route::sequencer::{RouteResult, RouteSequencer};
use crate::route::stops::StopModel;

#[derive(Debug)]
pub struct RouteSession {
    stops: StopModel,
    optimize: bool,
    provider_ready: bool,
    sequencer: RouteSequencer,
    /// `(stop revision, optimize)` the current result was planned for.
    planned_for: Option<(u64, bool)>,
    crew: Option<String>,
    date: Option<NaiveDate>,
}

impl RouteSession {
    /// New session with optimization on and the provider not yet ready.
    pub fn new(depot: Depot, provider: Arc<dyn RoutingProvider>) -> Self {
        Self::with_stops(StopModel::new(depot), provider)
    }

    pub fn with_stops(stops: StopModel, provider: Arc<dyn RoutingProvider>) -> Self {
        Self {
            stops,
            optimize: true,
            provider_ready: false,
            sequencer: RouteSequencer::new(provider),
            planned_for: None,
            crew: None,
            date: None,
        }
    }

    /// Label the session with the crew and day it plans for. Display only;
    /// planning never reads it.
    pub fn set_context(&mut self, crew: Option<String>, date: Option<NaiveDate>) {
        self.crew = crew.filter(|name| !name.trim().is_empty());
        self.date = date;
    }

    pub fn crew(&self) -> Option<&str> {
        self.crew.as_deref()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    /// `"North crew on 2026-10-14"` style heading, or `None` without context.
    pub fn context_label(&self) -> Option<String> {
        match (self.crew.as_deref(), self.date) {
            (Some(crew), Some(date)) => Some(format!("{crew} on {date}")),
            (Some(crew), None) => Some(crew.to_string()),
            (None, Some(date)) => Some(date.to_string()),
            (None, None) => None,
        }
    }

    pub fn stops(&self) -> &StopModel {
        &self.stops
    }

    pub fn sequencer(&self) -> &RouteSequencer {
        &self.sequencer
    }

    pub fn optimize(&self) -> bool {
        self.optimize
    }

    pub fn add_stop(&mut self, entry: NewStop) -> Result<StopId> {
        self.stops.add(entry)
    }

    pub fn remove_stop(&mut self, id: &StopId) -> Result<Stop> {
        self.stops.remove(id)
    }

    /// Returns whether the flag actually flipped.
    pub fn set_optimize(&mut self, optimize: bool) -> bool {
        let changed = self.optimize != optimize;
        self.optimize = optimize;
        changed
    }

    /// Mark the provider (map) ready or not. Becoming ready forces a re-plan.
    pub fn set_provider_ready(&mut self, ready: bool) {
        if ready && !self.provider_ready {
            debug!("routing provider became ready");
            self.planned_for = None;
        }
        self.provider_ready = ready;
    }

    pub fn provider_ready(&self) -> bool {
        self.provider_ready
    }

    pub fn needs_replan(&self) -> bool {
        self.provider_ready && self.planned_for != Some((self.stops.revision(), self.optimize))
    }

    /// Plan now, regardless of whether anything changed (the "Plan route"
    /// button). Skipped while the provider is not ready.
    pub async fn replan(&mut self) -> Option<&RouteResult> {
        if !self.provider_ready {
            debug!("routing provider not ready; skipping plan");
            return None;
        }
        let key = (self.stops.revision(), self.optimize);
        self.sequencer
            .plan_route(self.stops.stops(), self.stops.depot(), self.optimize)
            .await;
        self.planned_for = Some(key);
        self.sequencer.current()
    }

    /// Plan only if a trigger fired since the last plan.
    pub async fn sync(&mut self) -> Option<&RouteResult> {
        if !self.needs_replan() {
            return None;
        }
        self.replan().await
    }

    /// Stops in presentation order: the planned order when it was planned for
    /// the current list and optimize mode, input order otherwise.
    pub fn ordered_stops(&self) -> Vec<&Stop> {
        match self.sequencer.current() {
            Some(result) if self.planned_for == Some((self.stops.revision(), self.optimize)) => {
                result.ordered(self.stops.stops())
            }
            _ => self.stops.stops().iter().collect(),
        }
    }

    pub fn notice(&self) -> Option<&str> {
        self.sequencer.notice()
    }
}
