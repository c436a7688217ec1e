// src/route/sequencer.rs

//! Route sequencing: issue a provider request, turn its answer into a
//! `RouteResult`, and never let an outdated answer overwrite a newer one.
//!
//! Planning is split in three so the stale-response guard is explicit:
//!
//! - [`RouteSequencer::issue`] snapshots the stops into a [`RouteTicket`]
//!   carrying a fresh, monotonically increasing token.
//! - [`RouteSequencer::fetch`] performs the provider call for a ticket.
//! - [`RouteSequencer::apply`] accepts the outcome only if the ticket is the
//!   latest issued; otherwise the outcome is discarded.
//!
//! [`RouteSequencer::plan_route`] runs all three back to back.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::model::{Coordinate, Depot, Stop};
use crate::route::normalize::{is_permutation, normalize_waypoint_order};
use crate::route::provider::{ProviderResponse, ProviderRoute, RouteMode, RouteRequest, RoutingProvider};

/// Notice shown when the provider could not produce a route.
pub const UNAVAILABLE_NOTICE: &str = "Route unavailable for current stops.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteStatus {
    Ok,
    /// Provider failed; order is the input order and there is no route line.
    Unavailable,
    /// Provider answered but its order could not be trusted; input order used.
    UnknownOrder,
}

impl fmt::Display for RouteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteStatus::Ok => f.write_str("ok"),
            RouteStatus::Unavailable => f.write_str("unavailable"),
            RouteStatus::UnknownOrder => f.write_str("unknown-order"),
        }
    }
}

/// Totals in presentation units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteMetrics {
    pub distance_km: f64,
    pub duration_min: f64,
}

impl RouteMetrics {
    fn from_provider_units(meters: f64, seconds: f64) -> Self {
        Self {
            distance_km: meters / 1000.0,
            duration_min: seconds / 60.0,
        }
    }

    /// Optimized answers report trip totals; direct answers are summed over
    /// their legs (route totals when no legs are reported).
    fn of(route: &ProviderRoute, mode: RouteMode) -> Self {
        match mode {
            RouteMode::Optimized => Self::from_provider_units(route.distance, route.duration),
            RouteMode::Direct if route.legs.is_empty() => {
                Self::from_provider_units(route.distance, route.duration)
            }
            RouteMode::Direct => {
                let meters = route.legs.iter().map(|l| l.distance).sum();
                let seconds = route.legs.iter().map(|l| l.duration).sum();
                Self::from_provider_units(meters, seconds)
            }
        }
    }

    /// `12.3 km`
    pub fn distance_label(&self) -> String {
        format!("{:.1} km", self.distance_km)
    }

    /// `27 mins`
    pub fn duration_label(&self) -> String {
        format!("{} mins", self.duration_min.round() as i64)
    }
}

/// Outcome of planning one stop set.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteResult {
    /// Visiting order as indices into the stop list the ticket was issued for.
    pub order: Vec<usize>,
    pub metrics: Option<RouteMetrics>,
    /// Route line to draw; empty when there is none.
    pub geometry: Vec<Coordinate>,
    pub status: RouteStatus,
}

impl RouteResult {
    fn input_order(stop_count: usize, status: RouteStatus) -> Self {
        Self {
            order: (0..stop_count).collect(),
            metrics: None,
            geometry: Vec::new(),
            status,
        }
    }

    /// `stops` in visiting order. Falls back to input order when this result
    /// does not fit `stops` (e.g. the list changed since planning).
    pub fn ordered<'a>(&self, stops: &'a [Stop]) -> Vec<&'a Stop> {
        if is_permutation(&self.order, stops.len()) {
            self.order.iter().map(|&i| &stops[i]).collect()
        } else {
            stops.iter().collect()
        }
    }
}

/// Snapshot of one planning request.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteTicket {
    token: u64,
    stop_count: usize,
    /// Stop indices that made it into the waypoint chain, in chain order.
    routed: Vec<usize>,
    request: Option<RouteRequest>,
}

impl RouteTicket {
    pub fn token(&self) -> u64 {
        self.token
    }

    /// `None` when there was nothing to route.
    pub fn request(&self) -> Option<&RouteRequest> {
        self.request.as_ref()
    }

    pub fn mode(&self) -> Option<RouteMode> {
        self.request.as_ref().map(|r| r.mode)
    }
}

pub struct RouteSequencer {
    provider: Arc<dyn RoutingProvider>,
    latest_token: u64,
    current: Option<RouteResult>,
    notice: Option<String>,
    fallbacks: u64,
}

impl fmt::Debug for RouteSequencer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteSequencer")
            .field("latest_token", &self.latest_token)
            .field("current", &self.current)
            .field("notice", &self.notice)
            .field("fallbacks", &self.fallbacks)
            .finish_non_exhaustive()
    }
}

impl RouteSequencer {
    pub fn new(provider: Arc<dyn RoutingProvider>) -> Self {
        Self {
            provider,
            latest_token: 0,
            current: None,
            notice: None,
            fallbacks: 0,
        }
    }

    /// Most recently applied result.
    pub fn current(&self) -> Option<&RouteResult> {
        self.current.as_ref()
    }

    /// Route line currently on display.
    pub fn route_line(&self) -> &[Coordinate] {
        self.current
            .as_ref()
            .map(|r| r.geometry.as_slice())
            .unwrap_or(&[])
    }

    /// Non-blocking user notice, set while the last plan was unavailable.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    /// How many provider orders were discarded as untrustworthy.
    pub fn fallback_count(&self) -> u64 {
        self.fallbacks
    }

    pub fn latest_token(&self) -> u64 {
        self.latest_token
    }

    /// Snapshot `stops` into a new ticket, superseding every earlier one.
    pub fn issue(&mut self, stops: &[Stop], depot: &Depot, optimize: bool) -> RouteTicket {
        self.latest_token += 1;
        let token = self.latest_token;

        let routed: Vec<usize> = stops
            .iter()
            .enumerate()
            .filter(|(idx, stop)| {
                let ok = stop.coordinate.is_valid();
                if !ok {
                    warn!(stop = %stop.id, idx, "stop has invalid coordinates; not routed");
                }
                ok
            })
            .map(|(idx, _)| idx)
            .collect();

        let request = if routed.is_empty() {
            None
        } else {
            let mut waypoints = Vec::with_capacity(routed.len() + 2);
            waypoints.push(depot.coordinate);
            waypoints.extend(routed.iter().map(|&i| stops[i].coordinate));
            waypoints.push(depot.coordinate);

            let mode = if optimize && routed.len() > 1 {
                RouteMode::Optimized
            } else {
                RouteMode::Direct
            };
            Some(RouteRequest { waypoints, mode })
        };

        debug!(token, stops = stops.len(), mode = ?request.as_ref().map(|r| r.mode), "route ticket issued");
        RouteTicket {
            token,
            stop_count: stops.len(),
            routed,
            request,
        }
    }

    /// Call the provider for `ticket`. `None` when there is nothing to route.
    pub async fn fetch(&self, ticket: &RouteTicket) -> Option<Result<ProviderResponse>> {
        match &ticket.request {
            Some(request) => Some(self.provider.fetch(request).await),
            None => None,
        }
    }

    /// Apply the outcome for `ticket` if it is still the latest.
    ///
    /// Returns the applied result, or `None` when the ticket was superseded
    /// and its outcome discarded.
    pub fn apply(
        &mut self,
        ticket: &RouteTicket,
        outcome: Option<Result<ProviderResponse>>,
    ) -> Option<&RouteResult> {
        if ticket.token != self.latest_token {
            debug!(
                token = ticket.token,
                latest = self.latest_token,
                "discarding response for superseded route request"
            );
            return None;
        }

        let result = match (ticket.mode(), outcome) {
            (None, _) | (_, None) => {
                self.notice = None;
                RouteResult::input_order(ticket.stop_count, RouteStatus::Ok)
            }
            (Some(mode), Some(Ok(response))) => match response.into_route(mode) {
                Ok(route) => {
                    self.notice = None;
                    self.sequence(ticket, &route, mode)
                }
                Err(err) => self.unavailable(ticket, &err.to_string()),
            },
            (Some(_), Some(Err(err))) => self.unavailable(ticket, &err.to_string()),
        };

        info!(
            token = ticket.token,
            status = %result.status,
            order = ?result.order,
            "route applied"
        );
        self.current = Some(result);
        self.current.as_ref()
    }

    /// Issue, fetch and apply in one go.
    pub async fn plan_route(&mut self, stops: &[Stop], depot: &Depot, optimize: bool) -> RouteResult {
        let ticket = self.issue(stops, depot, optimize);
        let outcome = self.fetch(&ticket).await;
        match self.apply(&ticket, outcome) {
            Some(result) => result.clone(),
            // Only reachable if another ticket was issued meanwhile, which
            // `&mut self` rules out.
            None => RouteResult::input_order(stops.len(), RouteStatus::Unavailable),
        }
    }

    fn unavailable(&mut self, ticket: &RouteTicket, reason: &str) -> RouteResult {
        warn!(token = ticket.token, reason, "route unavailable");
        self.notice = Some(UNAVAILABLE_NOTICE.to_string());
        RouteResult::input_order(ticket.stop_count, RouteStatus::Unavailable)
    }

    fn sequence(&mut self, ticket: &RouteTicket, route: &ProviderRoute, mode: RouteMode) -> RouteResult {
        let metrics = Some(RouteMetrics::of(route, mode));
        let geometry = route.line();

        let routed_order: Option<Vec<usize>> = match mode {
            RouteMode::Direct => Some((0..ticket.routed.len()).collect()),
            RouteMode::Optimized => {
                let raw = route.waypoint_order.as_deref().unwrap_or(&[]);
                let normalized = normalize_waypoint_order(raw, ticket.routed.len());
                if is_permutation(&normalized, ticket.routed.len()) {
                    Some(normalized)
                } else {
                    self.fallbacks += 1;
                    warn!(
                        token = ticket.token,
                        ?raw,
                        ?normalized,
                        stops = ticket.routed.len(),
                        fallbacks = self.fallbacks,
                        "provider waypoint order does not match stops; using input order"
                    );
                    None
                }
            }
        };

        match routed_order {
            Some(order) => {
                // Map chain positions back to stop indices, then append any
                // stops that were left out of the chain.
                let mut full: Vec<usize> = order.iter().map(|&i| ticket.routed[i]).collect();
                full.extend((0..ticket.stop_count).filter(|i| !ticket.routed.contains(i)));
                RouteResult {
                    order: full,
                    metrics,
                    geometry,
                    status: RouteStatus::Ok,
                }
            }
            None => RouteResult {
                metrics,
                geometry,
                ..RouteResult::input_order(ticket.stop_count, RouteStatus::UnknownOrder)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_labels() {
        let m = RouteMetrics::from_provider_units(12_345.0, 1_620.0);
        assert_eq!(m.distance_label(), "12.3 km");
        assert_eq!(m.duration_label(), "27 mins");
    }

    #[test]
    fn direct_metrics_sum_legs() {
        let raw = r#"{"distance": 999.0, "duration": 999.0,
            "geometry": {"coordinates": [[0.0, 0.0]]},
            "legs": [{"distance": 1500.0, "duration": 120.0},
                     {"distance": 500.0, "duration": 60.0}]}"#;
        let route: ProviderRoute = serde_json::from_str(raw).unwrap();
        let m = RouteMetrics::of(&route, RouteMode::Direct);
        assert_eq!(m.distance_km, 2.0);
        assert_eq!(m.duration_min, 3.0);

        let m = RouteMetrics::of(&route, RouteMode::Optimized);
        assert_eq!(m.distance_km, 0.999);
    }
}
