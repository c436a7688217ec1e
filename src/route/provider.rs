// src/route/provider.rs

//! Routing/optimization provider abstraction.
//!
//! The sequencer talks to a `RoutingProvider` instead of an HTTP client so
//! tests can script answers, failures and latencies. [`OsrmProvider`] is the
//! production implementation for OSRM-compatible `trip` / `route` services.

use std::future::Future;
use std::pin::Pin;

use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

use crate::backend::http::ensure_success;
use crate::config::RoutingConfig;
use crate::errors::{FieldschedError, Result};
use crate::model::Coordinate;

pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteMode {
    /// Round trip optimization; first waypoint is source, last destination.
    Optimized,
    /// Direct route through the waypoints in the given order.
    Direct,
}

/// One provider call: the full `[depot, stops.., depot]` chain plus mode.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub waypoints: Vec<Coordinate>,
    pub mode: RouteMode,
}

impl RouteRequest {
    /// Semicolon separated `lon,lat` list.
    pub fn waypoint_list(&self) -> String {
        self.waypoints
            .iter()
            .map(Coordinate::lon_lat)
            .collect::<Vec<_>>()
            .join(";")
    }

    pub fn service(&self) -> &'static str {
        match self.mode {
            RouteMode::Optimized => "trip",
            RouteMode::Direct => "route",
        }
    }

    pub fn query(&self) -> Vec<(&'static str, &'static str)> {
        let mut params = Vec::new();
        if self.mode == RouteMode::Optimized {
            params.push(("roundtrip", "true"));
            params.push(("source", "first"));
            params.push(("destination", "last"));
        }
        params.push(("overview", "full"));
        params.push(("geometries", "geojson"));
        params
    }
}

/// Raw provider answer. Either `trips` (optimized) or `routes` (direct) is
/// populated.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProviderResponse {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub trips: Vec<ProviderRoute>,
    #[serde(default)]
    pub routes: Vec<ProviderRoute>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProviderRoute {
    /// Meters.
    pub distance: f64,
    /// Seconds.
    pub duration: f64,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub legs: Vec<Leg>,
    /// Visiting permutation over the provider's own waypoint list
    /// (depot included at both ends). Optimized answers only.
    #[serde(default)]
    pub waypoint_order: Option<Vec<i64>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Geometry {
    /// `[lon, lat]` pairs.
    #[serde(default)]
    pub coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Leg {
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub duration: f64,
}

impl ProviderResponse {
    /// Pick the first trip/route for `mode`, rejecting error codes and
    /// answers without a geometry.
    pub fn into_route(self, mode: RouteMode) -> Result<ProviderRoute> {
        if let Some(code) = self.code.as_deref() {
            if code != "Ok" {
                return Err(FieldschedError::Provider(format!(
                    "provider answered {code}: {}",
                    self.message.unwrap_or_default()
                )));
            }
        }

        let candidates = match mode {
            RouteMode::Optimized => self.trips,
            RouteMode::Direct => self.routes,
        };
        let route = candidates
            .into_iter()
            .next()
            .ok_or_else(|| FieldschedError::Provider("provider returned no route".to_string()))?;

        match &route.geometry {
            Some(g) if !g.coordinates.is_empty() => Ok(route),
            _ => Err(FieldschedError::Provider(
                "provider route has no geometry".to_string(),
            )),
        }
    }
}

impl ProviderRoute {
    /// Geometry as `Coordinate`s (provider order is lon/lat).
    pub fn line(&self) -> Vec<Coordinate> {
        self.geometry
            .as_ref()
            .map(|g| {
                g.coordinates
                    .iter()
                    .map(|[lon, lat]| Coordinate {
                        latitude: *lat,
                        longitude: *lon,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Trait abstracting the routing/optimization service.
pub trait RoutingProvider: Send + Sync {
    fn fetch<'a>(&'a self, request: &'a RouteRequest) -> ProviderFuture<'a, ProviderResponse>;
}

/// OSRM-compatible HTTP provider.
#[derive(Debug, Clone)]
pub struct OsrmProvider {
    base_url: Url,
    profile: String,
    client: Client,
}

impl OsrmProvider {
    pub fn new(config: &RoutingConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            base_url: config.base_url.clone(),
            profile: config.profile.clone(),
            client,
        })
    }

    pub fn url_for(&self, request: &RouteRequest) -> Result<Url> {
        let path = format!(
            "{}/v1/{}/{}",
            request.service(),
            self.profile,
            request.waypoint_list()
        );
        self.base_url
            .join(&path)
            .map_err(|e| FieldschedError::Provider(format!("cannot build provider URL: {e}")))
    }
}

impl RoutingProvider for OsrmProvider {
    fn fetch<'a>(&'a self, request: &'a RouteRequest) -> ProviderFuture<'a, ProviderResponse> {
        Box::pin(async move {
            let url = self.url_for(request)?;
            debug!(%url, waypoints = request.waypoints.len(), "requesting route");

            let res = self.client.get(url).query(&request.query()).send().await?;
            let res = ensure_success("routing provider", res).await?;
            Ok(res.json::<ProviderResponse>().await?)
        })
    }
}
