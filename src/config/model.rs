// src/config/model.rs

use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;

use crate::model::Depot;
use crate::types::Granularity;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [backend]
/// base_url = "http://localhost:8000"
///
/// [routing]
/// base_url = "https://router.project-osrm.org"
/// profile = "driving"
///
/// [depot]
/// name = "Operations Yard"
/// latitude = 47.6062
/// longitude = -122.3321
///
/// [sync]
/// debounce_ms = 100
///
/// [calendar]
/// default_view = "week"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    #[serde(default)]
    pub backend: BackendSection,

    #[serde(default)]
    pub routing: RoutingSection,

    #[serde(default)]
    pub depot: DepotSection,

    #[serde(default)]
    pub sync: SyncSection,

    #[serde(default)]
    pub calendar: CalendarSection,
}

/// `[backend]`: the operations record API.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendSection {
    #[serde(default = "default_backend_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for BackendSection {
    fn default() -> Self {
        Self {
            base_url: default_backend_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// `[routing]`: the OSRM-compatible routing/optimization provider.
#[derive(Debug, Clone, Deserialize)]
pub struct RoutingSection {
    #[serde(default = "default_routing_url")]
    pub base_url: String,

    /// Travel profile path segment (`driving`, `cycling`, ...).
    #[serde(default = "default_profile")]
    pub profile: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for RoutingSection {
    fn default() -> Self {
        Self {
            base_url: default_routing_url(),
            profile: default_profile(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

/// `[depot]`: where every route starts and ends.
#[derive(Debug, Clone, Deserialize)]
pub struct DepotSection {
    #[serde(default = "default_depot_name")]
    pub name: String,

    #[serde(default = "default_depot_latitude")]
    pub latitude: f64,

    #[serde(default = "default_depot_longitude")]
    pub longitude: f64,
}

impl Default for DepotSection {
    fn default() -> Self {
        Self {
            name: default_depot_name(),
            latitude: default_depot_latitude(),
            longitude: default_depot_longitude(),
        }
    }
}

/// `[sync]`: cross-view notification behaviour.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncSection {
    /// Debounce window for publishing and for coalescing reloads.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for SyncSection {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CalendarSection {
    #[serde(default)]
    pub default_view: Granularity,
}

fn default_backend_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_routing_url() -> String {
    "https://router.project-osrm.org".to_string()
}

fn default_profile() -> String {
    "driving".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_depot_name() -> String {
    Depot::default().name
}

fn default_depot_latitude() -> f64 {
    Depot::default().coordinate.latitude
}

fn default_depot_longitude() -> f64 {
    Depot::default().coordinate.longitude
}

fn default_debounce_ms() -> u64 {
    100
}

/// Validated configuration. Only constructible through
/// `ConfigFile::try_from(RawConfigFile)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub backend: BackendConfig,
    pub routing: RoutingConfig,
    pub depot: Depot,
    pub sync: SyncConfig,
    pub default_view: Granularity,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        backend: BackendConfig,
        routing: RoutingConfig,
        depot: Depot,
        sync: SyncConfig,
        default_view: Granularity,
    ) -> Self {
        Self {
            backend,
            routing,
            depot,
            sync,
            default_view,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Always ends with `/` so relative endpoint joins keep any path prefix.
    pub base_url: Url,
    pub timeout_ms: u64,
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone)]
pub struct RoutingConfig {
    pub base_url: Url,
    pub profile: String,
    pub timeout_ms: u64,
}

impl RoutingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SyncConfig {
    pub debounce_ms: u64,
}

impl SyncConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}
