#![allow(dead_code)]

use chrono::NaiveDate;
use serde_json::json;

use fieldsched::config::{ConfigFile, RawConfigFile};
use fieldsched::model::{Crew, CrewId, Job, JobId, JobStatus, NewStop, StopStatus};
use fieldsched::route::ProviderResponse;

pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

/// Builder for `Job` records as the backend would return them.
pub struct JobBuilder {
    job: Job,
}

impl JobBuilder {
    pub fn new(id: u64) -> Self {
        Self {
            job: Job {
                id: JobId(id),
                customer_id: 1,
                crew_id: None,
                scheduled_start: None,
                scheduled_end: None,
                status: JobStatus::Scheduled,
                service_address: None,
                latitude: None,
                longitude: None,
            },
        }
    }

    pub fn start(mut self, raw: &str) -> Self {
        self.job.scheduled_start = Some(raw.to_string());
        self
    }

    pub fn end(mut self, raw: &str) -> Self {
        self.job.scheduled_end = Some(raw.to_string());
        self
    }

    pub fn status(mut self, status: JobStatus) -> Self {
        self.job.status = status;
        self
    }

    pub fn crew(mut self, id: u64) -> Self {
        self.job.crew_id = Some(CrewId(id));
        self
    }

    pub fn address(mut self, address: &str) -> Self {
        self.job.service_address = Some(address.to_string());
        self
    }

    pub fn build(self) -> Job {
        self.job
    }
}

pub fn crew(id: u64, name: &str, crew_type: &str) -> Crew {
    Crew {
        id: CrewId(id),
        name: name.to_string(),
        crew_type: crew_type.to_string(),
        color: None,
    }
}

pub fn new_stop(name: &str, latitude: f64, longitude: f64) -> NewStop {
    NewStop {
        name: name.to_string(),
        address: format!("{name} address"),
        latitude,
        longitude,
        status: StopStatus::Scheduled,
    }
}

/// Optimized (`trip`) answer with the given raw waypoint order.
pub fn trip_response(meters: f64, seconds: f64, waypoint_order: &[i64]) -> ProviderResponse {
    serde_json::from_value(json!({
        "code": "Ok",
        "trips": [{
            "distance": meters,
            "duration": seconds,
            "geometry": {"coordinates": [[-122.3321, 47.6062], [-122.34, 47.61], [-122.3321, 47.6062]]},
            "waypoint_order": waypoint_order,
        }],
    }))
    .expect("valid trip response")
}

/// Direct (`route`) answer with one `(meters, seconds)` entry per leg.
pub fn route_response(legs: &[(f64, f64)]) -> ProviderResponse {
    let legs: Vec<_> = legs
        .iter()
        .map(|(d, t)| json!({"distance": d, "duration": t}))
        .collect();
    serde_json::from_value(json!({
        "code": "Ok",
        "routes": [{
            "distance": 0.0,
            "duration": 0.0,
            "geometry": {"coordinates": [[-122.3321, 47.6062], [-122.34, 47.61], [-122.33, 47.60], [-122.3321, 47.6062]]},
            "legs": legs,
        }],
    }))
    .expect("valid route response")
}

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn backend_url(mut self, url: &str) -> Self {
        self.config.backend.base_url = url.to_string();
        self
    }

    pub fn depot(mut self, name: &str, latitude: f64, longitude: f64) -> Self {
        self.config.depot.name = name.to_string();
        self.config.depot.latitude = latitude;
        self.config.depot.longitude = longitude;
        self
    }

    pub fn debounce_ms(mut self, ms: u64) -> Self {
        self.config.sync.debounce_ms = ms;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
