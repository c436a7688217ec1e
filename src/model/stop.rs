// src/model/stop.rs

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{FieldschedError, Result};

/// A validated WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting non-finite or out-of-range values.
    ///
    /// Values are never clamped: `|lat| <= 90` and `|lon| <= 180` or error.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || latitude.abs() > 90.0 {
            return Err(FieldschedError::Validation(format!(
                "latitude must be within [-90, 90] (got {latitude})"
            )));
        }
        if !longitude.is_finite() || longitude.abs() > 180.0 {
            return Err(FieldschedError::Validation(format!(
                "longitude must be within [-180, 180] (got {longitude})"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn is_valid(&self) -> bool {
        Self::new(self.latitude, self.longitude).is_ok()
    }

    /// `lon,lat`, the order routing providers expect.
    pub fn lon_lat(&self) -> String {
        format!("{},{}", self.longitude, self.latitude)
    }
}

/// Route start/end point for a crew.
#[derive(Debug, Clone, PartialEq)]
pub struct Depot {
    pub name: String,
    pub coordinate: Coordinate,
}

impl Depot {
    pub fn new(name: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            name: name.into(),
            coordinate,
        }
    }
}

impl Default for Depot {
    fn default() -> Self {
        Self {
            name: "Operations Yard".to_string(),
            coordinate: Coordinate {
                latitude: 47.6062,
                longitude: -122.3321,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StopId(pub String);

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopStatus {
    #[default]
    Scheduled,
    InProgress,
    Blocked,
}

impl fmt::Display for StopStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopStatus::Scheduled => f.write_str("scheduled"),
            StopStatus::InProgress => f.write_str("in_progress"),
            StopStatus::Blocked => f.write_str("blocked"),
        }
    }
}

/// A geolocated stop on a crew's route for the day.
#[derive(Debug, Clone, PartialEq)]
pub struct Stop {
    pub id: StopId,
    pub name: String,
    pub address: String,
    pub coordinate: Coordinate,
    pub status: StopStatus,
}

/// Operator input for a new stop, before validation.
///
/// Also the on-disk shape of `[[stop]]` entries in a stops file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewStop {
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub status: StopStatus,
}
