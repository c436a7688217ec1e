// src/route/stops.rs

use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::errors::{FieldschedError, Result};
use crate::model::{Coordinate, Depot, NewStop, Stop, StopId};

/// First generated stop number (`stop-1001`, `stop-1002`, ...).
const FIRST_STOP_SEQ: u64 = 1001;

/// Depot plus the ordered stop list for one planning session.
#[derive(Debug, Clone)]
pub struct StopModel {
    depot: Depot,
    stops: Vec<Stop>,
    revision: u64,
    next_seq: u64,
}

impl StopModel {
    pub fn new(depot: Depot) -> Self {
        Self {
            depot,
            stops: Vec::new(),
            revision: 0,
            next_seq: FIRST_STOP_SEQ,
        }
    }

    /// Build a model keeping `entries` in the order given.
    pub fn from_entries(depot: Depot, entries: Vec<NewStop>) -> Result<Self> {
        let mut model = Self::new(depot);
        for entry in entries {
            let stop = model.validate(entry)?;
            model.stops.push(stop);
        }
        model.revision = u64::from(!model.stops.is_empty());
        Ok(model)
    }

    pub fn depot(&self) -> &Depot {
        &self.depot
    }

    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn get(&self, id: &StopId) -> Option<&Stop> {
        self.stops.iter().find(|s| &s.id == id)
    }

    /// Bumped on every accepted add/remove.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Validate and add a stop at the head of the list.
    pub fn add(&mut self, entry: NewStop) -> Result<StopId> {
        let stop = self.validate(entry)?;
        let id = stop.id.clone();
        debug!(%id, name = %stop.name, "stop added");
        self.stops.insert(0, stop);
        self.revision += 1;
        Ok(id)
    }

    pub fn remove(&mut self, id: &StopId) -> Result<Stop> {
        let Some(pos) = self.stops.iter().position(|s| &s.id == id) else {
            return Err(FieldschedError::UnknownStop(id.to_string()));
        };
        let stop = self.stops.remove(pos);
        debug!(%id, "stop removed");
        self.revision += 1;
        Ok(stop)
    }

    fn validate(&mut self, entry: NewStop) -> Result<Stop> {
        let name = entry.name.trim();
        let address = entry.address.trim();
        if name.is_empty() {
            return Err(FieldschedError::Validation("stop name is required".to_string()));
        }
        if address.is_empty() {
            return Err(FieldschedError::Validation(
                "stop address is required".to_string(),
            ));
        }
        let coordinate = Coordinate::new(entry.latitude, entry.longitude)?;

        let id = StopId(format!("stop-{}", self.next_seq));
        self.next_seq += 1;

        Ok(Stop {
            id,
            name: name.to_string(),
            address: address.to_string(),
            coordinate,
            status: entry.status,
        })
    }
}

/// On-disk list of stops:
///
/// ```toml
/// [[stop]]
/// name = "Pinecrest HOA"
/// address = "1023 Cedar Ave"
/// latitude = 47.6151
/// longitude = -122.3446
/// status = "scheduled"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StopsFile {
    #[serde(default)]
    pub stop: Vec<NewStop>,
}

pub fn load_stops_file(path: impl AsRef<Path>) -> Result<StopsFile> {
    let contents = fs::read_to_string(path.as_ref())?;
    Ok(toml::from_str(&contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StopStatus;

    fn entry(name: &str, lat: f64, lon: f64) -> NewStop {
        NewStop {
            name: name.to_string(),
            address: "1 Main St".to_string(),
            latitude: lat,
            longitude: lon,
            status: StopStatus::Scheduled,
        }
    }

    #[test]
    fn add_prepends_and_bumps_revision() {
        let mut model = StopModel::new(Depot::default());
        let a = model.add(entry("A", 47.61, -122.34)).unwrap();
        let b = model.add(entry("B", 47.60, -122.33)).unwrap();

        assert_eq!(model.stops()[0].id, b);
        assert_eq!(model.stops()[1].id, a);
        assert_eq!(model.get(&a).map(|s| s.name.as_str()), Some("A"));
        assert_eq!(model.revision(), 2);
        assert_eq!(a.0, "stop-1001");
    }

    #[test]
    fn invalid_coordinates_are_rejected_not_clamped() {
        let mut model = StopModel::new(Depot::default());
        let err = model.add(entry("A", 91.0, 0.0)).unwrap_err();
        assert!(matches!(err, FieldschedError::Validation(_)));
        assert!(model.is_empty());
        assert_eq!(model.revision(), 0);
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut model = StopModel::new(Depot::default());
        assert!(model.add(entry("   ", 1.0, 1.0)).is_err());
    }

    #[test]
    fn remove_unknown_stop_errors() {
        let mut model = StopModel::new(Depot::default());
        let id = model.add(entry("A", 1.0, 1.0)).unwrap();
        assert!(matches!(
            model.remove(&StopId("stop-9".to_string())),
            Err(FieldschedError::UnknownStop(_))
        ));
        assert_eq!(model.remove(&id).unwrap().name, "A");
        assert!(model.get(&id).is_none());
        assert_eq!(model.revision(), 2);
    }

    #[test]
    fn from_entries_keeps_file_order() {
        let model = StopModel::from_entries(
            Depot::default(),
            vec![entry("A", 1.0, 1.0), entry("B", 2.0, 2.0)],
        )
        .unwrap();
        let names: Vec<_> = model.stops().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }
}
