// src/backend/mod.rs

//! Pluggable record-API backend abstraction.
//!
//! The scheduler never talks HTTP directly; it talks to a [`JobBackend`].
//! Production code uses [`HttpBackend`] against the operations API; tests
//! provide an in-memory implementation that records calls and can be told
//! to fail.

use std::future::Future;
use std::pin::Pin;

use chrono::NaiveDateTime;

use crate::errors::Result;
use crate::model::{Crew, CrewId, Job, JobId, JobStatus, SchedulePatch};
use crate::model::job::WIRE_TIMESTAMP_FORMAT;

pub mod http;

pub use http::HttpBackend;

/// Boxed future returned by backend calls.
pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Filter for a job listing. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobQuery {
    pub status: Option<JobStatus>,
    /// Inclusive lower bound on `scheduled_start`.
    pub start: Option<NaiveDateTime>,
    /// Inclusive upper bound on `scheduled_start`.
    pub end: Option<NaiveDateTime>,
    pub crew_id: Option<CrewId>,
}

impl JobQuery {
    pub fn with_status(status: JobStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn scheduled_between(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            ..Self::default()
        }
    }

    pub fn for_crew(mut self, crew_id: Option<CrewId>) -> Self {
        self.crew_id = crew_id;
        self
    }

    /// Query-string pairs, timestamps in the naive local wire format.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(status) = self.status {
            params.push(("status", status.as_str().to_string()));
        }
        if let Some(start) = self.start {
            params.push(("start", start.format(WIRE_TIMESTAMP_FORMAT).to_string()));
        }
        if let Some(end) = self.end {
            params.push(("end", end.format(WIRE_TIMESTAMP_FORMAT).to_string()));
        }
        if let Some(crew) = self.crew_id {
            params.push(("crew_id", crew.to_string()));
        }
        params
    }

    /// Whether `job` satisfies this filter (used by in-process backends).
    pub fn matches(&self, job: &Job) -> bool {
        if let Some(status) = self.status {
            if job.status != status {
                return false;
            }
        }
        if let Some(crew) = self.crew_id {
            if job.crew_id != Some(crew) {
                return false;
            }
        }
        if self.start.is_some() || self.end.is_some() {
            let Some(ts) = job.scheduled_start_at() else {
                return false;
            };
            if self.start.is_some_and(|start| ts < start) {
                return false;
            }
            if self.end.is_some_and(|end| ts > end) {
                return false;
            }
        }
        true
    }
}

/// Read/update surface of the record API that the scheduler needs.
pub trait JobBackend: Send + Sync {
    fn list_jobs<'a>(&'a self, query: &'a JobQuery) -> BackendFuture<'a, Vec<Job>>;

    /// Partial update of a job's schedule fields; returns the stored record.
    fn update_schedule<'a>(&'a self, id: JobId, patch: SchedulePatch) -> BackendFuture<'a, Job>;

    fn list_crews(&self) -> BackendFuture<'_, Vec<Crew>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    fn job(start: Option<&str>) -> Job {
        Job {
            id: JobId(1),
            customer_id: 1,
            crew_id: Some(CrewId(2)),
            scheduled_start: start.map(str::to_string),
            scheduled_end: None,
            status: JobStatus::Scheduled,
            service_address: None,
            latitude: None,
            longitude: None,
        }
    }

    #[test]
    fn params_use_naive_wire_format() {
        let q = JobQuery::scheduled_between(at(2026, 10, 12, 0, 0, 0), at(2026, 10, 18, 23, 59, 59))
            .for_crew(Some(CrewId(4)));
        assert_eq!(
            q.to_params(),
            vec![
                ("start", "2026-10-12T00:00:00".to_string()),
                ("end", "2026-10-18T23:59:59".to_string()),
                ("crew_id", "4".to_string()),
            ]
        );
    }

    #[test]
    fn range_match_is_inclusive_at_end_of_day() {
        let q = JobQuery::scheduled_between(at(2026, 10, 12, 0, 0, 0), at(2026, 10, 18, 23, 59, 59));
        assert!(q.matches(&job(Some("2026-10-18T23:00:00"))));
        assert!(q.matches(&job(Some("2026-10-12T00:00:00"))));
        assert!(!q.matches(&job(Some("2026-10-19T00:00:00"))));
        assert!(!q.matches(&job(None)));
    }

    #[test]
    fn crew_and_status_filters() {
        assert!(JobQuery::with_status(JobStatus::Scheduled).matches(&job(None)));
        assert!(!JobQuery::with_status(JobStatus::InProgress).matches(&job(None)));
        assert!(!JobQuery::default().for_crew(Some(CrewId(9))).matches(&job(None)));
    }
}
