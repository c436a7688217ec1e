// src/pool/store.rs

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, warn};

use crate::backend::{JobBackend, JobQuery};
use crate::calendar::day_key;
use crate::model::{Crew, CrewId, Job, JobId, JobStatus};

/// Where a job currently sits in the loaded pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolLocation {
    Unscheduled,
    Day(NaiveDate),
}

/// Holds the unscheduled and windowed job sets for one view.
///
/// Every `load_*` call replaces its set wholesale with what the backend
/// returned. Failures degrade to an empty set; nothing is surfaced upward.
pub struct JobPoolStore {
    backend: Arc<dyn JobBackend>,
    crew_filter: Option<CrewId>,
    unscheduled: Vec<Job>,
    windowed: Vec<Job>,
    buckets: BTreeMap<NaiveDate, Vec<Job>>,
    crews: Vec<Crew>,
}

impl std::fmt::Debug for JobPoolStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobPoolStore")
            .field("crew_filter", &self.crew_filter)
            .field("unscheduled", &self.unscheduled.len())
            .field("windowed", &self.windowed.len())
            .field("buckets", &self.buckets.len())
            .finish_non_exhaustive()
    }
}

impl JobPoolStore {
    pub fn new(backend: Arc<dyn JobBackend>) -> Self {
        Self {
            backend,
            crew_filter: None,
            unscheduled: Vec::new(),
            windowed: Vec::new(),
            buckets: BTreeMap::new(),
            crews: Vec::new(),
        }
    }

    /// Restrict windowed loads to one crew (`None` shows every crew).
    pub fn set_crew_filter(&mut self, crew: Option<CrewId>) {
        self.crew_filter = crew;
    }

    pub fn crew_filter(&self) -> Option<CrewId> {
        self.crew_filter
    }

    /// Reload the unscheduled pool.
    ///
    /// Fetches `scheduled` and `in_progress` jobs (one query per status) and
    /// keeps those without a start.
    pub async fn load_open(&mut self) {
        let mut merged: Vec<Job> = Vec::new();
        let mut seen: HashSet<JobId> = HashSet::new();

        for status in JobStatus::OPEN {
            let query = JobQuery::with_status(status);
            match self.backend.list_jobs(&query).await {
                Ok(jobs) => {
                    for job in jobs {
                        if seen.insert(job.id) {
                            merged.push(job);
                        }
                    }
                }
                Err(err) => {
                    warn!(%status, error = %err, "failed to load open jobs; showing none");
                    self.unscheduled.clear();
                    return;
                }
            }
        }

        merged.retain(Job::is_unscheduled);
        debug!(count = merged.len(), "loaded unscheduled pool");
        self.unscheduled = merged;
    }

    /// Reload the windowed pool for `[range_start 00:00, range_end 23:59:59]`.
    pub async fn load_windowed(&mut self, range_start: NaiveDate, range_end: NaiveDate) {
        let start = range_start.and_time(NaiveTime::MIN);
        let end = end_of_day(range_end);
        let query = JobQuery::scheduled_between(start, end).for_crew(self.crew_filter);

        match self.backend.list_jobs(&query).await {
            Ok(jobs) => {
                debug!(
                    count = jobs.len(),
                    start = %day_key(range_start),
                    end = %day_key(range_end),
                    "loaded windowed pool"
                );
                self.buckets = group_by_day(&jobs);
                self.windowed = jobs;
            }
            Err(err) => {
                warn!(error = %err, "failed to load scheduled jobs; showing none");
                self.windowed.clear();
                self.buckets.clear();
            }
        }
    }

    /// Reload the crew directory. Failure leaves it empty.
    pub async fn load_crews(&mut self) {
        match self.backend.list_crews().await {
            Ok(crews) => self.crews = crews,
            Err(err) => {
                warn!(error = %err, "failed to load crews");
                self.crews.clear();
            }
        }
    }

    pub fn unscheduled(&self) -> &[Job] {
        &self.unscheduled
    }

    pub fn windowed(&self) -> &[Job] {
        &self.windowed
    }

    pub fn buckets(&self) -> &BTreeMap<NaiveDate, Vec<Job>> {
        &self.buckets
    }

    /// Jobs on `day`; empty when the day has none or is outside the window.
    pub fn bucket(&self, day: NaiveDate) -> &[Job] {
        self.buckets.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Same as [`bucket`](Self::bucket) but addressed by `YYYY-MM-DD` key.
    pub fn bucket_for_key(&self, key: &str) -> &[Job] {
        match NaiveDate::parse_from_str(key, "%Y-%m-%d") {
            Ok(day) => self.bucket(day),
            Err(_) => &[],
        }
    }

    /// Where `id` sits in the loaded pools, if anywhere.
    pub fn locate(&self, id: JobId) -> Option<PoolLocation> {
        if self.unscheduled.iter().any(|j| j.id == id) {
            return Some(PoolLocation::Unscheduled);
        }
        self.buckets
            .iter()
            .find(|(_, jobs)| jobs.iter().any(|j| j.id == id))
            .map(|(day, _)| PoolLocation::Day(*day))
    }

    pub fn find(&self, id: JobId) -> Option<&Job> {
        self.unscheduled
            .iter()
            .chain(self.windowed.iter())
            .find(|j| j.id == id)
    }

    pub fn crews(&self) -> &[Crew] {
        &self.crews
    }

    /// Crews grouped by their type tag, names sorted within each group.
    pub fn crews_by_type(&self) -> BTreeMap<String, Vec<Crew>> {
        let mut groups: BTreeMap<String, Vec<Crew>> = BTreeMap::new();
        for crew in &self.crews {
            groups
                .entry(crew.crew_type.clone())
                .or_default()
                .push(crew.clone());
        }
        for crews in groups.values_mut() {
            crews.sort_by(|a, b| a.name.cmp(&b.name));
        }
        groups
    }

    /// Display name for a job's crew: the directory name when known,
    /// `Crew #<id>` otherwise, `Crew #TBD` when unassigned.
    pub fn crew_name(&self, job: &Job) -> String {
        job.crew_id
            .and_then(|id| self.crews.iter().find(|c| c.id == id))
            .map(|c| c.name.clone())
            .unwrap_or_else(|| job.crew_label())
    }
}

/// Group jobs by local calendar day of `scheduled_start`.
///
/// Jobs with a missing or unparsable start land in no bucket.
pub fn group_by_day(jobs: &[Job]) -> BTreeMap<NaiveDate, Vec<Job>> {
    let mut buckets: BTreeMap<NaiveDate, Vec<Job>> = BTreeMap::new();
    for job in jobs {
        match job.scheduled_day() {
            Some(day) => buckets.entry(day).or_default().push(job.clone()),
            None => {
                debug!(job = %job.id, raw = ?job.scheduled_start, "job has no usable start; not bucketed");
            }
        }
    }
    buckets
}

fn end_of_day(day: NaiveDate) -> chrono::NaiveDateTime {
    day.and_hms_opt(23, 59, 59)
        .unwrap_or_else(|| day.and_time(NaiveTime::MIN))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(id: u64, start: Option<&str>) -> Job {
        Job {
            id: JobId(id),
            customer_id: 1,
            crew_id: None,
            scheduled_start: start.map(str::to_string),
            scheduled_end: None,
            status: JobStatus::Scheduled,
            service_address: None,
            latitude: None,
            longitude: None,
        }
    }

    #[test]
    fn grouping_skips_bad_dates_and_keys_by_local_day() {
        let jobs = vec![
            job(1, Some("2026-10-14T00:00:00")),
            job(2, Some("2026-10-14T17:45:00")),
            job(3, Some("2026-10-15T08:00:00")),
            job(4, Some("not a date")),
            job(5, None),
        ];
        let buckets = group_by_day(&jobs);
        let oct14 = NaiveDate::from_ymd_opt(2026, 10, 14).unwrap();
        let oct15 = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();

        assert_eq!(buckets.len(), 2);
        let ids: Vec<_> = buckets[&oct14].iter().map(|j| j.id.0).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(buckets[&oct15].len(), 1);
    }
}
