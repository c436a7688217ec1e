// src/model/job.rs

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Wire format for scheduling timestamps: naive local time, no offset.
pub const WIRE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Backend identity of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub u64);

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for JobId {
    type Err = String;

    /// Parse a drag payload. Accepts `7` and `#7`; zero is not a valid id.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        match digits.parse::<u64>() {
            Ok(0) => Err("job id must be positive".to_string()),
            Ok(id) => Ok(JobId(id)),
            Err(_) => Err(format!("invalid job id: {trimmed:?}")),
        }
    }
}

/// Backend identity of a crew.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CrewId(pub u64);

impl fmt::Display for CrewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of a job as stored by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Scheduled,
    InProgress,
    Completed,
    Canceled,
    /// Anything the backend grows later; such jobs still group by date.
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    /// Statuses that make a job "open", i.e. eligible for the unscheduled pool.
    pub const OPEN: [JobStatus; 2] = [JobStatus::Scheduled, JobStatus::InProgress];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Scheduled => "scheduled",
            JobStatus::InProgress => "in_progress",
            JobStatus::Completed => "completed",
            JobStatus::Canceled => "canceled",
            JobStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A job record as returned by the backend.
///
/// Only the fields the scheduler reads are named; everything else the backend
/// sends (`notes`, `total`, `tasks`, ...) is ignored on decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub customer_id: u64,
    #[serde(default)]
    pub crew_id: Option<CrewId>,
    /// Raw wire value. Kept unparsed so a malformed value never fails the
    /// whole response; see [`Job::scheduled_start_at`].
    #[serde(default)]
    pub scheduled_start: Option<String>,
    #[serde(default)]
    pub scheduled_end: Option<String>,
    pub status: JobStatus,
    #[serde(default)]
    pub service_address: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl Job {
    pub fn scheduled_start_at(&self) -> Option<NaiveDateTime> {
        self.scheduled_start.as_deref().and_then(parse_local_timestamp)
    }

    /// Local calendar day this job is scheduled on, if it has a usable start.
    pub fn scheduled_day(&self) -> Option<NaiveDate> {
        self.scheduled_start_at().map(|ts| ts.date())
    }

    /// True when the backend has no start recorded at all.
    ///
    /// A present-but-unparsable start is *not* unscheduled: such a job is
    /// excluded from every pool rather than shown as open work.
    pub fn is_unscheduled(&self) -> bool {
        match self.scheduled_start.as_deref() {
            None => true,
            Some(raw) => raw.trim().is_empty(),
        }
    }

    pub fn is_open(&self) -> bool {
        JobStatus::OPEN.contains(&self.status)
    }

    pub fn crew_label(&self) -> String {
        match self.crew_id {
            Some(id) => format!("Crew #{id}"),
            None => "Crew #TBD".to_string(),
        }
    }
}

/// A crew record, used for grouping and labels only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crew {
    pub id: CrewId,
    pub name: String,
    #[serde(rename = "type", default = "default_crew_type")]
    pub crew_type: String,
    #[serde(default)]
    pub color: Option<String>,
}

fn default_crew_type() -> String {
    "GTC".to_string()
}

/// Partial update of a job's schedule fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulePatch {
    /// `scheduled_start := <day>T00:00:00`; `scheduled_end` is left untouched.
    AssignDay(NaiveDate),
    /// `scheduled_start := null, scheduled_end := null`.
    Unschedule,
}

impl SchedulePatch {
    /// JSON body for the backend's partial update endpoint.
    ///
    /// Omitted keys are left alone by the backend; explicit nulls clear.
    pub fn to_body(&self) -> Value {
        match self {
            SchedulePatch::AssignDay(day) => json!({
                "scheduled_start": format_local_midnight(*day),
            }),
            SchedulePatch::Unschedule => json!({
                "scheduled_start": Value::Null,
                "scheduled_end": Value::Null,
            }),
        }
    }

    /// Apply the patch to an in-memory record (used by in-process backends).
    pub fn apply_to(&self, job: &mut Job) {
        match self {
            SchedulePatch::AssignDay(day) => {
                job.scheduled_start = Some(format_local_midnight(*day));
            }
            SchedulePatch::Unschedule => {
                job.scheduled_start = None;
                job.scheduled_end = None;
            }
        }
    }
}

/// `YYYY-MM-DDT00:00:00` for the given local day.
pub fn format_local_midnight(day: NaiveDate) -> String {
    day.and_time(chrono::NaiveTime::MIN)
        .format(WIRE_TIMESTAMP_FORMAT)
        .to_string()
}

/// Parse a scheduling timestamp into naive local time.
///
/// Naive values are taken as already local. Offset-carrying values (RFC 3339)
/// are converted into the local timezone first, so day keys never follow UTC.
/// Bare dates are anchored at local midnight.
pub fn parse_local_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(ts) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(ts);
        }
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Local).naive_local());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(chrono::NaiveTime::MIN))
}
