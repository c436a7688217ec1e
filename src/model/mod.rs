// src/model/mod.rs

//! Records shared by the calendar and route halves of the scheduler.
//!
//! - [`job`] holds the backend-facing `Job` / `Crew` records and the naive
//!   local timestamp helpers used on the wire.
//! - [`stop`] holds the operator-maintained route `Stop`, the `Depot`, and
//!   the validated `Coordinate` both are built from.

pub mod job;
pub mod stop;

pub use job::{
    Crew, CrewId, Job, JobId, JobStatus, SchedulePatch, format_local_midnight,
    parse_local_timestamp,
};
pub use stop::{Coordinate, Depot, NewStop, Stop, StopId, StopStatus};
