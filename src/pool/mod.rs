// src/pool/mod.rs

//! Job pools backing a calendar view.
//!
//! - the *unscheduled* pool: open jobs with no `scheduled_start`
//! - the *windowed* pool: jobs whose start falls inside the visible range,
//!   grouped into day buckets keyed by local date
//! - the crew directory used for grouping and labels

pub mod store;

pub use store::{JobPoolStore, PoolLocation, group_by_day};
