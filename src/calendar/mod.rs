// src/calendar/mod.rs

//! Calendar window math for week and month views.
//!
//! Everything here is pure: no IO, no clock reads. Callers pass the anchor
//! date in (usually "today" in local time) and get back the ordered set of
//! days to render plus the range to query jobs for.

pub mod window;

pub use window::{CalendarDay, CalendarWindow, compute_window, day_key, shift};
