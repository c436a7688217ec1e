// src/assign/mod.rs

//! Drag-and-drop day assignment.
//!
//! Gesture handling belongs to the host UI. What reaches this module are two
//! commands, "drop job X on day D" and "drop job X on the unscheduled zone",
//! each carried through one operation:
//!
//! ```text
//! Idle -> Dragging(job) -> Dropped(target) -> Persisting -> Settled
//! ```
//!
//! The pools are only refreshed from the backend after the write returns;
//! local drag state is never applied to them directly.

pub mod controller;

pub use controller::{DragAssignmentController, DragState, DropOutcome, DropTarget};
