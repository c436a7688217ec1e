// src/route/mod.rs

//! Daily route planning for a crew.
//!
//! - [`stops`] keeps the depot and the operator-entered stop list.
//! - [`provider`] is the seam to the external routing/optimization service
//!   (OSRM-compatible over HTTP in production).
//! - [`normalize`] reinterprets the provider's waypoint indices against the
//!   local stop list.
//! - [`sequencer`] turns a provider answer (or failure) into a `RouteResult`
//!   and makes sure only the newest request is ever applied.
//! - [`session`] owns all of the above for one planning surface and decides
//!   when a re-plan is due.
//!
//! Stops are fed independently of the calendar's job pools.

pub mod normalize;
pub mod provider;
pub mod sequencer;
pub mod session;
pub mod stops;

pub use normalize::{is_permutation, normalize_waypoint_order};
pub use provider::{OsrmProvider, ProviderResponse, ProviderRoute, RouteMode, RouteRequest, RoutingProvider};
pub use sequencer::{RouteMetrics, RouteResult, RouteSequencer, RouteStatus, RouteTicket, UNAVAILABLE_NOTICE};
pub use session::RouteSession;
pub use stops::{StopModel, StopsFile, load_stops_file};
