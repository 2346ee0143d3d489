//! Sun-side calculator for flight routes.
//!
//! Great-circle geometry between two points, the sun's position at departure and
//! the aircraft side it falls on, plus a small airport table and seat map for the
//! `sunside` binary.

pub mod airports;
pub mod error;
pub mod geo;
pub mod route;
pub mod seats;
pub mod solar;
pub mod time;

pub use error::{Error, Result};
pub use geo::{AmbiguousGeometry, Coordinate};
pub use route::{RouteParams, RoutePlan, RouteSample, plan_route};
pub use solar::{ScenicSide, SideRule, SolarPosition, SunTimes, scenic_side, sun_position, sun_times};
