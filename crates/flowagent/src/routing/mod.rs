//! RoutingOrch - explicit path-based route management.
//!
//! A route is an ordered walk from one host attachment point to another,
//! through (ingress, egress) port pairs on the devices along the way.
//! For each hop the orch installs one permanent match-action rule; the
//! route table and the rules bound to each route move together, so a
//! reader never observes a route without its rules.

mod orch;
mod types;

pub use orch::{BatchAddError, Result, RouteError, RoutingConfig, RoutingOrch, RoutingStats};
pub use types::{Path, PathPoint, Route, RouteId, RouteTables};
