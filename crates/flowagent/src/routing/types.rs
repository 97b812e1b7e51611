//! Route, path, and route-table types.

use flowctl_flow::FlowRule;
use flowctl_types::{DeviceId, HostId, PortNo};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Server-assigned route identifier, unique for the process lifetime.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RouteId(u64);

impl RouteId {
    /// Wraps a raw identifier.
    pub const fn new(id: u64) -> Self {
        RouteId(id)
    }

    /// Returns the raw identifier.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry of a path: an element id plus an optional port.
///
/// Endpoint entries name a host and carry no port; interior entries name
/// a device and must carry one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathPoint {
    pub id: String,
    pub port: Option<PortNo>,
}

impl PathPoint {
    /// A host endpoint (no port).
    pub fn host(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            port: None,
        }
    }

    /// A device attachment point.
    pub fn device(id: impl Into<String>, port: u64) -> Self {
        Self {
            id: id.into(),
            port: Some(PortNo::new(port)),
        }
    }

    /// The entry's id read as a host identifier.
    pub fn host_id(&self) -> HostId {
        HostId::new(self.id.clone())
    }

    /// The entry's id read as a device identifier.
    pub fn device_id(&self) -> DeviceId {
        DeviceId::new(self.id.clone())
    }
}

impl fmt::Display for PathPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}/{}", self.id, port),
            None => write!(f, "{}", self.id),
        }
    }
}

/// An explicit walk between two hosts.
///
/// Layout: index 0 is the source host's attachment point, the last index
/// the destination host's, and the interior entries pair up as
/// (ingress, egress) on one device per hop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    pub points: Vec<PathPoint>,
}

impl Path {
    /// Creates a path from its points.
    pub fn new(points: Vec<PathPoint>) -> Self {
        Self { points }
    }

    /// The source endpoint, if the path is non-empty.
    pub fn src(&self) -> Option<&PathPoint> {
        self.points.first()
    }

    /// The destination endpoint, if the path is non-empty.
    pub fn dst(&self) -> Option<&PathPoint> {
        self.points.last()
    }

    /// Iterates over the interior (ingress, egress) pairs.
    pub fn hops(&self) -> impl Iterator<Item = (&PathPoint, &PathPoint)> {
        let interior = if self.points.len() > 2 {
            &self.points[1..self.points.len() - 1]
        } else {
            &self.points[0..0]
        };
        interior.chunks_exact(2).map(|pair| (&pair[0], &pair[1]))
    }

    /// Number of devices the path traverses.
    pub fn hop_count(&self) -> usize {
        self.points.len().saturating_sub(2) / 2
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for point in &self.points {
            if !first {
                write!(f, " -> ")?;
            }
            write!(f, "{}", point)?;
            first = false;
        }
        Ok(())
    }
}

/// A committed route: id plus the path it was created or updated with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub id: RouteId,
    pub path: Path,
}

/// The route table and the route-to-rules index.
///
/// Always mutated together under one lock, so the invariant "an id is in
/// the route table iff it has a rule binding" holds at every point a
/// reader can observe.
#[derive(Debug, Default)]
pub struct RouteTables {
    routes: HashMap<RouteId, Path>,
    bindings: HashMap<RouteId, Vec<FlowRule>>,
}

impl RouteTables {
    /// Commits a route and its installed rules in one step.
    pub fn commit(&mut self, id: RouteId, path: Path, rules: Vec<FlowRule>) {
        self.routes.insert(id, path);
        self.bindings.insert(id, rules);
    }

    /// Removes a route; returns its path and rules if it existed.
    pub fn remove(&mut self, id: RouteId) -> Option<(Path, Vec<FlowRule>)> {
        let path = self.routes.remove(&id)?;
        let rules = self.bindings.remove(&id).unwrap_or_default();
        Some((path, rules))
    }

    /// True if the id is committed.
    pub fn contains(&self, id: RouteId) -> bool {
        self.routes.contains_key(&id)
    }

    /// The rules currently bound to the id.
    pub fn binding(&self, id: RouteId) -> Option<&Vec<FlowRule>> {
        self.bindings.get(&id)
    }

    /// Number of committed routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// True if no route is committed.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Drops every route and binding; returns the rules that were bound.
    pub fn drain(&mut self) -> Vec<FlowRule> {
        self.routes.clear();
        self.bindings.drain().flat_map(|(_, rules)| rules).collect()
    }

    /// Snapshot of all committed routes, ordered by id.
    pub fn snapshot(&self) -> Vec<Route> {
        let mut routes: Vec<Route> = self
            .routes
            .iter()
            .map(|(id, path)| Route {
                id: *id,
                path: path.clone(),
            })
            .collect();
        routes.sort_by_key(|route| route.id);
        routes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn two_hop_path() -> Path {
        Path::new(vec![
            PathPoint::host("h1"),
            PathPoint::device("s1", 1),
            PathPoint::device("s1", 2),
            PathPoint::device("s2", 1),
            PathPoint::device("s2", 2),
            PathPoint::host("h2"),
        ])
    }

    #[test]
    fn test_endpoints_and_hops() {
        let path = two_hop_path();
        assert_eq!(path.src().unwrap().id, "h1");
        assert_eq!(path.dst().unwrap().id, "h2");
        assert_eq!(path.hop_count(), 2);

        let hops: Vec<_> = path.hops().collect();
        assert_eq!(hops.len(), 2);
        assert_eq!(hops[0].0.id, "s1");
        assert_eq!(hops[0].1.id, "s1");
        assert_eq!(hops[1].0.id, "s2");
        assert_eq!(hops[1].1.port, Some(PortNo::new(2)));
    }

    #[test]
    fn test_direct_path_has_no_hops() {
        let path = Path::new(vec![PathPoint::host("h1"), PathPoint::host("h2")]);
        assert_eq!(path.hop_count(), 0);
        assert_eq!(path.hops().count(), 0);
    }

    #[test]
    fn test_tables_move_together() {
        let mut tables = RouteTables::default();
        let id = RouteId::new(1);

        tables.commit(id, two_hop_path(), Vec::new());
        assert!(tables.contains(id));
        assert!(tables.binding(id).is_some());

        let removed = tables.remove(id);
        assert!(removed.is_some());
        assert!(!tables.contains(id));
        assert!(tables.binding(id).is_none());
        assert!(tables.remove(id).is_none());
    }

    #[test]
    fn test_snapshot_is_ordered() {
        let mut tables = RouteTables::default();
        tables.commit(RouteId::new(3), two_hop_path(), Vec::new());
        tables.commit(RouteId::new(1), two_hop_path(), Vec::new());
        tables.commit(RouteId::new(2), two_hop_path(), Vec::new());

        let ids: Vec<u64> = tables.snapshot().iter().map(|r| r.id.as_u64()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_path_display() {
        let path = Path::new(vec![
            PathPoint::host("h1"),
            PathPoint::device("s1", 1),
            PathPoint::device("s1", 2),
            PathPoint::host("h2"),
        ]);
        assert_eq!(path.to_string(), "h1 -> s1/1 -> s1/2 -> h2");
    }
}
