//! Route orchestration logic.

use super::types::{Path, Route, RouteId, RouteTables};
use crate::events::{EventBus, EventKind, NetworkEvent};
use flowctl_flow::{
    FlowRule, Host, HostDirectory, IdGenerator, InstallError, OwnerTag, RuleAction,
    RuleInstaller, RuleMatch, REACTIVE_PRIORITY,
};
use flowctl_types::PortNo;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Error type for route operations.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// The path is malformed or an end host cannot be resolved.
    #[error("invalid route: {0}")]
    InvalidRoute(String),

    /// An update targeted an id that is not committed.
    #[error("route not found: {0}")]
    RouteNotFound(RouteId),

    /// The rule installer refused an install or retract.
    #[error(transparent)]
    Install(#[from] InstallError),
}

/// Result type for route operations.
pub type Result<T> = std::result::Result<T, RouteError>;

/// Error of a batch add: carries the ids committed before the failure.
///
/// Routes added before the failing entry stay committed; their rules are
/// not rolled back.
#[derive(Debug, thiserror::Error)]
#[error("batch aborted after {} committed routes: {source}", .added.len())]
pub struct BatchAddError {
    pub added: Vec<RouteId>,
    pub source: RouteError,
}

/// Configuration for [`RoutingOrch`].
#[derive(Debug, Clone)]
pub struct RoutingConfig {
    /// Priority for installed hop rules.
    pub priority: u32,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            priority: REACTIVE_PRIORITY,
        }
    }
}

/// Counters exposed by the route manager.
#[derive(Debug, Default)]
pub struct RoutingStats {
    pub routes_added: AtomicU64,
    pub routes_updated: AtomicU64,
    pub routes_deleted: AtomicU64,
    pub rules_installed: AtomicU64,
    pub rules_retracted: AtomicU64,
}

/// Path-based route manager.
///
/// Installs one permanent rule per hop of an explicit path and tracks
/// which rules belong to which route. Rules are installed *before* the
/// route is committed, so `get_routes` never returns a route whose rules
/// are not on the devices.
///
/// Concurrency: reads and writes on different route ids do not block
/// each other outside the short commit section; installer calls happen
/// with no lock held. Concurrent `update_route`/`delete_route` on the
/// *same* id is unspecified (last committer wins, rules of the loser may
/// leak) and callers are expected to serialize per id.
pub struct RoutingOrch {
    installer: Arc<dyn RuleInstaller>,
    hosts: Arc<dyn HostDirectory>,
    ids: Arc<dyn IdGenerator>,
    owner: OwnerTag,
    priority: u32,
    tables: RwLock<RouteTables>,
    stats: RoutingStats,
    events: Option<EventBus>,
}

impl RoutingOrch {
    /// Owner tag stamped on every rule this manager installs.
    pub const OWNER: &'static str = "flowctl.routing";

    /// Creates a route manager.
    pub fn new(
        config: RoutingConfig,
        installer: Arc<dyn RuleInstaller>,
        hosts: Arc<dyn HostDirectory>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            installer,
            hosts,
            ids,
            owner: OwnerTag::new(Self::OWNER),
            priority: config.priority,
            tables: RwLock::new(RouteTables::default()),
            stats: RoutingStats::default(),
            events: None,
        }
    }

    /// Publishes route changes to the given bus.
    pub fn with_event_bus(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// Counter access.
    pub fn stats(&self) -> &RoutingStats {
        &self.stats
    }

    fn publish(&self, id: RouteId, kind: EventKind) {
        if let Some(events) = &self.events {
            events.publish(NetworkEvent::Route { id, kind });
        }
    }

    /// Snapshot of every committed route, ordered by id.
    ///
    /// Only fully committed routes are visible; a concurrent add or
    /// update is either absent or complete, never partial.
    pub fn get_routes(&self) -> Vec<Route> {
        self.tables.read().expect("route tables poisoned").snapshot()
    }

    /// Number of committed routes.
    pub fn route_count(&self) -> usize {
        self.tables.read().expect("route tables poisoned").len()
    }

    /// Number of rules bound to the id, if committed.
    pub fn installed_rule_count(&self, id: RouteId) -> Option<usize> {
        self.tables
            .read()
            .expect("route tables poisoned")
            .binding(id)
            .map(|rules| rules.len())
    }

    /// Validates the path, installs one rule per hop, and commits.
    ///
    /// Returns the new route id. Nothing is committed on failure, but
    /// rules already accepted for earlier hops are left on the devices
    /// (no rollback; `clear` is the recovery path).
    pub async fn add_route(&self, path: Path) -> Result<RouteId> {
        validate_path(&path)?;
        let rules = self.build_hop_rules(&path).await?;
        self.install_rules(&rules).await?;

        let id = RouteId::new(self.ids.next_id());
        {
            let mut tables = self.tables.write().expect("route tables poisoned");
            tables.commit(id, path, rules);
        }

        self.stats.routes_added.fetch_add(1, Ordering::Relaxed);
        self.publish(id, EventKind::Added);
        info!("route {} committed", id);
        Ok(id)
    }

    /// Adds paths in submission order; the first failure aborts the rest.
    ///
    /// Earlier successes stay committed and are reported in the error.
    pub async fn add_routes(
        &self,
        paths: Vec<Path>,
    ) -> std::result::Result<Vec<RouteId>, BatchAddError> {
        let mut added = Vec::with_capacity(paths.len());
        for path in paths {
            match self.add_route(path).await {
                Ok(id) => added.push(id),
                Err(source) => {
                    warn!("batch add aborted after {} routes: {}", added.len(), source);
                    return Err(BatchAddError { added, source });
                }
            }
        }
        Ok(added)
    }

    /// Replaces the path of a committed route.
    ///
    /// Retracts the old rule set, installs rules for the new path, then
    /// swaps path and binding in one step. Fails with
    /// [`RouteError::RouteNotFound`] when the id is absent.
    pub async fn update_route(&self, route: Route) -> Result<()> {
        let Route { id, path } = route;
        validate_path(&path)?;

        let old_rules = {
            let tables = self.tables.read().expect("route tables poisoned");
            tables
                .binding(id)
                .cloned()
                .ok_or(RouteError::RouteNotFound(id))?
        };

        self.retract_rules(&old_rules).await?;
        let rules = self.build_hop_rules(&path).await?;
        self.install_rules(&rules).await?;

        {
            let mut tables = self.tables.write().expect("route tables poisoned");
            tables.commit(id, path, rules);
        }

        self.stats.routes_updated.fetch_add(1, Ordering::Relaxed);
        self.publish(id, EventKind::Updated);
        info!("route {} updated", id);
        Ok(())
    }

    /// Applies [`RoutingOrch::update_route`] per element; first failure stops.
    pub async fn update_routes(&self, routes: Vec<Route>) -> Result<()> {
        for route in routes {
            self.update_route(route).await?;
        }
        Ok(())
    }

    /// Removes a route and retracts its rules.
    ///
    /// Deleting an id that is not committed is a silent no-op.
    pub async fn delete_route(&self, id: RouteId) -> Result<()> {
        let removed = {
            let mut tables = self.tables.write().expect("route tables poisoned");
            tables.remove(id)
        };

        let Some((_, rules)) = removed else {
            debug!("delete for unknown route {} ignored", id);
            return Ok(());
        };

        self.retract_rules(&rules).await?;
        self.stats.routes_deleted.fetch_add(1, Ordering::Relaxed);
        self.publish(id, EventKind::Removed);
        info!("route {} deleted ({} rules retracted)", id, rules.len());
        Ok(())
    }

    /// Applies [`RoutingOrch::delete_route`] per element; first failure stops.
    pub async fn delete_routes(&self, ids: &[RouteId]) -> Result<()> {
        for id in ids {
            self.delete_route(*id).await?;
        }
        Ok(())
    }

    /// Empties the route table and retracts every owned rule.
    ///
    /// Beyond the tracked bindings, this retracts by owner tag so rules
    /// orphaned by earlier partial failures are swept up too.
    pub async fn clear(&self) -> Result<()> {
        let dropped = {
            let mut tables = self.tables.write().expect("route tables poisoned");
            tables.drain()
        };

        self.installer.retract_all_owned_by(&self.owner).await?;
        info!("route table cleared ({} bound rules dropped)", dropped.len());
        Ok(())
    }

    async fn resolve_endpoints(&self, path: &Path) -> Result<(Host, Host)> {
        // validate_path has run: both endpoints exist.
        let src_point = path
            .src()
            .ok_or_else(|| RouteError::InvalidRoute("empty path".to_string()))?;
        let dst_point = path
            .dst()
            .ok_or_else(|| RouteError::InvalidRoute("empty path".to_string()))?;

        let src = self
            .hosts
            .lookup_host(&src_point.host_id())
            .await
            .ok_or_else(|| {
                RouteError::InvalidRoute(format!("source host {} not found", src_point.id))
            })?;
        let dst = self
            .hosts
            .lookup_host(&dst_point.host_id())
            .await
            .ok_or_else(|| {
                RouteError::InvalidRoute(format!("destination host {} not found", dst_point.id))
            })?;
        Ok((src, dst))
    }

    async fn build_hop_rules(&self, path: &Path) -> Result<Vec<FlowRule>> {
        let (src, dst) = self.resolve_endpoints(path).await?;

        let mut rules = Vec::with_capacity(path.hop_count());
        for (ingress, egress) in path.hops() {
            let in_port = point_port(ingress)?;
            let out_port = point_port(egress)?;

            let mut matcher = RuleMatch::builder()
                .eth_src(src.mac)
                .in_port(in_port)
                .eth_dst(dst.mac);
            if let Some(vlan) = src.vlan {
                matcher = matcher.vlan(vlan);
            }

            rules.push(
                FlowRule::builder(ingress.device_id())
                    .matching(matcher.build())
                    .action(RuleAction::Output(out_port))
                    .priority(self.priority)
                    .permanent()
                    .owner(self.owner.clone())
                    .build(),
            );
        }
        Ok(rules)
    }

    async fn install_rules(&self, rules: &[FlowRule]) -> Result<()> {
        for rule in rules {
            self.installer.install(rule).await?;
            self.stats.rules_installed.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }

    async fn retract_rules(&self, rules: &[FlowRule]) -> Result<()> {
        for rule in rules {
            self.installer.retract(rule).await?;
            self.stats.rules_retracted.fetch_add(1, Ordering::Relaxed);
        }
        Ok(())
    }
}

impl crate::orch::Orch for RoutingOrch {
    fn name(&self) -> &str {
        "RoutingOrch"
    }

    fn dump_state(&self) -> Vec<String> {
        vec![
            format!("routes: {}", self.route_count()),
            format!(
                "added {}, updated {}, deleted {}",
                self.stats.routes_added.load(Ordering::Relaxed),
                self.stats.routes_updated.load(Ordering::Relaxed),
                self.stats.routes_deleted.load(Ordering::Relaxed),
            ),
            format!(
                "rules installed {}, retracted {}",
                self.stats.rules_installed.load(Ordering::Relaxed),
                self.stats.rules_retracted.load(Ordering::Relaxed),
            ),
        ]
    }
}

fn point_port(point: &super::types::PathPoint) -> Result<PortNo> {
    point
        .port
        .ok_or_else(|| RouteError::InvalidRoute(format!("point {} carries no port", point.id)))
}

/// Checks the path shape invariant.
///
/// A usable path has at least the two endpoints, an even point count
/// (endpoints plus whole hop pairs), and every interior pair on one
/// device.
fn validate_path(path: &Path) -> Result<()> {
    let count = path.points.len();
    if count < 2 {
        return Err(RouteError::InvalidRoute(format!(
            "path needs at least two points, got {}",
            count
        )));
    }
    if count % 2 != 0 {
        return Err(RouteError::InvalidRoute(format!(
            "path needs an even number of points, got {}",
            count
        )));
    }
    for (ingress, egress) in path.hops() {
        if ingress.id != egress.id {
            return Err(RouteError::InvalidRoute(format!(
                "hop pair {} / {} spans two devices",
                ingress, egress
            )));
        }
    }
    Ok(())
}
