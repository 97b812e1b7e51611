//! Host directory contract.

use async_trait::async_trait;
use flowctl_types::{ConnectPoint, HostId, MacAddress, VlanId};
use serde::{Deserialize, Serialize};

/// A host known to the directory: its link-layer address, optional VLAN
/// membership, and current attachment point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    pub id: HostId,
    pub mac: MacAddress,
    pub vlan: Option<VlanId>,
    pub location: ConnectPoint,
}

/// Resolves host identifiers to their current state.
///
/// Backed by the topology/host-tracking service, which is outside this
/// control plane; the route manager only ever reads from it.
#[async_trait]
pub trait HostDirectory: Send + Sync {
    /// Looks up a host by id. Returns `None` for unknown hosts.
    async fn lookup_host(&self, id: &HostId) -> Option<Host>;
}
