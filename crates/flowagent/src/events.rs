//! Typed control-plane events.
//!
//! The agent publishes topology and route changes as a typed enum over a
//! broadcast channel. The streaming transport (out of scope here)
//! subscribes and serializes; the core never blocks on slow listeners —
//! lagging subscribers miss events, per `tokio::sync::broadcast`
//! semantics.

use crate::routing::RouteId;
use flowctl_types::{ConnectPoint, DeviceId, HostId};
use log::trace;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// What happened to the subject of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Added,
    Updated,
    Removed,
}

/// A change in the network or in the route table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NetworkEvent {
    Device {
        device: DeviceId,
        kind: EventKind,
    },
    Host {
        host: HostId,
        location: ConnectPoint,
        kind: EventKind,
    },
    Link {
        src: ConnectPoint,
        dst: ConnectPoint,
        kind: EventKind,
    },
    Route {
        id: RouteId,
        kind: EventKind,
    },
}

/// Fan-out channel for [`NetworkEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<NetworkEvent>,
}

impl EventBus {
    /// Creates a bus buffering up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribes to events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<NetworkEvent> {
        self.tx.subscribe()
    }

    /// Publishes an event. With no subscribers this is a no-op.
    pub fn publish(&self, event: NetworkEvent) {
        trace!("event: {:?}", event);
        let _ = self.tx.send(event);
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}
