//! flowagent - Reactive forwarding agent.
//!
//! The agent turns observed packets and explicit route requests into
//! match-action rules on forwarding devices:
//!
//! - [`l2switch`]: per-device MAC learning and forward-vs-flood decisions,
//!   installing short-lived reactive rules
//! - [`routing`]: explicit multi-hop routes, installing one permanent rule
//!   per hop with atomic commit and teardown
//!
//! The southbound transport (how packets arrive, how rules reach a
//! device) and the northbound request layer are wired in from outside
//! through the contracts in `flowctl-flow`.

pub mod daemon;
pub mod events;
pub mod l2switch;
pub mod orch;
pub mod routing;

pub use daemon::{FlowDaemon, FlowDaemonConfig, PacketEvent};
pub use events::{EventBus, EventKind, NetworkEvent};
pub use l2switch::{ForwardDecision, L2SwitchConfig, L2SwitchOrch, L2SwitchStats, MacTable};
pub use orch::Orch;
pub use routing::{
    BatchAddError, Path, PathPoint, Route, RouteError, RouteId, RoutingConfig, RoutingOrch,
    RoutingStats,
};
