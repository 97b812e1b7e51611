//! Agent daemon: packet event loop and orch wiring.

mod orchdaemon;

pub use orchdaemon::{FlowDaemon, FlowDaemonConfig, PacketEvent};
