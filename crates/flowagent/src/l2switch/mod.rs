//! L2SwitchOrch - MAC learning and reactive forwarding decisions.
//!
//! One MAC table per device, learned from packet sources, looked up for
//! packet destinations. A hit forwards the in-flight packet and installs
//! a short-lived rule so the rest of the flow stays in the datapath; a
//! miss floods and installs nothing.

mod orch;
mod types;

pub use orch::{L2SwitchConfig, L2SwitchOrch, L2SwitchStats};
pub use types::{ForwardDecision, MacTable};
