//! Flow rule model and device-programming contracts.
//!
//! This crate defines the one abstraction the two forwarding subsystems
//! share — the match-action [`FlowRule`] — together with the contracts of
//! the external collaborators the control plane programs devices through:
//!
//! - [`RuleInstaller`]: pushes rules to and retracts rules from devices
//! - [`HostDirectory`]: resolves a host id to its address and location
//! - [`IdGenerator`]: hands out process-wide-unique route identifiers
//!
//! The transports behind these contracts (OpenFlow, P4Runtime, a test
//! double) are not this crate's concern; implementations live with the
//! southbound I/O layer.

mod host;
mod id;
mod installer;
mod rule;

pub use host::{Host, HostDirectory};
pub use id::{AtomicIdGenerator, IdGenerator};
pub use installer::{InstallError, InstallResult, RuleInstaller};
pub use rule::{
    FlowRule, FlowRuleBuilder, OwnerTag, RuleAction, RuleLifetime, RuleMatch, RuleMatchBuilder,
    REACTIVE_PRIORITY,
};
