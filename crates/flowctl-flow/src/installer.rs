//! Rule installer contract.

use crate::{FlowRule, OwnerTag};
use async_trait::async_trait;
use thiserror::Error;

/// Error type for install/retract operations.
///
/// The control plane treats these as opaque: a failed install aborts the
/// operation that needed it, nothing here is retried.
#[derive(Debug, Clone, Error)]
pub enum InstallError {
    /// The device rejected the rule.
    #[error("device {device} rejected rule: {reason}")]
    Rejected { device: String, reason: String },

    /// The device is not reachable through the southbound transport.
    #[error("device {device} unreachable")]
    DeviceUnreachable { device: String },

    /// Transport-level failure.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Result type for installer operations.
pub type InstallResult<T> = Result<T, InstallError>;

/// Programs match-action rules into forwarding devices.
///
/// Calls are synchronous from the caller's perspective: when `install`
/// returns `Ok` the rule has been accepted by the device (or its agent),
/// bounded in time by the transport. The installer never mutates an
/// accepted rule; it only accepts or retracts whole rules.
#[async_trait]
pub trait RuleInstaller: Send + Sync {
    /// Installs one rule on its device.
    async fn install(&self, rule: &FlowRule) -> InstallResult<()>;

    /// Retracts one previously installed rule.
    async fn retract(&self, rule: &FlowRule) -> InstallResult<()>;

    /// Retracts every rule carrying the given owner tag, on every device.
    ///
    /// Safety net for owners whose per-rule bookkeeping has been lost.
    async fn retract_all_owned_by(&self, owner: &OwnerTag) -> InstallResult<()>;
}
