//! Match-action flow rules.

use flowctl_types::{DeviceId, MacAddress, PortNo, VlanId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Priority used for reactively installed rules.
///
/// Low enough that statically provisioned rules (punt-to-controller,
/// control traffic) always win.
pub const REACTIVE_PRIORITY: u32 = 5;

/// Match predicate over packet header fields.
///
/// Absent fields are wildcards. An empty match selects every packet on
/// the device, which no subsystem here ever installs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RuleMatch {
    pub eth_src: Option<MacAddress>,
    pub eth_dst: Option<MacAddress>,
    pub in_port: Option<PortNo>,
    pub vlan: Option<VlanId>,
}

impl RuleMatch {
    /// Starts building a match predicate.
    pub fn builder() -> RuleMatchBuilder {
        RuleMatchBuilder::default()
    }

    /// Returns true if no field is constrained.
    pub fn is_empty(&self) -> bool {
        self.eth_src.is_none()
            && self.eth_dst.is_none()
            && self.in_port.is_none()
            && self.vlan.is_none()
    }
}

/// Builder for [`RuleMatch`].
#[derive(Debug, Clone, Default)]
pub struct RuleMatchBuilder {
    matcher: RuleMatch,
}

impl RuleMatchBuilder {
    /// Matches on the source MAC address.
    pub fn eth_src(mut self, mac: MacAddress) -> Self {
        self.matcher.eth_src = Some(mac);
        self
    }

    /// Matches on the destination MAC address.
    pub fn eth_dst(mut self, mac: MacAddress) -> Self {
        self.matcher.eth_dst = Some(mac);
        self
    }

    /// Matches on the ingress port.
    pub fn in_port(mut self, port: PortNo) -> Self {
        self.matcher.in_port = Some(port);
        self
    }

    /// Matches on the VLAN tag.
    pub fn vlan(mut self, vlan: VlanId) -> Self {
        self.matcher.vlan = Some(vlan);
        self
    }

    /// Finishes the predicate.
    pub fn build(self) -> RuleMatch {
        self.matcher
    }
}

/// Action applied to matching packets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleAction {
    /// Emit the packet on the given port (possibly [`PortNo::FLOOD`]).
    Output(PortNo),
}

impl fmt::Display for RuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleAction::Output(port) => write!(f, "output:{}", port),
        }
    }
}

/// How long an installed rule lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RuleLifetime {
    /// Expires in the datapath after the idle timeout; renewed by the
    /// next packet that re-triggers the reactive path.
    Temporary { timeout_secs: u32 },
    /// Lives until explicitly retracted.
    Permanent,
}

impl RuleLifetime {
    /// Returns true for the permanent lifetime.
    pub fn is_permanent(&self) -> bool {
        matches!(self, RuleLifetime::Permanent)
    }
}

/// Tag identifying the subsystem that owns a rule.
///
/// Every installed rule carries its owner so the installer can retract a
/// whole subsystem's rules in one call, even when per-rule bookkeeping
/// has been lost.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerTag(String);

impl OwnerTag {
    /// Creates an owner tag.
    pub fn new(tag: impl Into<String>) -> Self {
        OwnerTag(tag.into())
    }

    /// Returns the tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A match-action rule bound to one device.
///
/// Rules are immutable once built: the installer either accepts or
/// retracts the whole object and never mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlowRule {
    pub device: DeviceId,
    pub matcher: RuleMatch,
    pub action: RuleAction,
    pub priority: u32,
    pub lifetime: RuleLifetime,
    pub owner: OwnerTag,
}

impl FlowRule {
    /// Starts building a rule for the given device.
    pub fn builder(device: DeviceId) -> FlowRuleBuilder {
        FlowRuleBuilder {
            device,
            matcher: RuleMatch::default(),
            action: None,
            priority: REACTIVE_PRIORITY,
            lifetime: RuleLifetime::Permanent,
            owner: None,
        }
    }
}

impl fmt::Display for FlowRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:?} -> {} (prio {}, {:?}, owner {})",
            self.device, self.matcher, self.action, self.priority, self.lifetime, self.owner
        )
    }
}

/// Builder for [`FlowRule`].
#[derive(Debug, Clone)]
pub struct FlowRuleBuilder {
    device: DeviceId,
    matcher: RuleMatch,
    action: Option<RuleAction>,
    priority: u32,
    lifetime: RuleLifetime,
    owner: Option<OwnerTag>,
}

impl FlowRuleBuilder {
    /// Sets the match predicate.
    pub fn matching(mut self, matcher: RuleMatch) -> Self {
        self.matcher = matcher;
        self
    }

    /// Sets the action.
    pub fn action(mut self, action: RuleAction) -> Self {
        self.action = Some(action);
        self
    }

    /// Sets the priority (defaults to [`REACTIVE_PRIORITY`]).
    pub fn priority(mut self, priority: u32) -> Self {
        self.priority = priority;
        self
    }

    /// Makes the rule expire after the given idle timeout.
    pub fn temporary(mut self, timeout_secs: u32) -> Self {
        self.lifetime = RuleLifetime::Temporary { timeout_secs };
        self
    }

    /// Makes the rule live until retracted (the default).
    pub fn permanent(mut self) -> Self {
        self.lifetime = RuleLifetime::Permanent;
        self
    }

    /// Sets the owning subsystem.
    pub fn owner(mut self, owner: OwnerTag) -> Self {
        self.owner = Some(owner);
        self
    }

    /// Finishes the rule.
    ///
    /// # Panics
    ///
    /// Panics if no action or owner was supplied; both are programming
    /// errors at the call site, not runtime conditions.
    pub fn build(self) -> FlowRule {
        FlowRule {
            device: self.device,
            matcher: self.matcher,
            action: self.action.expect("flow rule requires an action"),
            priority: self.priority,
            lifetime: self.lifetime,
            owner: self.owner.expect("flow rule requires an owner tag"),
        }
    }
}
