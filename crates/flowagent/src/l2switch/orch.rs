//! Learning forwarder orchestration logic.

use super::types::{ForwardDecision, MacTable};
use flowctl_flow::{
    FlowRule, OwnerTag, RuleAction, RuleInstaller, RuleMatch, REACTIVE_PRIORITY,
};
use flowctl_types::{ConnectPoint, EtherType, EthernetFrame};
use log::{debug, warn};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

/// Configuration for [`L2SwitchOrch`].
#[derive(Debug, Clone)]
pub struct L2SwitchConfig {
    /// Idle timeout for reactively installed rules, in seconds.
    /// Overridable at runtime via [`L2SwitchOrch::set_flow_timeout`].
    pub flow_timeout_secs: u32,
    /// Frame types the forwarder reacts to; everything else is ignored.
    pub ether_types: Vec<EtherType>,
    /// Priority for reactively installed rules.
    pub priority: u32,
}

impl Default for L2SwitchConfig {
    fn default() -> Self {
        Self {
            flow_timeout_secs: 10,
            ether_types: vec![EtherType::IPV4, EtherType::ARP],
            priority: REACTIVE_PRIORITY,
        }
    }
}

/// Counters exposed by the learning forwarder.
#[derive(Debug, Default)]
pub struct L2SwitchStats {
    pub packets: AtomicU64,
    pub ignored: AtomicU64,
    pub forwarded: AtomicU64,
    pub flooded: AtomicU64,
    pub rules_installed: AtomicU64,
    pub install_failures: AtomicU64,
}

/// MAC-learning forwarder.
///
/// Shared-state design: `on_packet` takes `&self` and every packet may
/// run on its own task. The tables are concurrent per device, the
/// timeout is an atomic, and the installer is behind an `Arc`.
pub struct L2SwitchOrch {
    installer: Arc<dyn RuleInstaller>,
    owner: OwnerTag,
    ether_types: Vec<EtherType>,
    priority: u32,
    flow_timeout_secs: AtomicU32,
    tables: MacTable,
    stats: L2SwitchStats,
}

impl L2SwitchOrch {
    /// Owner tag stamped on every rule this forwarder installs.
    pub const OWNER: &'static str = "flowctl.l2switch";

    /// Creates a learning forwarder programming rules through `installer`.
    pub fn new(config: L2SwitchConfig, installer: Arc<dyn RuleInstaller>) -> Self {
        Self {
            installer,
            owner: OwnerTag::new(Self::OWNER),
            ether_types: config.ether_types,
            priority: config.priority,
            flow_timeout_secs: AtomicU32::new(config.flow_timeout_secs),
            tables: MacTable::new(),
            stats: L2SwitchStats::default(),
        }
    }

    /// Current reactive-rule idle timeout in seconds.
    pub fn flow_timeout(&self) -> u32 {
        self.flow_timeout_secs.load(Ordering::Relaxed)
    }

    /// Changes the idle timeout for rules installed from now on.
    pub fn set_flow_timeout(&self, secs: u32) {
        self.flow_timeout_secs.store(secs, Ordering::Relaxed);
    }

    /// Read access to the MAC tables.
    pub fn tables(&self) -> &MacTable {
        &self.tables
    }

    /// Counter access.
    pub fn stats(&self) -> &L2SwitchStats {
        &self.stats
    }

    /// Processes one inbound packet and decides its fate.
    ///
    /// Learns the source address, then either forwards to the learned
    /// destination port (installing a temporary rule for the rest of the
    /// flow) or floods. Frames outside the configured ether types are
    /// ignored entirely: no learning, no decision.
    ///
    /// A failed rule install does not change the decision; the packet is
    /// still forwarded and the next packet of the flow re-triggers this
    /// path.
    pub async fn on_packet(
        &self,
        point: &ConnectPoint,
        frame: &EthernetFrame,
    ) -> Option<ForwardDecision> {
        self.stats.packets.fetch_add(1, Ordering::Relaxed);
        self.tables.ensure_device(&point.device);

        if !self.ether_types.contains(&frame.ether_type) {
            self.stats.ignored.fetch_add(1, Ordering::Relaxed);
            return None;
        }

        debug!(
            "{}: {} {} -> {}",
            point, frame.ether_type, frame.src, frame.dst
        );

        self.tables.learn(&point.device, frame.src, point.port);

        // Group destinations are never learned as sources; skip the probe.
        let out_port = if frame.dst.is_multicast() {
            None
        } else {
            self.tables.lookup(&point.device, &frame.dst)
        };

        match out_port {
            Some(port) => {
                let rule = FlowRule::builder(point.device.clone())
                    .matching(RuleMatch::builder().eth_dst(frame.dst).build())
                    .action(RuleAction::Output(port))
                    .priority(self.priority)
                    .temporary(self.flow_timeout())
                    .owner(self.owner.clone())
                    .build();

                // Fire and forget: a refused install only costs the flow
                // another trip through this path.
                match self.installer.install(&rule).await {
                    Ok(()) => {
                        self.stats.rules_installed.fetch_add(1, Ordering::Relaxed);
                    }
                    Err(e) => {
                        self.stats.install_failures.fetch_add(1, Ordering::Relaxed);
                        warn!("reactive rule install failed on {}: {}", point.device, e);
                    }
                }

                self.stats.forwarded.fetch_add(1, Ordering::Relaxed);
                Some(ForwardDecision::Output(port))
            }
            None => {
                self.stats.flooded.fetch_add(1, Ordering::Relaxed);
                Some(ForwardDecision::Flood)
            }
        }
    }
}

impl crate::orch::Orch for L2SwitchOrch {
    fn name(&self) -> &str {
        "L2SwitchOrch"
    }

    fn dump_state(&self) -> Vec<String> {
        vec![
            format!("devices: {}", self.tables.device_count()),
            format!(
                "packets: {} (forwarded {}, flooded {}, ignored {})",
                self.stats.packets.load(Ordering::Relaxed),
                self.stats.forwarded.load(Ordering::Relaxed),
                self.stats.flooded.load(Ordering::Relaxed),
                self.stats.ignored.load(Ordering::Relaxed),
            ),
            format!(
                "rules installed: {} ({} failures)",
                self.stats.rules_installed.load(Ordering::Relaxed),
                self.stats.install_failures.load(Ordering::Relaxed),
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowctl_flow::RuleLifetime;
    use flowctl_test::RecordingInstaller;
    use flowctl_types::{DeviceId, MacAddress, PortNo, VlanId};
    use pretty_assertions::assert_eq;

    fn mac(last: u8) -> MacAddress {
        MacAddress::new([0, 0, 0, 0, 0, last])
    }

    fn frame(src: MacAddress, dst: MacAddress, ether_type: EtherType) -> EthernetFrame {
        EthernetFrame {
            dst,
            src,
            vlan: None,
            ether_type,
            payload: Vec::new(),
        }
    }

    fn point(device: &str, port: u64) -> ConnectPoint {
        ConnectPoint::new(DeviceId::from(device), PortNo::new(port))
    }

    fn orch_with_installer() -> (L2SwitchOrch, Arc<RecordingInstaller>) {
        let installer = Arc::new(RecordingInstaller::new());
        let orch = L2SwitchOrch::new(L2SwitchConfig::default(), installer.clone());
        (orch, installer)
    }

    #[tokio::test]
    async fn test_unknown_destination_floods_without_rule() {
        let (orch, installer) = orch_with_installer();

        let decision = orch
            .on_packet(&point("s1", 1), &frame(mac(1), mac(2), EtherType::IPV4))
            .await;

        assert_eq!(decision, Some(ForwardDecision::Flood));
        assert_eq!(installer.install_count(), 0);
        // The source was still learned.
        assert_eq!(
            orch.tables().lookup(&DeviceId::from("s1"), &mac(1)),
            Some(PortNo::new(1))
        );
    }

    #[tokio::test]
    async fn test_known_destination_forwards_and_installs() {
        let (orch, installer) = orch_with_installer();

        // h2 talks first, so s1 learns it on port 2.
        orch.on_packet(&point("s1", 2), &frame(mac(2), mac(1), EtherType::IPV4))
            .await;
        let decision = orch
            .on_packet(&point("s1", 1), &frame(mac(1), mac(2), EtherType::IPV4))
            .await;

        assert_eq!(decision, Some(ForwardDecision::Output(PortNo::new(2))));

        let rules = installer.live_rules();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].device, DeviceId::from("s1"));
        assert_eq!(rules[0].matcher.eth_dst, Some(mac(2)));
        assert_eq!(rules[0].matcher.eth_src, None);
        assert_eq!(rules[0].action, RuleAction::Output(PortNo::new(2)));
        assert_eq!(rules[0].priority, REACTIVE_PRIORITY);
        assert_eq!(
            rules[0].lifetime,
            RuleLifetime::Temporary { timeout_secs: 10 }
        );
        assert_eq!(rules[0].owner.as_str(), L2SwitchOrch::OWNER);
    }

    #[tokio::test]
    async fn test_unrecognized_ether_type_is_ignored() {
        let (orch, installer) = orch_with_installer();

        let decision = orch
            .on_packet(&point("s1", 1), &frame(mac(1), mac(2), EtherType::LLDP))
            .await;

        assert_eq!(decision, None);
        assert_eq!(installer.install_count(), 0);
        // No learning happened either.
        assert_eq!(orch.tables().lookup(&DeviceId::from("s1"), &mac(1)), None);
        assert_eq!(orch.stats().ignored.load(Ordering::Relaxed), 1);
        // The device table itself was still created.
        assert_eq!(orch.tables().device_count(), 1);
    }

    #[tokio::test]
    async fn test_relearn_on_host_move() {
        let (orch, _installer) = orch_with_installer();
        let s1 = DeviceId::from("s1");

        orch.on_packet(&point("s1", 1), &frame(mac(1), mac(9), EtherType::ARP))
            .await;
        assert_eq!(orch.tables().lookup(&s1, &mac(1)), Some(PortNo::new(1)));

        orch.on_packet(&point("s1", 7), &frame(mac(1), mac(9), EtherType::ARP))
            .await;
        assert_eq!(orch.tables().lookup(&s1, &mac(1)), Some(PortNo::new(7)));
        assert_eq!(orch.tables().entry_count(&s1), 1);
    }

    #[tokio::test]
    async fn test_broadcast_destination_floods() {
        let (orch, installer) = orch_with_installer();

        let decision = orch
            .on_packet(
                &point("s1", 1),
                &frame(mac(1), MacAddress::BROADCAST, EtherType::ARP),
            )
            .await;

        assert_eq!(decision, Some(ForwardDecision::Flood));
        assert_eq!(installer.install_count(), 0);
    }

    #[tokio::test]
    async fn test_install_failure_keeps_decision() {
        let (orch, installer) = orch_with_installer();
        installer.fail_installs();

        orch.on_packet(&point("s1", 2), &frame(mac(2), mac(1), EtherType::IPV4))
            .await;
        let decision = orch
            .on_packet(&point("s1", 1), &frame(mac(1), mac(2), EtherType::IPV4))
            .await;

        assert_eq!(decision, Some(ForwardDecision::Output(PortNo::new(2))));
        assert_eq!(orch.stats().install_failures.load(Ordering::Relaxed), 1);
        assert_eq!(orch.stats().rules_installed.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn test_flow_timeout_override_applies_to_new_rules() {
        let (orch, installer) = orch_with_installer();
        orch.set_flow_timeout(30);

        orch.on_packet(&point("s1", 2), &frame(mac(2), mac(1), EtherType::IPV4))
            .await;
        orch.on_packet(&point("s1", 1), &frame(mac(1), mac(2), EtherType::IPV4))
            .await;

        let rules = installer.live_rules();
        assert_eq!(
            rules[0].lifetime,
            RuleLifetime::Temporary { timeout_secs: 30 }
        );
    }

    #[tokio::test]
    async fn test_vlan_tagged_frame_still_learns() {
        let (orch, _installer) = orch_with_installer();

        let mut tagged = frame(mac(1), mac(2), EtherType::IPV4);
        tagged.vlan = Some(VlanId::new(100).unwrap());

        let decision = orch.on_packet(&point("s1", 3), &tagged).await;
        assert_eq!(decision, Some(ForwardDecision::Flood));
        assert_eq!(
            orch.tables().lookup(&DeviceId::from("s1"), &mac(1)),
            Some(PortNo::new(3))
        );
    }
}
