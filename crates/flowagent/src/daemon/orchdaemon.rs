//! FlowDaemon implementation.
//!
//! The daemon owns the two orchs and drives the packet event loop:
//! the packet source pushes raw frames through an mpsc channel, each
//! packet is handled on its own task, and the per-packet decision goes
//! back through the event's reply channel so the source can emit the
//! in-flight packet.

use crate::events::EventBus;
use crate::l2switch::{ForwardDecision, L2SwitchOrch};
use crate::orch::Orch;
use crate::routing::RoutingOrch;
use flowctl_types::{ConnectPoint, EthernetFrame};
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Configuration for the [`FlowDaemon`].
#[derive(Debug, Clone)]
pub struct FlowDaemonConfig {
    /// Capacity of the inbound packet channel.
    pub channel_capacity: usize,
    /// Interval between debug state dumps, in milliseconds.
    pub heartbeat_interval_ms: u64,
}

impl Default for FlowDaemonConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1024,
            heartbeat_interval_ms: 1000,
        }
    }
}

/// One inbound packet from the packet source.
///
/// The source keeps the in-flight packet; the daemon answers with the
/// decision (or `None` for ignored frames) over `reply`.
#[derive(Debug)]
pub struct PacketEvent {
    pub point: ConnectPoint,
    pub raw: Vec<u8>,
    pub reply: oneshot::Sender<Option<ForwardDecision>>,
}

/// The agent daemon.
pub struct FlowDaemon {
    config: FlowDaemonConfig,
    l2switch: Arc<L2SwitchOrch>,
    routing: Arc<RoutingOrch>,
    events: EventBus,
}

impl FlowDaemon {
    /// Creates a daemon around the two orchs.
    pub fn new(
        config: FlowDaemonConfig,
        l2switch: Arc<L2SwitchOrch>,
        routing: Arc<RoutingOrch>,
        events: EventBus,
    ) -> Self {
        info!(
            "registering {} and {}",
            l2switch.name(),
            routing.name()
        );
        Self {
            config,
            l2switch,
            routing,
            events,
        }
    }

    /// The route manager, for the northbound request layer.
    pub fn routing(&self) -> Arc<RoutingOrch> {
        Arc::clone(&self.routing)
    }

    /// The learning forwarder.
    pub fn l2switch(&self) -> Arc<L2SwitchOrch> {
        Arc::clone(&self.l2switch)
    }

    /// The event bus the streaming layer subscribes to.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Creates the packet channel sized per the daemon config.
    pub fn packet_channel(&self) -> (mpsc::Sender<PacketEvent>, mpsc::Receiver<PacketEvent>) {
        mpsc::channel(self.config.channel_capacity)
    }

    /// Runs the packet loop until the senders are dropped.
    ///
    /// Each packet runs on its own task, so slow installs on one device
    /// do not hold up packets from others.
    pub async fn run(&self, mut packets: mpsc::Receiver<PacketEvent>) {
        info!("packet loop started");
        let mut heartbeat = tokio::time::interval(tokio::time::Duration::from_millis(
            self.config.heartbeat_interval_ms,
        ));

        loop {
            tokio::select! {
                event = packets.recv() => {
                    match event {
                        Some(event) => {
                            let l2switch = Arc::clone(&self.l2switch);
                            tokio::spawn(async move {
                                handle_packet(l2switch, event).await;
                            });
                        }
                        None => break,
                    }
                }
                _ = heartbeat.tick() => {
                    if log::log_enabled!(log::Level::Debug) {
                        for orch in [&*self.l2switch as &dyn Orch, &*self.routing as &dyn Orch] {
                            for line in orch.dump_state() {
                                debug!("{}: {}", orch.name(), line);
                            }
                        }
                    }
                }
            }
        }

        info!("packet loop stopped");
    }
}

async fn handle_packet(l2switch: Arc<L2SwitchOrch>, event: PacketEvent) {
    let PacketEvent { point, raw, reply } = event;

    let decision = match EthernetFrame::parse(&raw) {
        Ok(frame) => l2switch.on_packet(&point, &frame).await,
        Err(e) => {
            warn!("dropping unparseable frame from {}: {}", point, e);
            None
        }
    };

    // The source may have given up waiting; that is its business.
    let _ = reply.send(decision);
}
