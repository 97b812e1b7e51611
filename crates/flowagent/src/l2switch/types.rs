//! MAC table and decision types.

use dashmap::DashMap;
use flowctl_types::{DeviceId, MacAddress, PortNo};

/// What to do with the in-flight packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardDecision {
    /// Emit on the learned port.
    Output(PortNo),
    /// Emit on all ports.
    Flood,
}

/// Per-device MAC learning tables.
///
/// Both the outer device map and each inner address map are concurrent:
/// packets from different devices, and from different ports of one
/// device, are processed in parallel without external locking. The inner
/// contract is last-write-wins; two concurrent claims for the same source
/// address resolve to whichever write lands last.
///
/// Entries never age out. They live until [`MacTable::reset`] or process
/// restart.
#[derive(Debug, Default)]
pub struct MacTable {
    tables: DashMap<DeviceId, DashMap<MacAddress, PortNo>>,
}

impl MacTable {
    /// Creates an empty table set.
    pub fn new() -> Self {
        Self {
            tables: DashMap::new(),
        }
    }

    /// Makes sure a (possibly empty) table exists for the device.
    ///
    /// No-op if one is already present; safe under concurrent first
    /// packets from the same device.
    pub fn ensure_device(&self, device: &DeviceId) {
        if !self.tables.contains_key(device) {
            self.tables.entry(device.clone()).or_default();
        }
    }

    /// Records `mac -> port` on the device, overwriting any prior port.
    pub fn learn(&self, device: &DeviceId, mac: MacAddress, port: PortNo) {
        self.tables.entry(device.clone()).or_default().insert(mac, port);
    }

    /// Returns the port the address was last seen on, if any.
    pub fn lookup(&self, device: &DeviceId, mac: &MacAddress) -> Option<PortNo> {
        self.tables
            .get(device)
            .and_then(|table| table.get(mac).map(|port| *port))
    }

    /// Number of devices with a table.
    pub fn device_count(&self) -> usize {
        self.tables.len()
    }

    /// Number of learned addresses on the device.
    pub fn entry_count(&self, device: &DeviceId) -> usize {
        self.tables.get(device).map(|table| table.len()).unwrap_or(0)
    }

    /// Drops every table.
    pub fn reset(&self) {
        self.tables.clear();
    }
}
