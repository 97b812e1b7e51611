//! Element identifiers and attachment points.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque, stable identifier of a forwarding device.
///
/// The control plane never interprets the contents; device identifiers
/// come from the southbound transport (e.g. `of:0000000000000001`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    /// Creates a device identifier.
    pub fn new(id: impl Into<String>) -> Self {
        DeviceId(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(s: &str) -> Self {
        DeviceId(s.to_string())
    }
}

/// Opaque identifier of an end host known to the host directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostId(String);

impl HostId {
    /// Creates a host identifier.
    pub fn new(id: impl Into<String>) -> Self {
        HostId(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for HostId {
    fn from(s: &str) -> Self {
        HostId(s.to_string())
    }
}

/// A switch port number.
///
/// Ordinary ports are non-negative integers assigned by the device. The
/// reserved [`PortNo::FLOOD`] value addresses all ports at once and is
/// only valid as an output, never as an ingress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortNo(u64);

impl PortNo {
    /// Logical port addressing all ports of a device (flood).
    pub const FLOOD: PortNo = PortNo(u64::MAX);

    /// Creates a port number.
    pub const fn new(port: u64) -> Self {
        PortNo(port)
    }

    /// Returns the raw port number.
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Returns true if this is the reserved flood port.
    pub const fn is_flood(&self) -> bool {
        self.0 == u64::MAX
    }
}

impl fmt::Display for PortNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_flood() {
            write!(f, "flood")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl FromStr for PortNo {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "flood" {
            return Ok(PortNo::FLOOD);
        }
        s.parse::<u64>()
            .map(PortNo)
            .map_err(|_| ParseError::InvalidPortNumber(s.to_string()))
    }
}

impl From<u64> for PortNo {
    fn from(port: u64) -> Self {
        PortNo(port)
    }
}

/// A switch-port address: one attachment point on one device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectPoint {
    pub device: DeviceId,
    pub port: PortNo,
}

impl ConnectPoint {
    /// Creates an attachment point.
    pub fn new(device: DeviceId, port: PortNo) -> Self {
        Self { device, port }
    }
}

impl fmt::Display for ConnectPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.device, self.port)
    }
}
