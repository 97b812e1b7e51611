//! Common network value types for the flowctl control plane.
//!
//! This crate provides type-safe representations of the primitives shared
//! by the forwarding subsystems:
//!
//! - [`MacAddress`]: 48-bit Ethernet MAC addresses
//! - [`VlanId`]: IEEE 802.1Q VLAN identifiers
//! - [`DeviceId`] / [`HostId`]: opaque element identifiers
//! - [`PortNo`]: switch port numbers, including the reserved flood port
//! - [`ConnectPoint`]: a (device, port) attachment point
//! - [`EtherType`] / [`EthernetFrame`]: Ethernet header handling

mod ether_type;
mod frame;
mod mac;
mod net;
mod vlan;

pub use ether_type::EtherType;
pub use frame::EthernetFrame;
pub use mac::MacAddress;
pub use net::{ConnectPoint, DeviceId, HostId, PortNo};
pub use vlan::VlanId;

/// Common error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid MAC address format: {0}")]
    InvalidMacAddress(String),

    #[error("invalid VLAN ID: {0} (must be 1-4094)")]
    InvalidVlanId(u16),

    #[error("invalid port number: {0}")]
    InvalidPortNumber(String),

    #[error("truncated Ethernet frame: {0} bytes")]
    TruncatedFrame(usize),
}
