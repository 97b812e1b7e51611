//! EtherType constants and formatting.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An Ethernet frame type (EtherType) value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EtherType(u16);

impl EtherType {
    pub const IPV4: EtherType = EtherType(0x0800);
    pub const ARP: EtherType = EtherType(0x0806);
    pub const VLAN: EtherType = EtherType(0x8100);
    pub const IPV6: EtherType = EtherType(0x86dd);
    pub const LLDP: EtherType = EtherType(0x88cc);

    /// Creates an EtherType from a raw value.
    pub const fn new(value: u16) -> Self {
        EtherType(value)
    }

    /// Returns the raw 16-bit value.
    pub const fn as_u16(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for EtherType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            EtherType::IPV4 => write!(f, "ipv4"),
            EtherType::ARP => write!(f, "arp"),
            EtherType::VLAN => write!(f, "vlan"),
            EtherType::IPV6 => write!(f, "ipv6"),
            EtherType::LLDP => write!(f, "lldp"),
            EtherType(other) => write!(f, "0x{:04x}", other),
        }
    }
}

impl From<u16> for EtherType {
    fn from(value: u16) -> Self {
        EtherType(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values() {
        assert_eq!(EtherType::IPV4.as_u16(), 0x0800);
        assert_eq!(EtherType::ARP.as_u16(), 0x0806);
        assert_eq!(EtherType::IPV4.to_string(), "ipv4");
        assert_eq!(EtherType::new(0x9000).to_string(), "0x9000");
    }
}
