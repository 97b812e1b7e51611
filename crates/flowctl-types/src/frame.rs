//! Ethernet header parsing.

use crate::{EtherType, MacAddress, ParseError, VlanId};

/// A parsed Ethernet frame header plus its payload.
///
/// Only the fields the forwarding decision needs are decoded: addresses,
/// an optional single 802.1Q tag, and the EtherType. The payload is kept
/// verbatim so the frame can be re-emitted by the packet source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EthernetFrame {
    pub dst: MacAddress,
    pub src: MacAddress,
    pub vlan: Option<VlanId>,
    pub ether_type: EtherType,
    pub payload: Vec<u8>,
}

impl EthernetFrame {
    /// Minimum parseable length: two addresses plus an EtherType.
    const HEADER_LEN: usize = 14;

    /// Parses an Ethernet header from raw bytes.
    ///
    /// Handles untagged frames and frames with one 802.1Q tag. A tag with
    /// VID 0 (priority tagged) is decoded as no VLAN membership.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::TruncatedFrame`] if the buffer is shorter
    /// than the header it claims to carry.
    pub fn parse(bytes: &[u8]) -> Result<Self, ParseError> {
        if bytes.len() < Self::HEADER_LEN {
            return Err(ParseError::TruncatedFrame(bytes.len()));
        }

        let dst = MacAddress::new(bytes[0..6].try_into().unwrap());
        let src = MacAddress::new(bytes[6..12].try_into().unwrap());
        let tpid = u16::from_be_bytes([bytes[12], bytes[13]]);

        if tpid == EtherType::VLAN.as_u16() {
            if bytes.len() < Self::HEADER_LEN + 4 {
                return Err(ParseError::TruncatedFrame(bytes.len()));
            }
            let tci = u16::from_be_bytes([bytes[14], bytes[15]]);
            let vid = tci & 0x0fff;
            let vlan = if vid == 0 {
                None
            } else {
                Some(VlanId::new(vid)?)
            };
            let ether_type = EtherType::new(u16::from_be_bytes([bytes[16], bytes[17]]));
            Ok(Self {
                dst,
                src,
                vlan,
                ether_type,
                payload: bytes[18..].to_vec(),
            })
        } else {
            Ok(Self {
                dst,
                src,
                vlan: None,
                ether_type: EtherType::new(tpid),
                payload: bytes[14..].to_vec(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn frame_bytes(dst: [u8; 6], src: [u8; 6], ether_type: u16, payload: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&dst);
        bytes.extend_from_slice(&src);
        bytes.extend_from_slice(&ether_type.to_be_bytes());
        bytes.extend_from_slice(payload);
        bytes
    }

    #[test]
    fn test_parse_untagged() {
        let bytes = frame_bytes([0xff; 6], [0x00, 0x11, 0x22, 0x33, 0x44, 0x55], 0x0806, &[1, 2]);
        let frame = EthernetFrame::parse(&bytes).unwrap();

        assert_eq!(frame.dst, MacAddress::BROADCAST);
        assert_eq!(frame.src, MacAddress::new([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]));
        assert_eq!(frame.vlan, None);
        assert_eq!(frame.ether_type, EtherType::ARP);
        assert_eq!(frame.payload, vec![1, 2]);
    }

    #[test]
    fn test_parse_tagged() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&[0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
        bytes.extend_from_slice(&[0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb]);
        bytes.extend_from_slice(&0x8100u16.to_be_bytes());
        bytes.extend_from_slice(&100u16.to_be_bytes()); // TCI: VID 100
        bytes.extend_from_slice(&0x0800u16.to_be_bytes());
        bytes.extend_from_slice(&[0xde, 0xad]);

        let frame = EthernetFrame::parse(&bytes).unwrap();
        assert_eq!(frame.vlan, Some(VlanId::new(100).unwrap()));
        assert_eq!(frame.ether_type, EtherType::IPV4);
        assert_eq!(frame.payload, vec![0xde, 0xad]);
    }

    #[test]
    fn test_parse_priority_tagged_has_no_vlan() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&[0x00; 6]);
        bytes.extend_from_slice(&[0x01; 6]);
        bytes.extend_from_slice(&0x8100u16.to_be_bytes());
        bytes.extend_from_slice(&0xe000u16.to_be_bytes()); // PCP 7, VID 0
        bytes.extend_from_slice(&0x0800u16.to_be_bytes());

        let frame = EthernetFrame::parse(&bytes).unwrap();
        assert_eq!(frame.vlan, None);
        assert_eq!(frame.ether_type, EtherType::IPV4);
    }

    #[test]
    fn test_parse_runt_frames() {
        assert_eq!(
            EthernetFrame::parse(&[0u8; 13]),
            Err(ParseError::TruncatedFrame(13))
        );

        // Tagged frame cut off inside the tag
        let mut bytes = vec![0u8; 12];
        bytes.extend_from_slice(&0x8100u16.to_be_bytes());
        bytes.extend_from_slice(&[0x00]);
        assert_eq!(
            EthernetFrame::parse(&bytes),
            Err(ParseError::TruncatedFrame(15))
        );
    }
}
