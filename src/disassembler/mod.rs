//! Best-effort disassembly of captured packet headers
//!
//! A raw packet record carries the first bytes of the sampled frame. This
//! module walks those bytes as a link → network → transport stack and keeps
//! every layer it fully understood in a [`DecodedHeader`].
//!
//! Disassembly never fails the enclosing record. [`disassemble`] logs why it
//! stopped and returns whatever layers were decoded up to that point;
//! [`DecodedHeader::decode_from`] exposes the stop reason for callers that
//! want it.

mod headers;

pub use headers::{EthernetHeader, IcmpHeader, Ipv4Header, MacAddr, TcpHeader, UdpHeader};

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, trace, warn};

use crate::records::HeaderProtocol;
use crate::{Result, SflowError};
use headers::HeaderLayer;

/// Captures shorter than this are not disassembled.
pub const MINIMUM_ETHERNET_HEADER_SIZE: usize = 14;

pub const ETHER_TYPE_IPV4: u16 = 0x0800;
pub const ETHER_TYPE_IPV6: u16 = 0x86DD;

pub const IP_PROTOCOL_ICMP: u8 = 1;
pub const IP_PROTOCOL_TCP: u8 = 6;
pub const IP_PROTOCOL_UDP: u8 = 17;
/// IPsec, encrypted payload
pub const IP_PROTOCOL_ESP: u8 = 50;
/// IPsec, authentication header
pub const IP_PROTOCOL_AH: u8 = 51;

/// One decoded protocol layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Layer {
    Ethernet(EthernetHeader),
    Ip(Ipv4Header),
    Tcp(TcpHeader),
    Udp(UdpHeader),
    Icmp(IcmpHeader),
}

impl Layer {
    /// Map key of the layer: "ethernet", "ip", "tcp", "udp" or "icmp".
    pub fn key(&self) -> &'static str {
        match self {
            Layer::Ethernet(_) => "ethernet",
            Layer::Ip(_) => "ip",
            Layer::Tcp(_) => "tcp",
            Layer::Udp(_) => "udp",
            Layer::Icmp(_) => "icmp",
        }
    }
}

/// Layers recognised in a captured header, keyed by layer name.
///
/// A missing key means the layer was absent or not understood.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DecodedHeader {
    layers: BTreeMap<&'static str, Layer>,
}

impl DecodedHeader {
    pub fn get(&self, key: &str) -> Option<&Layer> {
        self.layers.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.layers.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Layer names present, in key order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.layers.keys().copied()
    }

    pub fn ethernet(&self) -> Option<&EthernetHeader> {
        match self.layers.get("ethernet") {
            Some(Layer::Ethernet(header)) => Some(header),
            _ => None,
        }
    }

    pub fn ipv4(&self) -> Option<&Ipv4Header> {
        match self.layers.get("ip") {
            Some(Layer::Ip(header)) => Some(header),
            _ => None,
        }
    }

    pub fn tcp(&self) -> Option<&TcpHeader> {
        match self.layers.get("tcp") {
            Some(Layer::Tcp(header)) => Some(header),
            _ => None,
        }
    }

    pub fn udp(&self) -> Option<&UdpHeader> {
        match self.layers.get("udp") {
            Some(Layer::Udp(header)) => Some(header),
            _ => None,
        }
    }

    pub fn icmp(&self) -> Option<&IcmpHeader> {
        match self.layers.get("icmp") {
            Some(Layer::Icmp(header)) => Some(header),
            _ => None,
        }
    }

    fn insert(&mut self, layer: Layer) {
        self.layers.insert(layer.key(), layer);
    }

    /// Disassemble `bytes` framed as header protocol `protocol`.
    ///
    /// Layers decoded before an error stay in the map. Captures shorter than
    /// [`MINIMUM_ETHERNET_HEADER_SIZE`] and unknown header protocols are not
    /// errors; IPv6 yields [`SflowError::NotImplemented`].
    pub fn decode_from(&mut self, protocol: u32, bytes: &[u8]) -> Result<()> {
        if bytes.len() < MINIMUM_ETHERNET_HEADER_SIZE {
            trace!(len = bytes.len(), "Captured header too short to disassemble");
            return Ok(());
        }

        let mut cursor = bytes;
        match HeaderProtocol::from_code(protocol) {
            Some(HeaderProtocol::Ethernet) => self.decode_ethernet(&mut cursor),
            Some(HeaderProtocol::Ipv4) => self.decode_ipv4(&mut cursor),
            Some(HeaderProtocol::Ipv6) => Err(ipv6_not_implemented()),
            None => {
                trace!(protocol, "Header protocol not disassembled");
                Ok(())
            }
        }
    }

    fn decode_ethernet(&mut self, cursor: &mut &[u8]) -> Result<()> {
        let ethernet = EthernetHeader::decode(cursor)?;
        let ether_type = ethernet.ether_type;
        self.insert(Layer::Ethernet(ethernet));

        match ether_type {
            ETHER_TYPE_IPV4 => self.decode_ipv4(cursor),
            ETHER_TYPE_IPV6 => Err(ipv6_not_implemented()),
            other => {
                trace!(ether_type = other, "No network layer for ether type");
                Ok(())
            }
        }
    }

    fn decode_ipv4(&mut self, cursor: &mut &[u8]) -> Result<()> {
        let ip = Ipv4Header::decode(cursor)?;
        let protocol = ip.protocol;
        let header_len = ip.header_len();
        self.insert(Layer::Ip(ip));

        if header_len < Ipv4Header::MIN_LEN {
            debug!(header_len, "IPv4 header length below minimum, stopping");
            return Ok(());
        }

        let options = header_len - Ipv4Header::MIN_LEN;
        if cursor.len() < options {
            return Err(SflowError::truncated("ipv4 options", options));
        }
        *cursor = &cursor[options..];

        match protocol {
            IP_PROTOCOL_TCP => self.insert(Layer::Tcp(TcpHeader::decode(cursor)?)),
            IP_PROTOCOL_UDP => self.insert(Layer::Udp(UdpHeader::decode(cursor)?)),
            IP_PROTOCOL_ICMP => self.insert(Layer::Icmp(IcmpHeader::decode(cursor)?)),
            IP_PROTOCOL_ESP | IP_PROTOCOL_AH => trace!(protocol, "Skipping IPsec payload"),
            other => trace!(protocol = other, "Transport protocol not disassembled"),
        }
        Ok(())
    }
}

fn ipv6_not_implemented() -> SflowError {
    SflowError::not_implemented("IPv6 header disassembly")
}

/// Disassemble a captured header, logging and swallowing any stop reason.
pub fn disassemble(protocol: u32, bytes: &[u8]) -> DecodedHeader {
    let mut decoded = DecodedHeader::default();
    if let Err(err) = decoded.decode_from(protocol, bytes) {
        if err.is_recoverable() {
            debug!(error = %err, layers = decoded.len(), "Header disassembly stopped");
        } else {
            warn!(error = %err, layers = decoded.len(), "Malformed captured header");
        }
    }
    decoded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{CaptureBuilder, tcp_capture};
    use std::net::Ipv4Addr;

    #[test]
    fn tcp_capture_decodes_three_layers() {
        let decoded = disassemble(1, &tcp_capture());
        assert_eq!(decoded.keys().collect::<Vec<_>>(), vec!["ethernet", "ip", "tcp"]);

        let ip = decoded.ipv4().unwrap();
        assert_eq!(ip.src, Ipv4Addr::new(192, 168, 1, 10));
        assert_eq!(ip.protocol, IP_PROTOCOL_TCP);
        assert_eq!(decoded.tcp().unwrap().dst_port, 443);
        assert_eq!(decoded.ethernet().unwrap().ether_type, ETHER_TYPE_IPV4);
    }

    #[test]
    fn esp_stops_after_ip() {
        let bytes = CaptureBuilder::new().ipv4(IP_PROTOCOL_ESP).payload(&[0xFF; 24]).finish();
        let decoded = disassemble(1, &bytes);
        assert!(decoded.contains("ethernet"));
        assert!(decoded.contains("ip"));
        assert!(!decoded.contains("tcp"));
        assert!(!decoded.contains("udp"));
        assert!(!decoded.contains("icmp"));
    }

    #[test]
    fn udp_and_icmp() {
        let bytes = CaptureBuilder::new().ipv4(IP_PROTOCOL_UDP).udp(5353, 53).finish();
        assert_eq!(disassemble(1, &bytes).udp().unwrap().dst_port, 53);

        let bytes = CaptureBuilder::new().ipv4(IP_PROTOCOL_ICMP).payload(&[8, 0, 0, 0]).finish();
        let decoded = disassemble(1, &bytes);
        assert_eq!(decoded.icmp().unwrap().icmp_type, 8);
    }

    #[test]
    fn short_capture_is_empty_not_error() {
        let mut decoded = DecodedHeader::default();
        decoded.decode_from(1, &tcp_capture()[..13]).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn ipv6_is_reported_as_not_implemented() {
        let bytes = CaptureBuilder::new().ether_type(ETHER_TYPE_IPV6).payload(&[0x60; 40]).finish();
        let mut decoded = DecodedHeader::default();
        let err = decoded.decode_from(1, &bytes).unwrap_err();
        assert!(matches!(err, SflowError::NotImplemented { .. }));
        assert_eq!(decoded.keys().collect::<Vec<_>>(), vec!["ethernet"]);

        let err = DecodedHeader::default().decode_from(12, &[0x60; 40]).unwrap_err();
        assert!(matches!(err, SflowError::NotImplemented { .. }));
    }

    #[test]
    fn unknown_ether_type_has_no_network_layer() {
        let bytes = CaptureBuilder::new().ether_type(0x0806).payload(&[0; 28]).finish();
        let decoded = disassemble(1, &bytes);
        assert_eq!(decoded.len(), 1);
        assert!(decoded.ipv4().is_none());
    }

    #[test]
    fn ipv4_framed_capture_starts_at_network_layer() {
        let bytes = tcp_capture()[MINIMUM_ETHERNET_HEADER_SIZE..].to_vec();
        let decoded = disassemble(11, &bytes);
        assert_eq!(decoded.keys().collect::<Vec<_>>(), vec!["ip", "tcp"]);
    }

    #[test]
    fn ipv4_options_are_skipped() {
        let bytes = CaptureBuilder::new()
            .ipv4_with_options(IP_PROTOCOL_UDP, &[1, 1, 1, 0])
            .udp(1000, 2000)
            .finish();
        let decoded = disassemble(1, &bytes);
        assert_eq!(decoded.ipv4().unwrap().header_len(), 24);
        assert_eq!(decoded.udp().unwrap().src_port, 1000);
    }

    #[test]
    fn truncated_transport_keeps_earlier_layers() {
        let mut bytes = tcp_capture();
        bytes.truncate(bytes.len() - 4);

        let mut decoded = DecodedHeader::default();
        let err = decoded.decode_from(1, &bytes).unwrap_err();
        assert!(matches!(err, SflowError::Truncated { .. }));
        assert!(decoded.contains("ip"));
        assert!(!decoded.contains("tcp"));
        assert_eq!(disassemble(1, &bytes).len(), 2);
    }

    #[test]
    fn serializes_as_layer_map() {
        let decoded = disassemble(1, &tcp_capture());
        let yaml = serde_yaml_ng::to_string(&decoded).unwrap();
        assert!(yaml.contains("ethernet:"));
        assert!(yaml.contains("dst_port: 443"));
    }
}
