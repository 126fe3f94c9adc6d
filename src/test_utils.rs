//! Test utilities for building sFlow wire data
//!
//! These builders produce the byte layouts the decoder consumes, so tests and
//! benchmarks can describe inputs field by field instead of as opaque arrays.

#![cfg(any(test, feature = "benchmark"))]

use std::net::Ipv4Addr;

use crate::records::{
    AsPathSegment, ExtendedGatewayFlow, ExtendedSwitchFlow, RawPacketFlow, Record, TypedRecord,
};
use crate::sample::FlowSample;

/// Big-endian byte builder.
#[derive(Debug, Default, Clone)]
pub struct WireBuilder {
    buf: Vec<u8>,
}

impl WireBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn u8(mut self, value: u8) -> Self {
        self.buf.push(value);
        self
    }

    pub fn u16(mut self, value: u16) -> Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn u32(mut self, value: u32) -> Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn u64(mut self, value: u64) -> Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    pub fn bytes(mut self, bytes: &[u8]) -> Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Zero-fill up to the next 4-byte boundary of the whole buffer.
    pub fn pad(mut self) -> Self {
        while self.buf.len() % 4 != 0 {
            self.buf.push(0);
        }
        self
    }

    /// Append a record with its type and length framing.
    pub fn record(self, type_code: u32, body: &[u8]) -> Self {
        self.u32(type_code).u32(body.len() as u32).bytes(body)
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// Builder for captured Ethernet frames.
#[derive(Debug, Clone)]
pub struct CaptureBuilder {
    ether_type: u16,
    body: Vec<u8>,
}

impl Default for CaptureBuilder {
    fn default() -> Self {
        Self { ether_type: 0x0800, body: Vec::new() }
    }
}

impl CaptureBuilder {
    pub const SRC: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 10);
    pub const DST: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 20);

    pub fn new() -> Self {
        Self::default()
    }

    pub fn ether_type(mut self, ether_type: u16) -> Self {
        self.ether_type = ether_type;
        self
    }

    /// Append a 20-byte IPv4 header.
    pub fn ipv4(self, protocol: u8) -> Self {
        self.ipv4_with_options(protocol, &[])
    }

    /// Append an IPv4 header carrying `options`, whose length must be a
    /// multiple of four.
    pub fn ipv4_with_options(mut self, protocol: u8, options: &[u8]) -> Self {
        let ihl = 5 + (options.len() / 4) as u8;
        self.body.extend_from_slice(&[0x40 | ihl, 0, 0, 60, 0x1c, 0x46, 0x40, 0, 64, protocol, 0, 0]);
        self.body.extend_from_slice(&Self::SRC.octets());
        self.body.extend_from_slice(&Self::DST.octets());
        self.body.extend_from_slice(options);
        self
    }

    /// Append a 20-byte TCP header with the SYN flag set.
    pub fn tcp(mut self, src_port: u16, dst_port: u16) -> Self {
        self.body.extend_from_slice(&src_port.to_be_bytes());
        self.body.extend_from_slice(&dst_port.to_be_bytes());
        self.body.extend_from_slice(&[0, 0, 0, 1, 0, 0, 0, 0, 0x50, 0x02, 0xff, 0xff, 0, 0, 0, 0]);
        self
    }

    /// Append an 8-byte UDP header.
    pub fn udp(mut self, src_port: u16, dst_port: u16) -> Self {
        self.body.extend_from_slice(&src_port.to_be_bytes());
        self.body.extend_from_slice(&dst_port.to_be_bytes());
        self.body.extend_from_slice(&[0, 8, 0, 0]);
        self
    }

    pub fn payload(mut self, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(bytes);
        self
    }

    pub fn finish(self) -> Vec<u8> {
        let mut frame = vec![0x00, 0x1b, 0x21, 0x3c, 0x4d, 0x5e, 0x00, 0x1b, 0x21, 0x01, 0x02, 0x03];
        frame.extend_from_slice(&self.ether_type.to_be_bytes());
        frame.extend_from_slice(&self.body);
        frame
    }
}

/// Ethernet + IPv4 + TCP capture, 54 bytes.
pub fn tcp_capture() -> Vec<u8> {
    CaptureBuilder::new().ipv4(6).tcp(51000, 443).finish()
}

/// A flow sample with a raw packet, switch and gateway record, as a decoder
/// would produce it.
pub fn typical_flow_sample(sequence_number: u32) -> FlowSample {
    let records: Vec<Record> = vec![
        RawPacketFlow::new(1, 1518, 4, tcp_capture()).post_decode().into(),
        ExtendedSwitchFlow { src_vlan: 100, src_priority: 0, dst_vlan: 200, dst_priority: 0 }.into(),
        ExtendedGatewayFlow {
            next_hop: Ipv4Addr::new(10, 0, 0, 254).into(),
            as_number: 64512,
            as_path: vec![AsPathSegment::ordered(vec![64512, 3356, 15169])],
            communities: vec![0xFDE8_0064],
            local_pref: 100,
            ..Default::default()
        }
        .post_decode()
        .into(),
    ];

    FlowSample {
        sequence_number,
        source_id_type: 0,
        source_id_index: 7,
        sampling_rate: 2048,
        sample_pool: sequence_number.wrapping_mul(2048),
        input: 7,
        output: 9,
        declared_records: records.len() as u32,
        records,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pad_aligns_whole_buffer() {
        let wire = WireBuilder::new().u32(3).bytes(b"abc").pad();
        assert_eq!(wire.len(), 8);
        assert_eq!(wire.finish()[4..], *b"abc\0");
    }

    #[test]
    fn tcp_capture_layout() {
        let capture = tcp_capture();
        assert_eq!(capture.len(), 54);
        assert_eq!(&capture[12..14], &[0x08, 0x00]);
        assert_eq!(capture[14], 0x45);
        assert_eq!(capture[23], 6);
    }
}
