//! Raw packet header record
//!
//! Carries the first bytes of the sampled packet. The captured header is
//! bounded by the configured maximum header length and, once decoded, is
//! disassembled into a [`DecodedHeader`].

use serde::Serialize;

use super::TypedRecord;
use crate::Result;
use crate::disassembler::{DecodedHeader, disassemble};
use crate::types::{FieldKind, FieldRef, FieldSpec, Fields, LengthBound, Schema, Value, wire_len};

static RAW_PACKET: Schema = Schema::new(
    "RawPacketFlow",
    &[
        FieldSpec::u32("protocol"),
        FieldSpec::u32("frame_length"),
        FieldSpec::u32("stripped"),
        FieldSpec::u32("header_size"),
        FieldSpec::new("header", FieldKind::Opaque { len: FieldRef(3), bound: LengthBound::Header }),
        FieldSpec::derived("decoded_header"),
    ],
);

/// Framing of the captured header bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HeaderProtocol {
    Ethernet = 1,
    Ipv4 = 11,
    Ipv6 = 12,
}

impl HeaderProtocol {
    pub const fn code(self) -> u32 {
        self as u32
    }

    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(HeaderProtocol::Ethernet),
            11 => Some(HeaderProtocol::Ipv4),
            12 => Some(HeaderProtocol::Ipv6),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawPacketFlow {
    /// Header protocol code, see [`HeaderProtocol`]
    pub protocol: u32,
    /// Original length of the packet before sampling
    pub frame_length: u32,
    /// Bytes removed from the packet before the header was captured
    pub stripped: u32,
    pub header: Vec<u8>,
    /// Populated after decode
    pub decoded_header: DecodedHeader,
}

impl RawPacketFlow {
    /// Encoding fails when `header` is longer than [`crate::MAXIMUM_HEADER_LENGTH`].
    pub fn new(protocol: u32, frame_length: u32, stripped: u32, header: Vec<u8>) -> Self {
        Self { protocol, frame_length, stripped, header, decoded_header: DecodedHeader::default() }
    }

    /// Captured header length as carried on the wire.
    pub fn header_size(&self) -> u32 {
        wire_len(self.header.len())
    }
}

impl TypedRecord for RawPacketFlow {
    const TYPE_CODE: u32 = 1;

    fn schema() -> &'static Schema {
        &RAW_PACKET
    }

    fn from_fields(mut fields: Fields) -> Result<Self> {
        Ok(Self::new(
            fields.u32(FieldRef(0))?,
            fields.u32(FieldRef(1))?,
            fields.u32(FieldRef(2))?,
            fields.take_bytes(FieldRef(4))?,
        ))
    }

    fn to_fields(&self) -> Fields {
        Fields::new(&RAW_PACKET)
            .with(self.protocol)
            .with(self.frame_length)
            .with(self.stripped)
            .with(self.header_size())
            .with(self.header.clone())
            .with(Value::Derived)
    }

    fn post_decode(mut self) -> Self {
        self.decoded_header = disassemble(self.protocol, &self.header);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{WireBuilder, tcp_capture};
    use crate::{DecoderLimits, MAXIMUM_HEADER_LENGTH, SflowError};

    fn body(header_size: u32, header: &[u8]) -> Vec<u8> {
        WireBuilder::new().u32(1).u32(1518).u32(4).u32(header_size).bytes(header).pad().finish()
    }

    #[test]
    fn header_is_trimmed_and_disassembled() {
        let capture = tcp_capture();
        assert_eq!(capture.len() % 4, 2);

        let wire = body(capture.len() as u32, &capture);
        assert_eq!(wire.len(), 16 + capture.len() + 2);

        let mut cursor = &wire[..];
        let flow = RawPacketFlow::decode(&mut cursor, &DecoderLimits::DEFAULT).unwrap();
        assert!(cursor.is_empty());
        assert_eq!(flow.header, capture);
        assert_eq!(flow.frame_length, 1518);
        assert_eq!(flow.stripped, 4);
        assert!(flow.decoded_header.contains("tcp"));
    }

    #[test]
    fn header_at_bound_is_accepted() {
        let header = vec![0u8; MAXIMUM_HEADER_LENGTH as usize];
        let wire = body(MAXIMUM_HEADER_LENGTH, &header);
        let flow = RawPacketFlow::decode(&mut &wire[..], &DecoderLimits::DEFAULT).unwrap();
        assert_eq!(flow.header_size(), MAXIMUM_HEADER_LENGTH);
    }

    #[test]
    fn header_over_bound_is_rejected() {
        let header = vec![0u8; MAXIMUM_HEADER_LENGTH as usize + 1];
        let wire = body(MAXIMUM_HEADER_LENGTH + 1, &header);
        let err = RawPacketFlow::decode(&mut &wire[..], &DecoderLimits::DEFAULT).unwrap_err();
        assert!(matches!(err, SflowError::SizeGuard { declared: 1501, max: 1500, .. }));
    }

    #[test]
    fn header_over_bound_is_not_encoded() {
        let flow = RawPacketFlow::new(1, 2000, 0, vec![0u8; MAXIMUM_HEADER_LENGTH as usize + 1]);
        let err = flow.encode().unwrap_err();
        assert!(matches!(err, SflowError::InvalidField { ref field, .. } if field == "header"));

        let at_bound = RawPacketFlow::new(1, 2000, 0, vec![0u8; MAXIMUM_HEADER_LENGTH as usize]);
        let framed = at_bound.encode().unwrap();
        let decoded = RawPacketFlow::decode(&mut &framed[8..], &DecoderLimits::DEFAULT).unwrap();
        assert_eq!(decoded.header_size(), MAXIMUM_HEADER_LENGTH);
    }

    #[test]
    fn stricter_limits_apply() {
        let limits = DecoderLimits { max_header_length: 64, ..DecoderLimits::DEFAULT };
        let wire = body(128, &[0u8; 128]);
        assert!(RawPacketFlow::decode(&mut &wire[..], &limits).is_err());
    }

    #[test]
    fn round_trip_keeps_decoded_header() {
        let flow = RawPacketFlow::new(HeaderProtocol::Ethernet.code(), 64, 0, tcp_capture()).post_decode();
        let framed = flow.encode().unwrap();
        assert_eq!(framed.len(), 8 + 16 + 56);

        let decoded = RawPacketFlow::decode(&mut &framed[8..], &DecoderLimits::DEFAULT).unwrap();
        assert_eq!(decoded, flow);
    }

    #[test]
    fn empty_header_round_trip() {
        let flow = RawPacketFlow::new(HeaderProtocol::Ethernet.code(), 0, 0, Vec::new());
        let framed = flow.encode().unwrap();
        assert_eq!(framed.len(), 8 + 16);

        let decoded = RawPacketFlow::decode(&mut &framed[8..], &DecoderLimits::DEFAULT).unwrap();
        assert_eq!(decoded, flow);
        assert!(decoded.decoded_header.is_empty());
    }

    #[test]
    fn ipv6_header_still_decodes_record() {
        let wire = WireBuilder::new().u32(12).u32(80).u32(0).u32(40).bytes(&[0x60; 40]).finish();
        let flow = RawPacketFlow::decode(&mut &wire[..], &DecoderLimits::DEFAULT).unwrap();
        assert!(flow.decoded_header.is_empty());
        assert_eq!(flow.header.len(), 40);
    }
}
