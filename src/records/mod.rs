//! Record catalog
//!
//! Every supported flow and counter record is a plain struct backed by a
//! static [`Schema`]. The [`TypedRecord`] trait converts between the struct
//! and the generic [`Fields`] the codec works with, and [`Record`] is the
//! closed set of variants a sample can hold.

mod ethernet;
mod gateway;
mod host;
mod http;
mod raw_packet;
mod router;
mod socket;
mod switch;

pub use ethernet::EthernetFrameFlow;
pub use gateway::{AsPathSegment, AsPathSegmentType, ExtendedGatewayFlow};
pub use host::HostDescriptionCounter;
pub use http::{HttpCounter, HttpMethod, HttpRequestFlow};
pub use raw_packet::{HeaderProtocol, RawPacketFlow};
pub use router::ExtendedRouterFlow;
pub use socket::{
    ExtendedProxySocketIpv4Flow, ExtendedProxySocketIpv6Flow, ExtendedSocketIpv4Flow,
    ExtendedSocketIpv6Flow,
};
pub use switch::ExtendedSwitchFlow;

use serde::Serialize;
use std::io::Read;

use crate::codec::{self, decode_fields, frame_record};
use crate::types::{Fields, Schema};
use crate::{DecoderLimits, Result};

/// Conversion between a typed record and its schema-driven field list.
pub trait TypedRecord: Sized + Into<Record> {
    /// Wire type code of the record.
    const TYPE_CODE: u32;

    fn schema() -> &'static Schema;

    /// Build the record from freshly decoded fields.
    fn from_fields(fields: Fields) -> Result<Self>;

    /// Field list for encoding. Length fields are taken from the collections
    /// they describe.
    fn to_fields(&self) -> Fields;

    /// Compute derived fields once the wire fields are in place.
    fn post_decode(self) -> Self {
        self
    }

    /// Decode the record body (everything after the type and length words).
    fn decode<R: Read + ?Sized>(reader: &mut R, limits: &DecoderLimits) -> Result<Self> {
        let fields = decode_fields(reader, Self::schema(), limits)?;
        Ok(Self::from_fields(fields)?.post_decode())
    }

    /// Byte length of the encoded body.
    fn encoded_len(&self) -> Result<usize> {
        codec::encoded_len(&self.to_fields())
    }

    /// Encode the record with its type and length prefix.
    fn encode(&self) -> Result<Vec<u8>> {
        frame_record(Self::TYPE_CODE, &self.to_fields())
    }
}

/// Decode function stored in the registry for each record type.
pub(crate) fn decode_as<T: TypedRecord>(reader: &mut dyn Read, limits: &DecoderLimits) -> Result<Record> {
    T::decode(reader, limits).map(Into::into)
}

/// Any record the codec understands.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "record_type")]
pub enum Record {
    RawPacket(RawPacketFlow),
    EthernetFrame(EthernetFrameFlow),
    ExtendedSwitch(ExtendedSwitchFlow),
    ExtendedRouter(ExtendedRouterFlow),
    ExtendedGateway(ExtendedGatewayFlow),
    ExtendedSocketIpv4(ExtendedSocketIpv4Flow),
    ExtendedSocketIpv6(ExtendedSocketIpv6Flow),
    ExtendedProxySocketIpv4(ExtendedProxySocketIpv4Flow),
    ExtendedProxySocketIpv6(ExtendedProxySocketIpv6Flow),
    HttpRequest(HttpRequestFlow),
    HttpCounter(HttpCounter),
    HostDescription(HostDescriptionCounter),
}

impl Record {
    /// Wire type code of this record.
    pub fn type_code(&self) -> u32 {
        match self {
            Record::RawPacket(_) => RawPacketFlow::TYPE_CODE,
            Record::EthernetFrame(_) => EthernetFrameFlow::TYPE_CODE,
            Record::ExtendedSwitch(_) => ExtendedSwitchFlow::TYPE_CODE,
            Record::ExtendedRouter(_) => ExtendedRouterFlow::TYPE_CODE,
            Record::ExtendedGateway(_) => ExtendedGatewayFlow::TYPE_CODE,
            Record::ExtendedSocketIpv4(_) => ExtendedSocketIpv4Flow::TYPE_CODE,
            Record::ExtendedSocketIpv6(_) => ExtendedSocketIpv6Flow::TYPE_CODE,
            Record::ExtendedProxySocketIpv4(_) => ExtendedProxySocketIpv4Flow::TYPE_CODE,
            Record::ExtendedProxySocketIpv6(_) => ExtendedProxySocketIpv6Flow::TYPE_CODE,
            Record::HttpRequest(_) => HttpRequestFlow::TYPE_CODE,
            Record::HttpCounter(_) => HttpCounter::TYPE_CODE,
            Record::HostDescription(_) => HostDescriptionCounter::TYPE_CODE,
        }
    }

    pub fn schema(&self) -> &'static Schema {
        match self {
            Record::RawPacket(_) => RawPacketFlow::schema(),
            Record::EthernetFrame(_) => EthernetFrameFlow::schema(),
            Record::ExtendedSwitch(_) => ExtendedSwitchFlow::schema(),
            Record::ExtendedRouter(_) => ExtendedRouterFlow::schema(),
            Record::ExtendedGateway(_) => ExtendedGatewayFlow::schema(),
            Record::ExtendedSocketIpv4(_) => ExtendedSocketIpv4Flow::schema(),
            Record::ExtendedSocketIpv6(_) => ExtendedSocketIpv6Flow::schema(),
            Record::ExtendedProxySocketIpv4(_) => ExtendedProxySocketIpv4Flow::schema(),
            Record::ExtendedProxySocketIpv6(_) => ExtendedProxySocketIpv6Flow::schema(),
            Record::HttpRequest(_) => HttpRequestFlow::schema(),
            Record::HttpCounter(_) => HttpCounter::schema(),
            Record::HostDescription(_) => HostDescriptionCounter::schema(),
        }
    }

    /// Human-readable record name.
    pub fn name(&self) -> &'static str {
        self.schema().name
    }

    /// Whether this is a counter record rather than a flow record.
    pub fn is_counter(&self) -> bool {
        matches!(self, Record::HttpCounter(_) | Record::HostDescription(_))
    }

    fn to_fields(&self) -> Fields {
        match self {
            Record::RawPacket(r) => r.to_fields(),
            Record::EthernetFrame(r) => r.to_fields(),
            Record::ExtendedSwitch(r) => r.to_fields(),
            Record::ExtendedRouter(r) => r.to_fields(),
            Record::ExtendedGateway(r) => r.to_fields(),
            Record::ExtendedSocketIpv4(r) => r.to_fields(),
            Record::ExtendedSocketIpv6(r) => r.to_fields(),
            Record::ExtendedProxySocketIpv4(r) => r.to_fields(),
            Record::ExtendedProxySocketIpv6(r) => r.to_fields(),
            Record::HttpRequest(r) => r.to_fields(),
            Record::HttpCounter(r) => r.to_fields(),
            Record::HostDescription(r) => r.to_fields(),
        }
    }

    /// Byte length of the encoded body, excluding the 8-byte framing.
    pub fn encoded_len(&self) -> Result<usize> {
        codec::encoded_len(&self.to_fields())
    }

    /// Encode with type code and length prefix.
    pub fn encode(&self) -> Result<Vec<u8>> {
        frame_record(self.type_code(), &self.to_fields())
    }
}

impl From<RawPacketFlow> for Record {
    fn from(r: RawPacketFlow) -> Self {
        Record::RawPacket(r)
    }
}

impl From<EthernetFrameFlow> for Record {
    fn from(r: EthernetFrameFlow) -> Self {
        Record::EthernetFrame(r)
    }
}

impl From<ExtendedSwitchFlow> for Record {
    fn from(r: ExtendedSwitchFlow) -> Self {
        Record::ExtendedSwitch(r)
    }
}

impl From<ExtendedRouterFlow> for Record {
    fn from(r: ExtendedRouterFlow) -> Self {
        Record::ExtendedRouter(r)
    }
}

impl From<ExtendedGatewayFlow> for Record {
    fn from(r: ExtendedGatewayFlow) -> Self {
        Record::ExtendedGateway(r)
    }
}

impl From<ExtendedSocketIpv4Flow> for Record {
    fn from(r: ExtendedSocketIpv4Flow) -> Self {
        Record::ExtendedSocketIpv4(r)
    }
}

impl From<ExtendedSocketIpv6Flow> for Record {
    fn from(r: ExtendedSocketIpv6Flow) -> Self {
        Record::ExtendedSocketIpv6(r)
    }
}

impl From<ExtendedProxySocketIpv4Flow> for Record {
    fn from(r: ExtendedProxySocketIpv4Flow) -> Self {
        Record::ExtendedProxySocketIpv4(r)
    }
}

impl From<ExtendedProxySocketIpv6Flow> for Record {
    fn from(r: ExtendedProxySocketIpv6Flow) -> Self {
        Record::ExtendedProxySocketIpv6(r)
    }
}

impl From<HttpRequestFlow> for Record {
    fn from(r: HttpRequestFlow) -> Self {
        Record::HttpRequest(r)
    }
}

impl From<HttpCounter> for Record {
    fn from(r: HttpCounter) -> Self {
        Record::HttpCounter(r)
    }
}

impl From<HostDescriptionCounter> for Record {
    fn from(r: HostDescriptionCounter) -> Self {
        Record::HostDescription(r)
    }
}

/// Serialize a byte string as lossy UTF-8 text.
pub(crate) fn serialize_lossy<S: serde::Serializer>(
    bytes: &[u8],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_and_codes() {
        let record = Record::from(ExtendedSwitchFlow::default());
        assert_eq!(record.type_code(), 1001);
        assert_eq!(record.name(), "ExtendedSwitchFlow");
        assert!(!record.is_counter());

        let counter = Record::from(HttpCounter::default());
        assert_eq!(counter.type_code(), 2201);
        assert!(counter.is_counter());
    }

    #[test]
    fn every_schema_validates() {
        let records: Vec<Record> = vec![
            RawPacketFlow::default().into(),
            EthernetFrameFlow::default().into(),
            ExtendedSwitchFlow::default().into(),
            ExtendedRouterFlow::default().into(),
            ExtendedGatewayFlow::default().into(),
            ExtendedSocketIpv4Flow::default().into(),
            ExtendedSocketIpv6Flow::default().into(),
            ExtendedProxySocketIpv4Flow::default().into(),
            ExtendedProxySocketIpv6Flow::default().into(),
            HttpRequestFlow::default().into(),
            HttpCounter::default().into(),
            HostDescriptionCounter::default().into(),
        ];

        for record in &records {
            record.schema().validate().unwrap();
            let framed = record.encode().unwrap();
            assert_eq!(framed.len(), 8 + record.encoded_len().unwrap(), "{}", record.name());
        }
    }
}
