//! Fixed-layout protocol headers recognised inside captured packet bytes.

use serde::{Serialize, Serializer};
use std::fmt;
use std::net::Ipv4Addr;

use crate::codec::decode_fields;
use crate::types::{AddressWidth, FieldRef, FieldSpec, Fields, Schema};
use crate::{DecoderLimits, Result, SflowError};

static ETHERNET: Schema = Schema::new(
    "EthernetHeader",
    &[FieldSpec::bytes("dst_mac", 6), FieldSpec::bytes("src_mac", 6), FieldSpec::u16("ether_type")],
);

static IPV4: Schema = Schema::new(
    "IPv4Header",
    &[
        FieldSpec::u8("version_and_len"),
        FieldSpec::u8("tos"),
        FieldSpec::u16("total_len"),
        FieldSpec::u16("id"),
        FieldSpec::u16("frag_off"),
        FieldSpec::u8("ttl"),
        FieldSpec::u8("protocol"),
        FieldSpec::u16("checksum"),
        FieldSpec::address("src", AddressWidth::V4),
        FieldSpec::address("dst", AddressWidth::V4),
    ],
);

static TCP: Schema = Schema::new(
    "TCPHeader",
    &[
        FieldSpec::u16("src_port"),
        FieldSpec::u16("dst_port"),
        FieldSpec::u32("seq"),
        FieldSpec::u32("ack"),
        FieldSpec::u8("data_offset"),
        FieldSpec::u8("flags"),
        FieldSpec::u16("window"),
        FieldSpec::u16("checksum"),
        FieldSpec::u16("urgent"),
    ],
);

static UDP: Schema = Schema::new(
    "UDPHeader",
    &[
        FieldSpec::u16("src_port"),
        FieldSpec::u16("dst_port"),
        FieldSpec::u16("length"),
        FieldSpec::u16("checksum"),
    ],
);

static ICMP: Schema = Schema::new("ICMPHeader", &[FieldSpec::u8("icmp_type"), FieldSpec::u8("code")]);

/// Layout shared by every header layer.
pub(crate) trait HeaderLayer: Sized {
    fn schema() -> &'static Schema;
    fn from_fields(fields: Fields) -> Result<Self>;

    /// Decode the layer from the front of `cursor`, advancing it.
    fn decode(cursor: &mut &[u8]) -> Result<Self> {
        Self::from_fields(decode_fields(cursor, Self::schema(), &DecoderLimits::DEFAULT)?)
    }
}

/// 48-bit hardware address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    fn from_bytes(field: &str, bytes: Vec<u8>) -> Result<Self> {
        <[u8; 6]>::try_from(bytes.as_slice()).map(MacAddr).map_err(|_| {
            SflowError::invalid_field(field, format!("expected 6 bytes, found {}", bytes.len()))
        })
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl Serialize for MacAddr {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EthernetHeader {
    pub dst_mac: MacAddr,
    pub src_mac: MacAddr,
    pub ether_type: u16,
}

impl HeaderLayer for EthernetHeader {
    fn schema() -> &'static Schema {
        &ETHERNET
    }

    fn from_fields(mut fields: Fields) -> Result<Self> {
        Ok(Self {
            dst_mac: MacAddr::from_bytes("dst_mac", fields.take_bytes(FieldRef(0))?)?,
            src_mac: MacAddr::from_bytes("src_mac", fields.take_bytes(FieldRef(1))?)?,
            ether_type: fields.u16(FieldRef(2))?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ipv4Header {
    pub version_and_len: u8,
    pub tos: u8,
    pub total_len: u16,
    pub id: u16,
    pub frag_off: u16,
    pub ttl: u8,
    pub protocol: u8,
    pub checksum: u16,
    pub src: Ipv4Addr,
    pub dst: Ipv4Addr,
}

impl Ipv4Header {
    /// Fixed part of the header, without options.
    pub const MIN_LEN: usize = 20;

    pub fn version(&self) -> u8 {
        self.version_and_len >> 4
    }

    /// Header length in bytes, options included.
    pub fn header_len(&self) -> usize {
        usize::from(self.version_and_len & 0x0F) * 4
    }
}

impl HeaderLayer for Ipv4Header {
    fn schema() -> &'static Schema {
        &IPV4
    }

    fn from_fields(fields: Fields) -> Result<Self> {
        Ok(Self {
            version_and_len: fields.u8(FieldRef(0))?,
            tos: fields.u8(FieldRef(1))?,
            total_len: fields.u16(FieldRef(2))?,
            id: fields.u16(FieldRef(3))?,
            frag_off: fields.u16(FieldRef(4))?,
            ttl: fields.u8(FieldRef(5))?,
            protocol: fields.u8(FieldRef(6))?,
            checksum: fields.u16(FieldRef(7))?,
            src: fields.ipv4(FieldRef(8))?,
            dst: fields.ipv4(FieldRef(9))?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TcpHeader {
    pub src_port: u16,
    pub dst_port: u16,
    pub seq: u32,
    pub ack: u32,
    pub data_offset: u8,
    pub flags: u8,
    pub window: u16,
    pub checksum: u16,
    pub urgent: u16,
}

impl HeaderLayer for TcpHeader {
    fn schema() -> &'static Schema {
        &TCP
    }

    fn from_fields(fields: Fields) -> Result<Self> {
        Ok(Self {
            src_port: fields.u16(FieldRef(0))?,
            dst_port: fields.u16(FieldRef(1))?,
            seq: fields.u32(FieldRef(2))?,
            ack: fields.u32(FieldRef(3))?,
            data_offset: fields.u8(FieldRef(4))?,
            flags: fields.u8(FieldRef(5))?,
            window: fields.u16(FieldRef(6))?,
            checksum: fields.u16(FieldRef(7))?,
            urgent: fields.u16(FieldRef(8))?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UdpHeader {
    pub src_port: u16,
    pub dst_port: u16,
    pub length: u16,
    pub checksum: u16,
}

impl HeaderLayer for UdpHeader {
    fn schema() -> &'static Schema {
        &UDP
    }

    fn from_fields(fields: Fields) -> Result<Self> {
        Ok(Self {
            src_port: fields.u16(FieldRef(0))?,
            dst_port: fields.u16(FieldRef(1))?,
            length: fields.u16(FieldRef(2))?,
            checksum: fields.u16(FieldRef(3))?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IcmpHeader {
    pub icmp_type: u8,
    pub code: u8,
}

impl HeaderLayer for IcmpHeader {
    fn schema() -> &'static Schema {
        &ICMP
    }

    fn from_fields(fields: Fields) -> Result<Self> {
        Ok(Self { icmp_type: fields.u8(FieldRef(0))?, code: fields.u8(FieldRef(1))? })
    }
}
