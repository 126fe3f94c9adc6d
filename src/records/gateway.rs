//! Extended gateway data: BGP next hop, AS numbers, AS path and communities.
//!
//! The destination AS and destination peer AS are never carried on the wire.
//! They are derived from the ordered segments of the AS path once the record
//! has been decoded.

use serde::Serialize;
use std::net::{IpAddr, Ipv4Addr};

use super::TypedRecord;
use crate::Result;
use crate::types::{
    AddressType, AddressWidth, FieldRef, FieldSpec, Fields, Schema, Value, wire_len,
};

static AS_PATH_SEGMENT: Schema = Schema::new(
    "AsPathSegment",
    &[
        FieldSpec::u32("segment_type"),
        FieldSpec::u32("segment_len"),
        FieldSpec::words("asns", FieldRef(1)),
    ],
);

static EXTENDED_GATEWAY: Schema = Schema::new(
    "ExtendedGatewayFlow",
    &[
        FieldSpec::u32("next_hop_type"),
        FieldSpec::address("next_hop", AddressWidth::Lookup(FieldRef(0))),
        FieldSpec::u32("as"),
        FieldSpec::u32("src_as"),
        FieldSpec::u32("src_peer_as"),
        FieldSpec::derived("dst_as"),
        FieldSpec::derived("dst_peer_as"),
        FieldSpec::u32("as_path_len"),
        FieldSpec::records("as_path", FieldRef(7), &AS_PATH_SEGMENT),
        FieldSpec::u32("communities_len"),
        FieldSpec::words("communities", FieldRef(9)),
        FieldSpec::u32("local_pref"),
    ],
);

/// BGP AS path segment kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AsPathSegmentType {
    /// AS_SET
    Unordered = 1,
    /// AS_SEQUENCE
    Ordered = 2,
}

impl AsPathSegmentType {
    pub const fn code(self) -> u32 {
        self as u32
    }

    pub const fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(AsPathSegmentType::Unordered),
            2 => Some(AsPathSegmentType::Ordered),
            _ => None,
        }
    }
}

/// One AS path segment. Unknown segment types are kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AsPathSegment {
    pub segment_type: u32,
    pub asns: Vec<u32>,
}

impl AsPathSegment {
    pub fn ordered(asns: Vec<u32>) -> Self {
        Self { segment_type: AsPathSegmentType::Ordered.code(), asns }
    }

    pub fn unordered(asns: Vec<u32>) -> Self {
        Self { segment_type: AsPathSegmentType::Unordered.code(), asns }
    }

    pub fn kind(&self) -> Option<AsPathSegmentType> {
        AsPathSegmentType::from_code(self.segment_type)
    }

    fn from_fields(mut fields: Fields) -> Result<Self> {
        Ok(Self { segment_type: fields.u32(FieldRef(0))?, asns: fields.take_words(FieldRef(2))? })
    }

    fn to_fields(&self) -> Fields {
        Fields::new(&AS_PATH_SEGMENT)
            .with(self.segment_type)
            .with(wire_len(self.asns.len()))
            .with(self.asns.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtendedGatewayFlow {
    pub next_hop: IpAddr,
    /// AS of this router
    pub as_number: u32,
    pub src_as: u32,
    pub src_peer_as: u32,
    /// Derived from the AS path
    pub dst_as: u32,
    /// Derived from the AS path
    pub dst_peer_as: u32,
    pub as_path: Vec<AsPathSegment>,
    pub communities: Vec<u32>,
    pub local_pref: u32,
}

impl Default for ExtendedGatewayFlow {
    fn default() -> Self {
        Self {
            next_hop: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            as_number: 0,
            src_as: 0,
            src_peer_as: 0,
            dst_as: 0,
            dst_peer_as: 0,
            as_path: Vec::new(),
            communities: Vec::new(),
            local_pref: 0,
        }
    }
}

impl ExtendedGatewayFlow {
    /// Body size computed from the in-memory collections.
    pub fn body_len(&self) -> usize {
        let next_hop = AddressType::of(&self.next_hop).width();
        let as_path: usize = self.as_path.iter().map(|segment| 8 + 4 * segment.asns.len()).sum();

        4 + next_hop + 12 + 4 + as_path + 4 + 4 * self.communities.len() + 4
    }
}

impl TypedRecord for ExtendedGatewayFlow {
    const TYPE_CODE: u32 = 1003;

    fn schema() -> &'static Schema {
        &EXTENDED_GATEWAY
    }

    fn from_fields(mut fields: Fields) -> Result<Self> {
        let as_path = fields
            .take_records(FieldRef(8))?
            .into_iter()
            .map(AsPathSegment::from_fields)
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            next_hop: fields.address(FieldRef(1))?,
            as_number: fields.u32(FieldRef(2))?,
            src_as: fields.u32(FieldRef(3))?,
            src_peer_as: fields.u32(FieldRef(4))?,
            dst_as: 0,
            dst_peer_as: 0,
            as_path,
            communities: fields.take_words(FieldRef(10))?,
            local_pref: fields.u32(FieldRef(11))?,
        })
    }

    fn to_fields(&self) -> Fields {
        Fields::new(&EXTENDED_GATEWAY)
            .with(AddressType::of(&self.next_hop).code())
            .with(self.next_hop)
            .with(self.as_number)
            .with(self.src_as)
            .with(self.src_peer_as)
            .with(Value::Derived)
            .with(Value::Derived)
            .with(wire_len(self.as_path.len()))
            .with(self.as_path.iter().map(AsPathSegment::to_fields).collect::<Vec<_>>())
            .with(wire_len(self.communities.len()))
            .with(self.communities.clone())
            .with(self.local_pref)
    }

    /// The last non-empty ordered segment wins.
    fn post_decode(mut self) -> Self {
        for segment in &self.as_path {
            if segment.kind() != Some(AsPathSegmentType::Ordered) {
                continue;
            }
            if let (Some(first), Some(last)) = (segment.asns.first(), segment.asns.last()) {
                self.dst_as = *last;
                self.dst_peer_as = *first;
            }
        }
        self
    }
}
