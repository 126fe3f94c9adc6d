//! Extended router data: next hop and prefix mask lengths.

use serde::Serialize;
use std::net::{IpAddr, Ipv4Addr};

use super::TypedRecord;
use crate::Result;
use crate::types::{AddressType, AddressWidth, FieldRef, FieldSpec, Fields, Schema};

static EXTENDED_ROUTER: Schema = Schema::new(
    "ExtendedRouterFlow",
    &[
        FieldSpec::u32("next_hop_type"),
        FieldSpec::address("next_hop", AddressWidth::Lookup(FieldRef(0))),
        FieldSpec::u32("src_mask_len"),
        FieldSpec::u32("dst_mask_len"),
    ],
);

/// The wire address type is taken from the family of `next_hop`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExtendedRouterFlow {
    pub next_hop: IpAddr,
    pub src_mask_len: u32,
    pub dst_mask_len: u32,
}

impl Default for ExtendedRouterFlow {
    fn default() -> Self {
        Self { next_hop: IpAddr::V4(Ipv4Addr::UNSPECIFIED), src_mask_len: 0, dst_mask_len: 0 }
    }
}

impl TypedRecord for ExtendedRouterFlow {
    const TYPE_CODE: u32 = 1002;

    fn schema() -> &'static Schema {
        &EXTENDED_ROUTER
    }

    fn from_fields(fields: Fields) -> Result<Self> {
        Ok(Self {
            next_hop: fields.address(FieldRef(1))?,
            src_mask_len: fields.u32(FieldRef(2))?,
            dst_mask_len: fields.u32(FieldRef(3))?,
        })
    }

    fn to_fields(&self) -> Fields {
        Fields::new(&EXTENDED_ROUTER)
            .with(AddressType::of(&self.next_hop).code())
            .with(self.next_hop)
            .with(self.src_mask_len)
            .with(self.dst_mask_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::WireBuilder;
    use crate::{DecoderLimits, SflowError};

    #[test]
    fn ipv6_next_hop_size() {
        let flow = ExtendedRouterFlow {
            next_hop: "2001:db8::1".parse().unwrap(),
            src_mask_len: 48,
            dst_mask_len: 64,
        };
        assert_eq!(flow.encoded_len().unwrap(), 28);

        let framed = flow.encode().unwrap();
        assert_eq!(framed.len(), 8 + 28);
        let decoded = ExtendedRouterFlow::decode(&mut &framed[8..], &DecoderLimits::DEFAULT).unwrap();
        assert_eq!(decoded, flow);
    }

    #[test]
    fn ipv4_next_hop_round_trip() {
        let flow = ExtendedRouterFlow {
            next_hop: IpAddr::V4(Ipv4Addr::new(172, 16, 0, 1)),
            src_mask_len: 16,
            dst_mask_len: 24,
        };
        assert_eq!(flow.encoded_len().unwrap(), 16);

        let framed = flow.encode().unwrap();
        assert_eq!(&framed[8..12], &[0, 0, 0, 1]);
        let decoded = ExtendedRouterFlow::decode(&mut &framed[8..], &DecoderLimits::DEFAULT).unwrap();
        assert_eq!(decoded, flow);
    }

    #[test]
    fn unknown_next_hop_type_is_rejected() {
        let body = WireBuilder::new().u32(3).bytes(&[0; 16]).u32(0).u32(0).finish();
        let err = ExtendedRouterFlow::decode(&mut &body[..], &DecoderLimits::DEFAULT).unwrap_err();
        assert!(matches!(err, SflowError::InvalidDiscriminant { value: 3, .. }));
    }
}
