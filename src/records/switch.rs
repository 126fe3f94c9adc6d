//! Extended switch data: VLAN and 802.1p priority on both sides of the switch.

use serde::Serialize;

use super::TypedRecord;
use crate::Result;
use crate::types::{FieldRef, FieldSpec, Fields, Schema};

static EXTENDED_SWITCH: Schema = Schema::new(
    "ExtendedSwitchFlow",
    &[
        FieldSpec::u32("src_vlan"),
        FieldSpec::u32("src_priority"),
        FieldSpec::u32("dst_vlan"),
        FieldSpec::u32("dst_priority"),
    ],
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ExtendedSwitchFlow {
    pub src_vlan: u32,
    pub src_priority: u32,
    pub dst_vlan: u32,
    pub dst_priority: u32,
}

impl TypedRecord for ExtendedSwitchFlow {
    const TYPE_CODE: u32 = 1001;

    fn schema() -> &'static Schema {
        &EXTENDED_SWITCH
    }

    fn from_fields(fields: Fields) -> Result<Self> {
        Ok(Self {
            src_vlan: fields.u32(FieldRef(0))?,
            src_priority: fields.u32(FieldRef(1))?,
            dst_vlan: fields.u32(FieldRef(2))?,
            dst_priority: fields.u32(FieldRef(3))?,
        })
    }

    fn to_fields(&self) -> Fields {
        Fields::new(&EXTENDED_SWITCH)
            .with(self.src_vlan)
            .with(self.src_priority)
            .with(self.dst_vlan)
            .with(self.dst_priority)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DecoderLimits;
    use crate::SflowError;
    use proptest::prelude::*;

    #[test]
    fn encodes_to_sixteen_byte_body() {
        let flow = ExtendedSwitchFlow { src_vlan: 10, src_priority: 1, dst_vlan: 20, dst_priority: 2 };
        assert_eq!(flow.encoded_len().unwrap(), 16);

        let framed = flow.encode().unwrap();
        assert_eq!(&framed[..8], &[0, 0, 0x03, 0xE9, 0, 0, 0, 16]);
        assert_eq!(&framed[8..12], &[0, 0, 0, 10]);
    }

    #[test]
    fn truncated_body_fails() {
        let body = [0u8; 12];
        let err = ExtendedSwitchFlow::decode(&mut &body[..], &DecoderLimits::DEFAULT).unwrap_err();
        assert!(matches!(err, SflowError::Truncated { .. }));
    }

    proptest! {
        #[test]
        fn round_trip(
            src_vlan in any::<u32>(),
            src_priority in any::<u32>(),
            dst_vlan in any::<u32>(),
            dst_priority in any::<u32>()
        ) {
            let flow = ExtendedSwitchFlow { src_vlan, src_priority, dst_vlan, dst_priority };
            let framed = flow.encode().unwrap();
            let decoded = ExtendedSwitchFlow::decode(&mut &framed[8..], &DecoderLimits::DEFAULT).unwrap();
            prop_assert_eq!(decoded, flow);
        }
    }
}
