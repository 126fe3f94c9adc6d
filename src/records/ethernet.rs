//! Ethernet frame statistics (dot3Stats counters)

use serde::Serialize;

use super::TypedRecord;
use crate::Result;
use crate::types::{FieldRef, FieldSpec, Fields, Schema};

static ETHERNET_FRAME: Schema = Schema::new(
    "EthernetFrameFlow",
    &[
        FieldSpec::u32("alignment_errors"),
        FieldSpec::u32("fcs_errors"),
        FieldSpec::u32("single_collision_frames"),
        FieldSpec::u32("multiple_collision_frames"),
        FieldSpec::u32("sqe_test_errors"),
        FieldSpec::u32("deferred_transmissions"),
        FieldSpec::u32("late_collisions"),
        FieldSpec::u32("excessive_collisions"),
        FieldSpec::u32("internal_mac_transmit_errors"),
        FieldSpec::u32("carrier_sense_errors"),
        FieldSpec::u32("frame_too_longs"),
        FieldSpec::u32("internal_mac_receive_errors"),
        FieldSpec::u32("symbol_errors"),
    ],
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct EthernetFrameFlow {
    pub alignment_errors: u32,
    pub fcs_errors: u32,
    pub single_collision_frames: u32,
    pub multiple_collision_frames: u32,
    pub sqe_test_errors: u32,
    pub deferred_transmissions: u32,
    pub late_collisions: u32,
    pub excessive_collisions: u32,
    pub internal_mac_transmit_errors: u32,
    pub carrier_sense_errors: u32,
    pub frame_too_longs: u32,
    pub internal_mac_receive_errors: u32,
    pub symbol_errors: u32,
}

impl EthernetFrameFlow {
    fn counters(&self) -> [u32; 13] {
        [
            self.alignment_errors,
            self.fcs_errors,
            self.single_collision_frames,
            self.multiple_collision_frames,
            self.sqe_test_errors,
            self.deferred_transmissions,
            self.late_collisions,
            self.excessive_collisions,
            self.internal_mac_transmit_errors,
            self.carrier_sense_errors,
            self.frame_too_longs,
            self.internal_mac_receive_errors,
            self.symbol_errors,
        ]
    }
}

impl TypedRecord for EthernetFrameFlow {
    const TYPE_CODE: u32 = 2;

    fn schema() -> &'static Schema {
        &ETHERNET_FRAME
    }

    fn from_fields(fields: Fields) -> Result<Self> {
        let at = |i| fields.u32(FieldRef(i));
        Ok(Self {
            alignment_errors: at(0)?,
            fcs_errors: at(1)?,
            single_collision_frames: at(2)?,
            multiple_collision_frames: at(3)?,
            sqe_test_errors: at(4)?,
            deferred_transmissions: at(5)?,
            late_collisions: at(6)?,
            excessive_collisions: at(7)?,
            internal_mac_transmit_errors: at(8)?,
            carrier_sense_errors: at(9)?,
            frame_too_longs: at(10)?,
            internal_mac_receive_errors: at(11)?,
            symbol_errors: at(12)?,
        })
    }

    fn to_fields(&self) -> Fields {
        self.counters().into_iter().fold(Fields::new(&ETHERNET_FRAME), Fields::with)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DecoderLimits;

    #[test]
    fn counters_keep_their_order() {
        let flow = EthernetFrameFlow {
            alignment_errors: 1,
            fcs_errors: 2,
            late_collisions: 7,
            symbol_errors: 13,
            ..Default::default()
        };

        let framed = flow.encode().unwrap();
        assert_eq!(framed.len(), 8 + 13 * 4);
        assert_eq!(&framed[8..12], &[0, 0, 0, 1]);
        assert_eq!(&framed[framed.len() - 4..], &[0, 0, 0, 13]);

        let decoded = EthernetFrameFlow::decode(&mut &framed[8..], &DecoderLimits::DEFAULT).unwrap();
        assert_eq!(decoded, flow);
    }
}
