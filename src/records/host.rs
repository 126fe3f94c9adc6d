//! Host description counter record

use serde::Serialize;

use super::{TypedRecord, serialize_lossy};
use crate::types::{FieldRef, FieldSpec, Fields, Schema, wire_len};
use crate::{Result, SflowError};

static HOST_DESCRIPTION: Schema = Schema::new(
    "HostDescriptionCounter",
    &[
        FieldSpec::u32("hostname_len"),
        FieldSpec::opaque("hostname", FieldRef(0)),
        FieldSpec::bytes("uuid", 16),
        FieldSpec::u32("machine_type"),
        FieldSpec::u32("os_name"),
        FieldSpec::u32("os_release_len"),
        FieldSpec::opaque("os_release", FieldRef(5)),
    ],
);

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct HostDescriptionCounter {
    #[serde(serialize_with = "serialize_lossy")]
    pub hostname: Vec<u8>,
    pub uuid: [u8; 16],
    pub machine_type: u32,
    pub os_name: u32,
    #[serde(serialize_with = "serialize_lossy")]
    pub os_release: Vec<u8>,
}

impl TypedRecord for HostDescriptionCounter {
    const TYPE_CODE: u32 = 2000;

    fn schema() -> &'static Schema {
        &HOST_DESCRIPTION
    }

    fn from_fields(mut fields: Fields) -> Result<Self> {
        let uuid = fields.take_bytes(FieldRef(2))?;
        let uuid = <[u8; 16]>::try_from(uuid.as_slice()).map_err(|_| {
            SflowError::invalid_field("uuid", format!("expected 16 bytes, found {}", uuid.len()))
        })?;

        Ok(Self {
            hostname: fields.take_bytes(FieldRef(1))?,
            uuid,
            machine_type: fields.u32(FieldRef(3))?,
            os_name: fields.u32(FieldRef(4))?,
            os_release: fields.take_bytes(FieldRef(6))?,
        })
    }

    fn to_fields(&self) -> Fields {
        Fields::new(&HOST_DESCRIPTION)
            .with(wire_len(self.hostname.len()))
            .with(self.hostname.clone())
            .with(self.uuid.to_vec())
            .with(self.machine_type)
            .with(self.os_name)
            .with(wire_len(self.os_release.len()))
            .with(self.os_release.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DecoderLimits;

    #[test]
    fn host_description_round_trip() {
        let host = HostDescriptionCounter {
            hostname: b"edge-01".to_vec(),
            uuid: [0x5A; 16],
            machine_type: 3,
            os_name: 2,
            os_release: b"6.1.0".to_vec(),
        };

        let framed = host.encode().unwrap();
        assert_eq!(framed.len(), 8 + 4 + 8 + 16 + 4 + 4 + 4 + 8);

        let decoded = HostDescriptionCounter::decode(&mut &framed[8..], &DecoderLimits::DEFAULT).unwrap();
        assert_eq!(decoded, host);
    }

    #[test]
    fn serializes_strings_as_text() {
        let host = HostDescriptionCounter { hostname: b"edge-01".to_vec(), ..Default::default() };
        let yaml = serde_yaml_ng::to_string(&host).unwrap();
        assert!(yaml.contains("hostname: edge-01"));
    }
}
