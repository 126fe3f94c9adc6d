//! Schema-driven wire codec
//!
//! One decode engine and one encode engine serve every record type. Record
//! layouts live in static [`Schema`](crate::types::Schema) tables; the engines
//! interpret them field by field using sFlow (XDR) big-endian rules:
//!
//! - variable-length byte strings are padded with zeros to a 4-byte boundary
//! - address fields are 4 or 16 bytes, chosen statically or by a sibling selector
//! - derived fields occupy no wire bytes

mod decode;
mod encode;

pub use decode::decode_fields;
pub use encode::{encode_fields, encoded_len, frame_record};

pub(crate) use decode::{read_array, read_u32};

use crate::types::{AddressType, AddressWidth, Fields};
use crate::{Result, SflowError};

/// Length of `len` bytes once padded to the next multiple of four.
pub(crate) const fn padded_len(len: usize) -> usize {
    (len + 3) & !3
}

/// Resolve the address family of an address field.
///
/// Lookup selectors are read from the already-present sibling value; any
/// selector other than 1 or 2 is an invalid discriminant.
pub(crate) fn resolve_address_type(width: AddressWidth, fields: &Fields) -> Result<AddressType> {
    match width {
        AddressWidth::V4 => Ok(AddressType::Ipv4),
        AddressWidth::V6 => Ok(AddressType::Ipv6),
        AddressWidth::Lookup(sibling) => {
            let code = fields.scalar(sibling)?;
            AddressType::from_code(code).ok_or_else(|| SflowError::InvalidDiscriminant {
                field: fields.schema().field_name(sibling).to_string(),
                value: code,
            })
        }
    }
}
