//! Generic encode engine and size calculator
//!
//! Encoding mirrors decoding field by field. Derived fields are skipped,
//! byte strings are zero-padded to 4 bytes, and every length field must agree
//! with the collection it describes. Byte strings longer than the default
//! decoder bound for their field are refused, since no default decoder would
//! accept them back.

use std::net::IpAddr;
use tracing::trace;

use super::{padded_len, resolve_address_type};
use crate::types::{AddressType, FieldKind, FieldRef, FieldSpec, Fields, LengthBound, Scalar, Schema, Value};
use crate::{DecoderLimits, Result, SflowError};

/// Append the wire form of `fields` to `out`.
///
/// On error `out` may hold a partially written record.
pub fn encode_fields(fields: &Fields, out: &mut Vec<u8>) -> Result<()> {
    let schema = fields.schema();
    check_arity(fields)?;

    for (spec, value) in schema.fields.iter().zip(fields.values()) {
        match (spec.kind, value) {
            (FieldKind::Derived, _) => {}
            (FieldKind::Scalar(Scalar::U8), Value::U8(v)) => out.push(*v),
            (FieldKind::Scalar(Scalar::U16), Value::U16(v)) => out.extend_from_slice(&v.to_be_bytes()),
            (FieldKind::Scalar(Scalar::U32), Value::U32(v)) => out.extend_from_slice(&v.to_be_bytes()),
            (FieldKind::Scalar(Scalar::U64), Value::U64(v)) => out.extend_from_slice(&v.to_be_bytes()),
            (FieldKind::FixedBytes(size), Value::Bytes(bytes)) => {
                check_fixed(spec, size, bytes)?;
                out.extend_from_slice(bytes);
            }
            (FieldKind::Address(width), Value::Address(addr)) => {
                let address_type = resolve_address_type(width, fields)?;
                write_address(out, addr, address_type);
            }
            (FieldKind::Opaque { len, bound }, Value::Bytes(bytes)) => {
                check_length(fields, spec, len, bytes.len())?;
                check_bound(spec, bound, bytes.len())?;
                out.extend_from_slice(bytes);
                out.resize(out.len() + padded_len(bytes.len()) - bytes.len(), 0);
            }
            (FieldKind::Words { len }, Value::Words(words)) => {
                check_length(fields, spec, len, words.len())?;
                for word in words {
                    out.extend_from_slice(&word.to_be_bytes());
                }
            }
            (FieldKind::Records { len, schema: child }, Value::Records(records)) => {
                check_length(fields, spec, len, records.len())?;
                for record in records {
                    check_schema(spec, child, record)?;
                    encode_fields(record, out)?;
                }
            }
            (FieldKind::Nested(child), Value::Record(record)) => {
                check_schema(spec, child, record)?;
                encode_fields(record, out)?;
            }
            (_, _) => return Err(shape_mismatch(spec)),
        }
    }

    trace!(schema = schema.name, total = out.len(), "Encoded record fields");
    Ok(())
}

/// Exact number of bytes [`encode_fields`] would write for `fields`.
pub fn encoded_len(fields: &Fields) -> Result<usize> {
    check_arity(fields)?;

    let mut total = 0usize;
    for (spec, value) in fields.schema().fields.iter().zip(fields.values()) {
        total += match (spec.kind, value) {
            (FieldKind::Derived, _) => 0,
            (FieldKind::Scalar(scalar), v) if scalar_matches(scalar, v) => scalar.size(),
            (FieldKind::FixedBytes(size), Value::Bytes(_)) => size,
            (FieldKind::Address(width), Value::Address(_)) => {
                resolve_address_type(width, fields)?.width()
            }
            (FieldKind::Opaque { .. }, Value::Bytes(bytes)) => padded_len(bytes.len()),
            (FieldKind::Words { .. }, Value::Words(words)) => words.len() * 4,
            (FieldKind::Records { .. }, Value::Records(records)) => {
                let mut sum = 0;
                for record in records {
                    sum += encoded_len(record)?;
                }
                sum
            }
            (FieldKind::Nested(_), Value::Record(record)) => encoded_len(record)?,
            (_, _) => return Err(shape_mismatch(spec)),
        };
    }

    Ok(total)
}

/// Encode `fields` behind the `(type_code, length)` framing used for every
/// flow and counter record.
pub fn frame_record(type_code: u32, fields: &Fields) -> Result<Vec<u8>> {
    let length = encoded_len(fields)?;
    let wire_length = u32::try_from(length).map_err(|_| {
        SflowError::invalid_field(fields.schema().name, format!("record body of {length} bytes"))
    })?;

    let mut out = Vec::with_capacity(8 + length);
    out.extend_from_slice(&type_code.to_be_bytes());
    out.extend_from_slice(&wire_length.to_be_bytes());
    encode_fields(fields, &mut out)?;
    Ok(out)
}

fn write_address(out: &mut Vec<u8>, addr: &IpAddr, address_type: AddressType) {
    match (address_type, addr) {
        (AddressType::Ipv4, IpAddr::V4(v4)) => out.extend_from_slice(&v4.octets()),
        // Only the low 32 bits fit
        (AddressType::Ipv4, IpAddr::V6(v6)) => out.extend_from_slice(&v6.octets()[12..]),
        (AddressType::Ipv6, IpAddr::V6(v6)) => out.extend_from_slice(&v6.octets()),
        (AddressType::Ipv6, IpAddr::V4(v4)) => out.extend_from_slice(&v4.to_ipv6_mapped().octets()),
    }
}

fn scalar_matches(scalar: Scalar, value: &Value) -> bool {
    matches!(
        (scalar, value),
        (Scalar::U8, Value::U8(_))
            | (Scalar::U16, Value::U16(_))
            | (Scalar::U32, Value::U32(_))
            | (Scalar::U64, Value::U64(_))
    )
}

fn check_arity(fields: &Fields) -> Result<()> {
    let schema = fields.schema();
    if fields.len() != schema.field_count() {
        return Err(SflowError::invalid_field(
            schema.name,
            format!("expected {} values, found {}", schema.field_count(), fields.len()),
        ));
    }
    Ok(())
}

fn check_fixed(spec: &FieldSpec, size: usize, bytes: &[u8]) -> Result<()> {
    if bytes.len() != size {
        return Err(SflowError::invalid_field(
            spec.name,
            format!("expected {size} bytes, found {}", bytes.len()),
        ));
    }
    Ok(())
}

fn check_length(fields: &Fields, spec: &FieldSpec, len: FieldRef, actual: usize) -> Result<()> {
    let declared = fields.scalar(len)?;
    if declared != actual as u64 {
        return Err(SflowError::invalid_field(
            spec.name,
            format!(
                "{} is {declared} but the value holds {actual} elements",
                fields.schema().field_name(len)
            ),
        ));
    }
    Ok(())
}

fn check_bound(spec: &FieldSpec, bound: LengthBound, actual: usize) -> Result<()> {
    let max = DecoderLimits::DEFAULT.bound(bound);
    if actual as u64 > u64::from(max) {
        return Err(SflowError::invalid_field(
            spec.name,
            format!("{actual} bytes exceed the decoder maximum of {max}"),
        ));
    }
    Ok(())
}

fn check_schema(
    spec: &FieldSpec,
    expected: &'static Schema,
    record: &Fields,
) -> Result<()> {
    if !std::ptr::eq(expected, record.schema()) {
        return Err(SflowError::invalid_field(
            spec.name,
            format!("expected a {} record, found {}", expected.name, record.schema().name),
        ));
    }
    Ok(())
}

fn shape_mismatch(spec: &FieldSpec) -> SflowError {
    SflowError::invalid_field(spec.name, "value does not match the field layout")
}
