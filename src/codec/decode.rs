//! Generic decode engine
//!
//! Walks a [`Schema`] in declared order and reads each field from the
//! cursor. All multi-byte values are big-endian. Length and address-type
//! selectors are read from sibling fields decoded earlier in the same record.

use std::io::Read;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use tracing::trace;

use super::{padded_len, resolve_address_type};
use crate::types::{AddressType, FieldKind, FieldSpec, Fields, Scalar, Schema, Value};
use crate::{DecoderLimits, Result, SflowError};

/// Decode one record laid out by `schema`.
///
/// A short read anywhere in the record fails the whole record. Every length
/// taken from the wire is checked against `limits` before the buffer it
/// sizes is allocated.
pub fn decode_fields<R: Read + ?Sized>(
    reader: &mut R,
    schema: &'static Schema,
    limits: &DecoderLimits,
) -> Result<Fields> {
    let mut fields = Fields::new(schema);

    for spec in schema.fields {
        let value = decode_field(reader, spec, &fields, limits)?;
        fields.push(value);
    }

    trace!(schema = schema.name, fields = fields.len(), "Decoded record fields");
    Ok(fields)
}

fn decode_field<R: Read + ?Sized>(
    reader: &mut R,
    spec: &FieldSpec,
    decoded: &Fields,
    limits: &DecoderLimits,
) -> Result<Value> {
    match spec.kind {
        FieldKind::Scalar(scalar) => read_scalar(reader, scalar, spec.name),
        FieldKind::FixedBytes(size) => read_vec(reader, size, spec.name).map(Value::Bytes),
        FieldKind::Address(width) => {
            let address_type = resolve_address_type(width, decoded)?;
            read_address(reader, address_type, spec.name).map(Value::Address)
        }
        FieldKind::Opaque { len, bound } => {
            let declared = decoded.scalar(len)?;
            let max = u64::from(limits.bound(bound));
            if declared > max {
                return Err(SflowError::size_guard(spec.name, declared, max));
            }

            // Bounded by a u32 limit above
            let declared = declared as usize;
            if declared == 0 {
                return Ok(Value::Bytes(Vec::new()));
            }

            // The padded region is consumed, the value keeps the declared length
            let mut data = read_vec(reader, padded_len(declared), spec.name)?;
            data.truncate(declared);
            Ok(Value::Bytes(data))
        }
        FieldKind::Words { len } => {
            let count = decoded.scalar(len)?;
            check_count(spec.name, count, 4, limits)?;

            // 32-bit elements are always 4-byte aligned, so no padding follows
            let mut words = Vec::with_capacity(count as usize);
            for _ in 0..count {
                words.push(read_u32(reader, spec.name)?);
            }
            Ok(Value::Words(words))
        }
        FieldKind::Records { len, schema } => {
            let count = decoded.scalar(len)?;
            check_count(spec.name, count, schema.min_wire_size().max(1) as u64, limits)?;

            let mut records = Vec::with_capacity(count as usize);
            for _ in 0..count {
                records.push(decode_fields(reader, schema, limits)?);
            }
            Ok(Value::Records(records))
        }
        FieldKind::Nested(schema) => decode_fields(reader, schema, limits).map(Value::Record),
        FieldKind::Derived => Ok(Value::Derived),
    }
}

/// Reject element counts whose minimal wire size already exceeds a record.
fn check_count(context: &str, count: u64, element_size: u64, limits: &DecoderLimits) -> Result<()> {
    let max = u64::from(limits.max_record_length);
    let declared = count.saturating_mul(element_size);
    if declared > max {
        return Err(SflowError::size_guard(context, declared, max));
    }
    Ok(())
}

fn read_scalar<R: Read + ?Sized>(reader: &mut R, scalar: Scalar, context: &str) -> Result<Value> {
    Ok(match scalar {
        Scalar::U8 => Value::U8(read_u8(reader, context)?),
        Scalar::U16 => Value::U16(read_u16(reader, context)?),
        Scalar::U32 => Value::U32(read_u32(reader, context)?),
        Scalar::U64 => Value::U64(read_u64(reader, context)?),
    })
}

fn read_address<R: Read + ?Sized>(
    reader: &mut R,
    address_type: AddressType,
    context: &str,
) -> Result<IpAddr> {
    Ok(match address_type {
        AddressType::Ipv4 => IpAddr::V4(Ipv4Addr::from(read_array::<4, R>(reader, context)?)),
        AddressType::Ipv6 => IpAddr::V6(Ipv6Addr::from(read_array::<16, R>(reader, context)?)),
    })
}

/// Read exactly `N` bytes.
pub(crate) fn read_array<const N: usize, R: Read + ?Sized>(
    reader: &mut R,
    context: &str,
) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    reader.read_exact(&mut buf).map_err(|e| SflowError::from_read(e, context, N))?;
    Ok(buf)
}

/// Read exactly `len` bytes into a new buffer. Callers bound `len` first.
fn read_vec<R: Read + ?Sized>(reader: &mut R, len: usize, context: &str) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).map_err(|e| SflowError::from_read(e, context, len))?;
    Ok(buf)
}

fn read_u8<R: Read + ?Sized>(reader: &mut R, context: &str) -> Result<u8> {
    read_array::<1, R>(reader, context).map(|b| b[0])
}

fn read_u16<R: Read + ?Sized>(reader: &mut R, context: &str) -> Result<u16> {
    read_array::<2, R>(reader, context).map(u16::from_be_bytes)
}

pub(crate) fn read_u32<R: Read + ?Sized>(reader: &mut R, context: &str) -> Result<u32> {
    read_array::<4, R>(reader, context).map(u32::from_be_bytes)
}

fn read_u64<R: Read + ?Sized>(reader: &mut R, context: &str) -> Result<u64> {
    read_array::<8, R>(reader, context).map(u64::from_be_bytes)
}
