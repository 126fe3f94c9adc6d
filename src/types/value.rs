//! Runtime field values produced and consumed by the generic codec

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use super::{FieldRef, Schema};
use crate::{Result, SflowError};

/// Value of a single decoded field.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Bytes(Vec<u8>),
    Address(IpAddr),
    Words(Vec<u32>),
    Records(Vec<Fields>),
    Record(Fields),
    /// Placeholder for a field computed after decode
    Derived,
}

impl Value {
    /// Integer value of a scalar, used for length and selector lookups.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::U8(v) => Some(u64::from(*v)),
            Value::U16(v) => Some(u64::from(*v)),
            Value::U32(v) => Some(u64::from(*v)),
            Value::U64(v) => Some(*v),
            _ => None,
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Value::U8(_) => "u8",
            Value::U16(_) => "u16",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::Bytes(_) => "bytes",
            Value::Address(_) => "address",
            Value::Words(_) => "words",
            Value::Records(_) => "records",
            Value::Record(_) => "record",
            Value::Derived => "derived",
        }
    }
}

impl From<u8> for Value {
    fn from(v: u8) -> Self {
        Value::U8(v)
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Value::U16(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::U32(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::U64(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<Vec<u32>> for Value {
    fn from(v: Vec<u32>) -> Self {
        Value::Words(v)
    }
}

impl From<IpAddr> for Value {
    fn from(v: IpAddr) -> Self {
        Value::Address(v)
    }
}

impl From<Ipv4Addr> for Value {
    fn from(v: Ipv4Addr) -> Self {
        Value::Address(IpAddr::V4(v))
    }
}

impl From<Ipv6Addr> for Value {
    fn from(v: Ipv6Addr) -> Self {
        Value::Address(IpAddr::V6(v))
    }
}

impl From<Vec<Fields>> for Value {
    fn from(v: Vec<Fields>) -> Self {
        Value::Records(v)
    }
}

impl From<Fields> for Value {
    fn from(v: Fields) -> Self {
        Value::Record(v)
    }
}

/// Field values of one record, in schema order.
#[derive(Debug, Clone)]
pub struct Fields {
    schema: &'static Schema,
    values: Vec<Value>,
}

impl PartialEq for Fields {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.schema, other.schema) && self.values == other.values
    }
}

impl Fields {
    /// Create an empty value list for `schema`.
    pub fn new(schema: &'static Schema) -> Self {
        Self { schema, values: Vec::with_capacity(schema.field_count()) }
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Append the value of the next field.
    pub fn push(&mut self, value: impl Into<Value>) {
        self.values.push(value.into());
    }

    /// Builder form of [`Fields::push`].
    pub fn with(mut self, value: impl Into<Value>) -> Self {
        self.push(value);
        self
    }

    pub fn get(&self, at: FieldRef) -> Option<&Value> {
        self.values.get(at.index())
    }

    /// Integer value of the scalar at `at`.
    pub fn scalar(&self, at: FieldRef) -> Result<u64> {
        let value = self.value(at)?;
        value.as_u64().ok_or_else(|| self.mismatch(at, "scalar", value))
    }

    pub fn u8(&self, at: FieldRef) -> Result<u8> {
        match self.value(at)? {
            Value::U8(v) => Ok(*v),
            other => Err(self.mismatch(at, "u8", other)),
        }
    }

    pub fn u16(&self, at: FieldRef) -> Result<u16> {
        match self.value(at)? {
            Value::U16(v) => Ok(*v),
            other => Err(self.mismatch(at, "u16", other)),
        }
    }

    pub fn u32(&self, at: FieldRef) -> Result<u32> {
        match self.value(at)? {
            Value::U32(v) => Ok(*v),
            other => Err(self.mismatch(at, "u32", other)),
        }
    }

    pub fn u64(&self, at: FieldRef) -> Result<u64> {
        match self.value(at)? {
            Value::U64(v) => Ok(*v),
            other => Err(self.mismatch(at, "u64", other)),
        }
    }

    pub fn address(&self, at: FieldRef) -> Result<IpAddr> {
        match self.value(at)? {
            Value::Address(addr) => Ok(*addr),
            other => Err(self.mismatch(at, "address", other)),
        }
    }

    pub fn ipv4(&self, at: FieldRef) -> Result<Ipv4Addr> {
        match self.address(at)? {
            IpAddr::V4(addr) => Ok(addr),
            IpAddr::V6(addr) => Err(SflowError::invalid_field(
                self.schema.field_name(at),
                format!("expected an IPv4 address, found {addr}"),
            )),
        }
    }

    pub fn ipv6(&self, at: FieldRef) -> Result<Ipv6Addr> {
        match self.address(at)? {
            IpAddr::V6(addr) => Ok(addr),
            IpAddr::V4(addr) => Err(SflowError::invalid_field(
                self.schema.field_name(at),
                format!("expected an IPv6 address, found {addr}"),
            )),
        }
    }

    /// Move the byte string at `at` out of the list.
    pub fn take_bytes(&mut self, at: FieldRef) -> Result<Vec<u8>> {
        match self.take(at)? {
            Value::Bytes(bytes) => Ok(bytes),
            other => Err(self.mismatch(at, "bytes", &other)),
        }
    }

    pub fn take_words(&mut self, at: FieldRef) -> Result<Vec<u32>> {
        match self.take(at)? {
            Value::Words(words) => Ok(words),
            other => Err(self.mismatch(at, "words", &other)),
        }
    }

    pub fn take_records(&mut self, at: FieldRef) -> Result<Vec<Fields>> {
        match self.take(at)? {
            Value::Records(records) => Ok(records),
            other => Err(self.mismatch(at, "records", &other)),
        }
    }

    pub fn take_record(&mut self, at: FieldRef) -> Result<Fields> {
        match self.take(at)? {
            Value::Record(record) => Ok(record),
            other => Err(self.mismatch(at, "record", &other)),
        }
    }

    fn value(&self, at: FieldRef) -> Result<&Value> {
        self.values.get(at.index()).ok_or_else(|| {
            SflowError::invalid_field(
                self.schema.field_name(at),
                format!("{} has no value at position {}", self.schema.name, at.index()),
            )
        })
    }

    fn take(&mut self, at: FieldRef) -> Result<Value> {
        self.value(at)?;
        Ok(std::mem::replace(&mut self.values[at.index()], Value::Derived))
    }

    fn mismatch(&self, at: FieldRef, expected: &str, found: &Value) -> SflowError {
        SflowError::invalid_field(
            self.schema.field_name(at),
            format!("expected {expected} value, found {}", found.kind_name()),
        )
    }
}

/// Convert a collection length to its 32-bit wire form.
///
/// Lengths beyond `u32::MAX` saturate; the encoder then rejects the record
/// because the length no longer matches the collection.
pub fn wire_len(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}
