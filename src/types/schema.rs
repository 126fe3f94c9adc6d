//! Field descriptor tables
//!
//! A [`Schema`] is a static, ordered list of [`FieldSpec`]s. The generic
//! decode and encode engines walk this list; nothing about a record layout is
//! discovered at runtime.

use crate::{Result, SflowError};

/// Position of an earlier field in the same schema.
///
/// Length and address-type dependencies name their sibling by position, so
/// a dangling reference is caught by [`Schema::validate`] instead of at
/// decode time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldRef(pub usize);

impl FieldRef {
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Fixed-width unsigned integer encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scalar {
    U8,
    U16,
    U32,
    U64,
}

impl Scalar {
    /// Returns the size in bytes of this scalar on the wire.
    pub const fn size(&self) -> usize {
        match self {
            Scalar::U8 => 1,
            Scalar::U16 => 2,
            Scalar::U32 => 4,
            Scalar::U64 => 8,
        }
    }
}

/// How the byte width of an address field is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressWidth {
    /// Always 4 bytes
    V4,
    /// Always 16 bytes
    V6,
    /// Chosen by a sibling holding an address type (1 = IPv4, 2 = IPv6)
    Lookup(FieldRef),
}

/// Which configured limit bounds a variable-length byte field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LengthBound {
    Record,
    Header,
}

/// Layout rule for one field.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Big-endian unsigned integer
    Scalar(Scalar),
    /// Byte array of a fixed size, unpadded
    FixedBytes(usize),
    /// IPv4 or IPv6 address
    Address(AddressWidth),
    /// Byte string whose length is a sibling field, padded to 4 bytes on the wire
    Opaque { len: FieldRef, bound: LengthBound },
    /// Sequence of 32-bit words whose count is a sibling field
    Words { len: FieldRef },
    /// Sequence of nested records whose count is a sibling field
    Records { len: FieldRef, schema: &'static Schema },
    /// Nested record, always present
    Nested(&'static Schema),
    /// Computed after decode; never read from or written to the wire
    Derived,
}

/// A named field and its layout rule.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }

    pub const fn u8(name: &'static str) -> Self {
        Self::new(name, FieldKind::Scalar(Scalar::U8))
    }

    pub const fn u16(name: &'static str) -> Self {
        Self::new(name, FieldKind::Scalar(Scalar::U16))
    }

    pub const fn u32(name: &'static str) -> Self {
        Self::new(name, FieldKind::Scalar(Scalar::U32))
    }

    pub const fn u64(name: &'static str) -> Self {
        Self::new(name, FieldKind::Scalar(Scalar::U64))
    }

    pub const fn bytes(name: &'static str, size: usize) -> Self {
        Self::new(name, FieldKind::FixedBytes(size))
    }

    pub const fn address(name: &'static str, width: AddressWidth) -> Self {
        Self::new(name, FieldKind::Address(width))
    }

    pub const fn opaque(name: &'static str, len: FieldRef) -> Self {
        Self::new(name, FieldKind::Opaque { len, bound: LengthBound::Record })
    }

    pub const fn words(name: &'static str, len: FieldRef) -> Self {
        Self::new(name, FieldKind::Words { len })
    }

    pub const fn records(name: &'static str, len: FieldRef, schema: &'static Schema) -> Self {
        Self::new(name, FieldKind::Records { len, schema })
    }

    pub const fn nested(name: &'static str, schema: &'static Schema) -> Self {
        Self::new(name, FieldKind::Nested(schema))
    }

    pub const fn derived(name: &'static str) -> Self {
        Self::new(name, FieldKind::Derived)
    }

    /// Fewest bytes this field can occupy on the wire.
    pub fn min_wire_size(&self) -> usize {
        match self.kind {
            FieldKind::Scalar(scalar) => scalar.size(),
            FieldKind::FixedBytes(size) => size,
            FieldKind::Address(AddressWidth::V6) => 16,
            FieldKind::Address(_) => 4,
            FieldKind::Opaque { .. } | FieldKind::Words { .. } | FieldKind::Records { .. } => 0,
            FieldKind::Nested(schema) => schema.min_wire_size(),
            FieldKind::Derived => 0,
        }
    }
}

/// Ordered field layout of one record type.
#[derive(Debug)]
pub struct Schema {
    pub name: &'static str,
    pub fields: &'static [FieldSpec],
}

impl Schema {
    pub const fn new(name: &'static str, fields: &'static [FieldSpec]) -> Self {
        Self { name, fields }
    }

    /// Number of fields, derived ones included.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Field descriptor at `at`.
    pub fn field(&self, at: FieldRef) -> Option<&FieldSpec> {
        self.fields.get(at.index())
    }

    /// Name of the field at `at`, for diagnostics.
    pub fn field_name(&self, at: FieldRef) -> &'static str {
        self.fields.get(at.index()).map_or("<out of range>", |spec| spec.name)
    }

    /// Position of a field by name.
    pub fn index_of(&self, name: &str) -> Option<FieldRef> {
        self.fields.iter().position(|spec| spec.name == name).map(FieldRef)
    }

    /// Fewest bytes a record of this schema can occupy on the wire.
    pub fn min_wire_size(&self) -> usize {
        self.fields.iter().map(FieldSpec::min_wire_size).sum()
    }

    /// Validate the table, recursing into nested schemas.
    ///
    /// Every sibling reference must point to a scalar field declared earlier
    /// in the same schema.
    pub fn validate(&self) -> Result<()> {
        if self.fields.is_empty() {
            return Err(SflowError::Schema { reason: format!("{} has no fields", self.name) });
        }

        for (index, spec) in self.fields.iter().enumerate() {
            match spec.kind {
                FieldKind::Address(AddressWidth::Lookup(sibling))
                | FieldKind::Opaque { len: sibling, .. }
                | FieldKind::Words { len: sibling } => {
                    self.validate_sibling(index, spec, sibling)?;
                }
                FieldKind::Records { len, schema } => {
                    self.validate_sibling(index, spec, len)?;
                    schema.validate()?;
                }
                FieldKind::Nested(schema) => schema.validate()?,
                FieldKind::FixedBytes(0) => {
                    return Err(SflowError::Schema {
                        reason: format!("{}.{} is a zero-sized byte array", self.name, spec.name),
                    });
                }
                FieldKind::Scalar(_) | FieldKind::FixedBytes(_) => {}
                FieldKind::Address(_) | FieldKind::Derived => {}
            }
        }

        Ok(())
    }

    fn validate_sibling(&self, index: usize, spec: &FieldSpec, sibling: FieldRef) -> Result<()> {
        if sibling.index() >= index {
            return Err(SflowError::Schema {
                reason: format!(
                    "{}.{} depends on field #{} which is not decoded before it",
                    self.name,
                    spec.name,
                    sibling.index()
                ),
            });
        }

        match self.fields[sibling.index()].kind {
            FieldKind::Scalar(_) => Ok(()),
            _ => Err(SflowError::Schema {
                reason: format!(
                    "{}.{} depends on {} which is not a scalar field",
                    self.name,
                    spec.name,
                    self.field_name(sibling)
                ),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static SEGMENT: Schema = Schema::new(
        "Segment",
        &[FieldSpec::u32("kind"), FieldSpec::u32("count"), FieldSpec::words("items", FieldRef(1))],
    );

    static PARENT: Schema = Schema::new(
        "Parent",
        &[
            FieldSpec::u32("address_type"),
            FieldSpec::address("address", AddressWidth::Lookup(FieldRef(0))),
            FieldSpec::u32("segment_count"),
            FieldSpec::records("segments", FieldRef(2), &SEGMENT),
            FieldSpec::derived("computed"),
        ],
    );

    static FORWARD_REFERENCE: Schema = Schema::new(
        "ForwardReference",
        &[FieldSpec::opaque("data", FieldRef(1)), FieldSpec::u32("data_len")],
    );

    static NON_SCALAR_REFERENCE: Schema = Schema::new(
        "NonScalarReference",
        &[
            FieldSpec::address("peer", AddressWidth::V4),
            FieldSpec::opaque("data", FieldRef(0)),
        ],
    );

    static BAD_CHILD: Schema = Schema::new(
        "BadChild",
        &[FieldSpec::u32("count"), FieldSpec::nested("child", &FORWARD_REFERENCE)],
    );

    #[test]
    fn valid_schema_passes() {
        assert!(PARENT.validate().is_ok());
    }

    #[test]
    fn forward_reference_is_rejected() {
        let err = FORWARD_REFERENCE.validate().unwrap_err();
        assert!(matches!(err, SflowError::Schema { .. }));
        assert!(err.to_string().contains("ForwardReference.data"));
    }

    #[test]
    fn non_scalar_reference_is_rejected() {
        assert!(NON_SCALAR_REFERENCE.validate().is_err());
    }

    #[test]
    fn nested_schemas_are_validated() {
        assert!(BAD_CHILD.validate().is_err());
    }

    #[test]
    fn min_wire_size_counts_fixed_parts() {
        assert_eq!(SEGMENT.min_wire_size(), 8);
        assert_eq!(PARENT.min_wire_size(), 4 + 4 + 4);
    }

    #[test]
    fn index_lookup() {
        assert_eq!(PARENT.index_of("segment_count"), Some(FieldRef(2)));
        assert_eq!(PARENT.index_of("missing"), None);
        assert_eq!(PARENT.field_name(FieldRef(3)), "segments");
        assert_eq!(PARENT.field_name(FieldRef(99)), "<out of range>");
    }

    #[test]
    fn scalar_sizes() {
        assert_eq!(Scalar::U8.size(), 1);
        assert_eq!(Scalar::U16.size(), 2);
        assert_eq!(Scalar::U32.size(), 4);
        assert_eq!(Scalar::U64.size(), 8);
    }
}
