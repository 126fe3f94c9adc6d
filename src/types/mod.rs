//! Core types for schema-driven record decoding.
//!
//! This module provides the building blocks the generic codec works with:
//! - [`Schema`] and [`FieldSpec`] describe a record layout as a static table
//! - [`FieldRef`] names an earlier sibling field by position
//! - [`Value`] and [`Fields`] hold the decoded values of one record
//! - [`AddressType`] maps the sFlow address selector to a byte width
//!
//! ## Usage Example
//!
//! ```rust
//! use sflow_codec::codec::{decode_fields, encode_fields};
//! use sflow_codec::types::{FieldRef, FieldSpec, Schema};
//! use sflow_codec::DecoderLimits;
//!
//! static VLAN: Schema = Schema::new(
//!     "Vlan",
//!     &[FieldSpec::u32("id_count"), FieldSpec::words("ids", FieldRef(0))],
//! );
//!
//! let wire = [0, 0, 0, 2, 0, 0, 0, 10, 0, 0, 0, 20];
//! let fields = decode_fields(&mut &wire[..], &VLAN, &DecoderLimits::DEFAULT)?;
//! assert_eq!(fields.u32(FieldRef(0))?, 2);
//!
//! let mut out = Vec::new();
//! encode_fields(&fields, &mut out)?;
//! assert_eq!(out, wire);
//! # Ok::<(), sflow_codec::SflowError>(())
//! ```

mod address;
mod schema;
mod value;

pub use address::AddressType;
pub use schema::{AddressWidth, FieldKind, FieldRef, FieldSpec, LengthBound, Scalar, Schema};
pub use value::{Fields, Value, wire_len};
