//! Error types for sFlow decoding and encoding.
//!
//! Every failure the codec can report is a variant of [`SflowError`]. The
//! variants follow the failure classes of the wire format:
//!
//! - **Truncated input**: fewer bytes were available than a field requires
//! - **Invalid discriminant**: a selector field (address type) holds a value
//!   outside its domain
//! - **Size guard**: a declared length exceeds the configured maximum
//! - **Unknown record type**: a registry miss, skipped by the sample loop
//! - **Not implemented**: a sub-protocol the disassembler does not decode
//!
//! ## Recovery
//!
//! ```rust
//! use sflow_codec::SflowError;
//!
//! let error = SflowError::UnknownRecordType { type_code: 4242 };
//! assert!(error.is_recoverable());
//!
//! let error = SflowError::truncated("sequence_number", 4);
//! assert!(!error.is_recoverable());
//! ```

use thiserror::Error;

/// Result type alias for codec operations.
pub type Result<T, E = SflowError> = std::result::Result<T, E>;

/// Main error type for codec operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SflowError {
    #[error("Truncated input while reading {context}: need {needed} bytes")]
    Truncated { context: String, needed: usize },

    #[error("Invalid value {value} in selector field '{field}'")]
    InvalidDiscriminant { field: String, value: u64 },

    #[error("Declared length {declared} for {context} exceeds maximum {max}")]
    SizeGuard { context: String, declared: u64, max: u64 },

    #[error("Record type {type_code} is not implemented")]
    UnknownRecordType { type_code: u32 },

    #[error("{feature} is not implemented")]
    NotImplemented { feature: String },

    #[error("Invalid field '{field}': {details}")]
    InvalidField { field: String, details: String },

    #[error("Schema validation failed: {reason}")]
    Schema { reason: String },

    #[error("Decoder limits configuration error: {details}")]
    Config { details: String },

    #[error("I/O error on record cursor")]
    Io {
        #[source]
        source: std::io::Error,
    },
}

impl SflowError {
    /// Returns whether decoding can continue past this error.
    ///
    /// Unknown record types are skipped by the sample loop and unimplemented
    /// sub-protocols only cut a header disassembly short. Everything else
    /// aborts the enclosing record.
    pub fn is_recoverable(&self) -> bool {
        match self {
            SflowError::UnknownRecordType { .. } => true,
            SflowError::NotImplemented { .. } => true,
            SflowError::Truncated { .. } => false,
            SflowError::InvalidDiscriminant { .. } => false,
            SflowError::SizeGuard { .. } => false,
            SflowError::InvalidField { .. } => false,
            SflowError::Schema { .. } => false,
            SflowError::Config { .. } => false,
            SflowError::Io { .. } => false,
        }
    }

    /// Helper constructor for short reads.
    pub fn truncated(context: impl Into<String>, needed: usize) -> Self {
        SflowError::Truncated { context: context.into(), needed }
    }

    /// Helper constructor for size guard violations.
    pub fn size_guard(context: impl Into<String>, declared: u64, max: u64) -> Self {
        SflowError::SizeGuard { context: context.into(), declared, max }
    }

    /// Helper constructor for field shape or range errors.
    pub fn invalid_field(field: impl Into<String>, details: impl Into<String>) -> Self {
        SflowError::InvalidField { field: field.into(), details: details.into() }
    }

    /// Helper constructor for unimplemented sub-protocols.
    pub fn not_implemented(feature: impl Into<String>) -> Self {
        SflowError::NotImplemented { feature: feature.into() }
    }

    /// Map an I/O error raised while reading `context`.
    ///
    /// End-of-stream becomes [`SflowError::Truncated`]; anything else is kept
    /// as an I/O error.
    pub fn from_read(err: std::io::Error, context: impl Into<String>, needed: usize) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            SflowError::truncated(context, needed)
        } else {
            SflowError::Io { source: err }
        }
    }
}

impl From<std::io::Error> for SflowError {
    fn from(err: std::io::Error) -> Self {
        SflowError::from_read(err, "<unknown>", 0)
    }
}

impl From<serde_yaml_ng::Error> for SflowError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        SflowError::Config { details: err.to_string() }
    }
}
