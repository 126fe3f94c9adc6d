//! Decoder size limits.
//!
//! Every length taken from the wire is checked against one of these limits
//! before anything sized by it is allocated. Limits can be loaded from YAML:
//!
//! ```rust
//! use sflow_codec::DecoderLimits;
//!
//! let limits = DecoderLimits::from_yaml_str("max_header_length: 9000\nmax_record_length: 65536\n")?;
//! assert_eq!(limits.max_header_length, 9000);
//! # Ok::<(), sflow_codec::SflowError>(())
//! ```

use serde::{Deserialize, Serialize};

use crate::types::LengthBound;
use crate::{Result, SflowError};

/// Maximum accepted length of a decoded record.
///
/// Derived from `MAX_PKT_SIZ` in the sflowtool reference implementation.
pub const MAXIMUM_RECORD_LENGTH: u32 = 65_536;

/// Maximum accepted size of a captured packet header.
///
/// A sampled header cannot exceed the link MTU.
pub const MAXIMUM_HEADER_LENGTH: u32 = 1_500;

/// Size guards applied while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecoderLimits {
    /// Upper bound for record lengths and variable-length record fields
    pub max_record_length: u32,
    /// Upper bound for the captured header of a raw packet record
    pub max_header_length: u32,
}

impl DecoderLimits {
    /// Limits matching the reference implementation.
    pub const DEFAULT: Self = Self {
        max_record_length: MAXIMUM_RECORD_LENGTH,
        max_header_length: MAXIMUM_HEADER_LENGTH,
    };

    /// Parse and validate limits from a YAML document.
    ///
    /// Missing keys fall back to [`DecoderLimits::DEFAULT`].
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let limits: Self = serde_yaml_ng::from_str(yaml)?;
        limits.validate()?;
        Ok(limits)
    }

    /// Check the limits for consistency.
    pub fn validate(&self) -> Result<()> {
        if self.max_record_length == 0 {
            return Err(SflowError::Config {
                details: "max_record_length must be greater than zero".to_string(),
            });
        }

        if self.max_header_length == 0 {
            return Err(SflowError::Config {
                details: "max_header_length must be greater than zero".to_string(),
            });
        }

        // A header always travels inside a record
        if self.max_header_length > self.max_record_length {
            return Err(SflowError::Config {
                details: format!(
                    "max_header_length ({}) exceeds max_record_length ({})",
                    self.max_header_length, self.max_record_length
                ),
            });
        }

        Ok(())
    }

    /// Resolve a field's length bound to a byte count.
    pub fn bound(&self, bound: LengthBound) -> u32 {
        match bound {
            LengthBound::Record => self.max_record_length,
            LengthBound::Header => self.max_header_length,
        }
    }
}

impl Default for DecoderLimits {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_constants() {
        let limits = DecoderLimits::default();
        assert_eq!(limits.max_record_length, 65_536);
        assert_eq!(limits.max_header_length, 1_500);
        assert!(limits.validate().is_ok());
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let limits = DecoderLimits::from_yaml_str("max_header_length: 256\n").unwrap();
        assert_eq!(limits.max_header_length, 256);
        assert_eq!(limits.max_record_length, MAXIMUM_RECORD_LENGTH);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = DecoderLimits::from_yaml_str("max_packet_length: 10\n");
        assert!(matches!(result, Err(SflowError::Config { .. })));
    }

    #[test]
    fn header_larger_than_record_is_rejected() {
        let result =
            DecoderLimits::from_yaml_str("max_header_length: 2048\nmax_record_length: 1024\n");
        assert!(matches!(result, Err(SflowError::Config { .. })));
    }

    #[test]
    fn zero_limits_are_rejected() {
        let limits = DecoderLimits { max_record_length: 0, ..DecoderLimits::DEFAULT };
        assert!(limits.validate().is_err());
        let limits = DecoderLimits { max_header_length: 0, ..DecoderLimits::DEFAULT };
        assert!(limits.validate().is_err());
    }

    #[test]
    fn bound_resolution() {
        let limits = DecoderLimits { max_record_length: 4096, max_header_length: 128 };
        assert_eq!(limits.bound(LengthBound::Record), 4096);
        assert_eq!(limits.bound(LengthBound::Header), 128);
    }
}
