//! Schema-driven decoder and encoder for sFlow flow samples.
//!
//! sFlow agents export sampled traffic as big-endian, self-describing
//! records. This crate turns a byte cursor over one sample into typed
//! records and turns typed records back into bytes.
//!
//! # Features
//!
//! - **One engine, many schemas**: every record layout is a static field table
//!   interpreted by a single decode and encode routine
//! - **Hostile input safety**: every wire length is checked against
//!   [`DecoderLimits`] before it sizes an allocation
//! - **Forward compatible**: unknown record types are skipped by length
//! - **Header disassembly**: raw packet records expose their Ethernet, IPv4
//!   and transport headers
//!
//! # Quick Start
//!
//! ```rust
//! use std::io::Cursor;
//! use sflow_codec::records::ExtendedSwitchFlow;
//! use sflow_codec::{FlowSample, Record, Registry};
//!
//! let sample = FlowSample {
//!     sequence_number: 42,
//!     source_id_index: 3,
//!     records: vec![ExtendedSwitchFlow { src_vlan: 10, dst_vlan: 20, ..Default::default() }.into()],
//!     ..Default::default()
//! };
//! let wire = sample.encode()?;
//!
//! // Skip the 8-byte sample framing
//! let decoded = FlowSample::decode(&mut Cursor::new(&wire[8..]), Registry::global())?;
//! assert_eq!(decoded.sequence_number, 42);
//! assert!(matches!(decoded.records[0], Record::ExtendedSwitch(_)));
//! # Ok::<(), sflow_codec::SflowError>(())
//! ```

// Core types and error handling
pub mod codec;
mod config;
mod error;
#[cfg_attr(any(test, feature = "benchmark"), path = "test_utils.rs")]
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Record catalog and decoding
pub mod disassembler;
pub mod records;
pub mod registry;
pub mod sample;

// Core exports
pub use config::*;
pub use error::*;

// Main API exports
pub use disassembler::{DecodedHeader, MINIMUM_ETHERNET_HEADER_SIZE};
pub use records::{Record, TypedRecord};
pub use registry::Registry;
pub use sample::{FLOW_SAMPLE_TYPE, FlowSample, decode_samples};
