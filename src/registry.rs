//! Record type registry
//!
//! Maps wire type codes to record schemas and decode functions. A registry is
//! immutable once built, so one instance can serve any number of concurrent
//! decoders by shared reference.

use std::collections::HashMap;
use std::io::Read;
use std::sync::LazyLock;
use tracing::{debug, trace};

use crate::records::{
    EthernetFrameFlow, ExtendedGatewayFlow, ExtendedProxySocketIpv4Flow, ExtendedProxySocketIpv6Flow,
    ExtendedRouterFlow, ExtendedSocketIpv4Flow, ExtendedSocketIpv6Flow, ExtendedSwitchFlow,
    HostDescriptionCounter, HttpCounter, HttpRequestFlow, RawPacketFlow, Record, TypedRecord, decode_as,
};
use crate::types::Schema;
use crate::{DecoderLimits, Result, SflowError};

type DecodeFn = fn(&mut dyn Read, &DecoderLimits) -> Result<Record>;

/// Registered record type.
#[derive(Debug, Clone, Copy)]
pub struct RecordEntry {
    pub type_code: u32,
    pub schema: &'static Schema,
    decode: DecodeFn,
}

impl RecordEntry {
    fn of<T: TypedRecord>() -> Self {
        Self { type_code: T::TYPE_CODE, schema: T::schema(), decode: decode_as::<T> }
    }

    pub fn name(&self) -> &'static str {
        self.schema.name
    }

    /// Decode a record body of this type.
    pub fn decode(&self, reader: &mut dyn Read, limits: &DecoderLimits) -> Result<Record> {
        (self.decode)(reader, limits)
    }
}

static GLOBAL: LazyLock<Registry> = LazyLock::new(Registry::default);

/// Immutable lookup tables for flow and counter records.
#[derive(Debug)]
pub struct Registry {
    flow: HashMap<u32, RecordEntry>,
    counter: HashMap<u32, RecordEntry>,
    limits: DecoderLimits,
}

impl Registry {
    /// Build a registry with custom size limits.
    ///
    /// Validates the limits and every registered schema.
    pub fn with_limits(limits: DecoderLimits) -> Result<Self> {
        limits.validate()?;

        let registry = Self::build(limits);
        for entry in registry.flow.values().chain(registry.counter.values()) {
            entry.schema.validate()?;
        }

        Ok(registry)
    }

    /// Process-wide registry with default limits.
    pub fn global() -> &'static Registry {
        &GLOBAL
    }

    fn build(limits: DecoderLimits) -> Self {
        let flow: HashMap<u32, RecordEntry> = [
            RecordEntry::of::<RawPacketFlow>(),
            RecordEntry::of::<EthernetFrameFlow>(),
            RecordEntry::of::<ExtendedSwitchFlow>(),
            RecordEntry::of::<ExtendedRouterFlow>(),
            RecordEntry::of::<ExtendedGatewayFlow>(),
            RecordEntry::of::<ExtendedSocketIpv4Flow>(),
            RecordEntry::of::<ExtendedSocketIpv6Flow>(),
            RecordEntry::of::<ExtendedProxySocketIpv4Flow>(),
            RecordEntry::of::<ExtendedProxySocketIpv6Flow>(),
            RecordEntry::of::<HttpRequestFlow>(),
        ]
        .into_iter()
        .map(|entry| (entry.type_code, entry))
        .collect();

        let counter: HashMap<u32, RecordEntry> =
            [RecordEntry::of::<HttpCounter>(), RecordEntry::of::<HostDescriptionCounter>()]
                .into_iter()
                .map(|entry| (entry.type_code, entry))
                .collect();

        debug!(flow = flow.len(), counter = counter.len(), "Built record registry");
        Self { flow, counter, limits }
    }

    pub fn limits(&self) -> &DecoderLimits {
        &self.limits
    }

    /// Flow record entry for `type_code`. A miss is a normal outcome.
    pub fn lookup(&self, type_code: u32) -> Option<&RecordEntry> {
        self.flow.get(&type_code)
    }

    /// Counter record entry for `type_code`.
    pub fn lookup_counter(&self, type_code: u32) -> Option<&RecordEntry> {
        self.counter.get(&type_code)
    }

    /// Decode one flow record body of a known type.
    pub fn decode_flow_record<R: Read>(&self, reader: &mut R, type_code: u32) -> Result<Record> {
        let entry = self.lookup(type_code).ok_or(SflowError::UnknownRecordType { type_code })?;
        trace!(type_code, name = entry.name(), "Decoding flow record");
        entry.decode(reader, &self.limits)
    }

    /// Decode one counter record body of a known type.
    pub fn decode_counter_record<R: Read>(&self, reader: &mut R, type_code: u32) -> Result<Record> {
        let entry = self.lookup_counter(type_code).ok_or(SflowError::UnknownRecordType { type_code })?;
        trace!(type_code, name = entry.name(), "Decoding counter record");
        entry.decode(reader, &self.limits)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::build(DecoderLimits::DEFAULT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::HttpCounter;

    #[test]
    fn known_flow_types() {
        let registry = Registry::default();
        for code in [1, 2, 1001, 1002, 1003, 2100, 2101, 2102, 2103, 2206] {
            let entry = registry.lookup(code).unwrap();
            assert_eq!(entry.type_code, code);
        }
        assert_eq!(registry.lookup(1003).unwrap().name(), "ExtendedGatewayFlow");
    }

    #[test]
    fn unknown_type_is_a_miss() {
        let registry = Registry::default();
        assert!(registry.lookup(4242).is_none());
        assert!(registry.lookup(2201).is_none());
        assert!(registry.lookup_counter(1001).is_none());
        assert_eq!(registry.lookup_counter(2000).unwrap().name(), "HostDescriptionCounter");
    }

    #[test]
    fn direct_decode_reports_unknown_type() {
        let err = Registry::global().decode_flow_record(&mut &[0u8; 0][..], 4242).unwrap_err();
        assert!(matches!(err, SflowError::UnknownRecordType { type_code: 4242 }));
        assert!(err.is_recoverable());
    }

    #[test]
    fn counter_decode() {
        let counter = HttpCounter { method_get_count: 5, status_2xx_count: 5, ..Default::default() };
        let framed = counter.encode().unwrap();
        let record = Registry::global().decode_counter_record(&mut &framed[8..], 2201).unwrap();
        assert_eq!(record, Record::HttpCounter(counter));
        assert!(record.is_counter());
    }

    #[test]
    fn custom_limits_are_validated() {
        let limits = DecoderLimits { max_record_length: 1024, max_header_length: 128 };
        let registry = Registry::with_limits(limits).unwrap();
        assert_eq!(registry.limits().max_header_length, 128);

        let bad = DecoderLimits { max_record_length: 100, max_header_length: 200 };
        assert!(matches!(Registry::with_limits(bad), Err(SflowError::Config { .. })));
    }

    #[test]
    fn global_is_shared() {
        assert!(std::ptr::eq(Registry::global(), Registry::global()));
    }
}
