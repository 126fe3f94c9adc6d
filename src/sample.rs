//! Flow sample container
//!
//! A flow sample is a fixed 32-byte header followed by a declared number of
//! framed records. Record types missing from the registry are skipped by
//! their declared length so the cursor stays in sync; a failure inside a
//! known record fails the whole sample.

use serde::Serialize;
use std::io::{Read, Seek, SeekFrom};
use tracing::{debug, trace};

use crate::codec::{read_array, read_u32};
use crate::records::Record;
use crate::registry::Registry;
use crate::types::wire_len;
use crate::{Result, SflowError};

/// Sample type code of a flow sample.
pub const FLOW_SAMPLE_TYPE: u32 = 1;

/// Largest source index that fits the 24-bit wire field.
pub const MAX_SOURCE_ID_INDEX: u32 = 0x00FF_FFFF;

/// Header words following the sample framing, record count included.
const SAMPLE_HEADER_LEN: usize = 32;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlowSample {
    pub sequence_number: u32,
    /// Most significant byte of the packed source id
    pub source_id_type: u8,
    /// Low 24 bits of the packed source id
    pub source_id_index: u32,
    pub sampling_rate: u32,
    pub sample_pool: u32,
    pub drops: u32,
    pub input: u32,
    pub output: u32,
    /// Record count read from the wire. Encoding uses `records.len()` instead.
    pub declared_records: u32,
    pub records: Vec<Record>,
}

impl FlowSample {
    /// Decode a flow sample body, starting at the sequence number.
    pub fn decode<R: Read + Seek + ?Sized>(reader: &mut R, registry: &Registry) -> Result<Self> {
        let sequence_number = read_u32(reader, "sequence_number")?;
        let [source_id_type, index_hi, index_mid, index_lo] = read_array::<4, R>(reader, "source_id")?;
        let source_id_index = u32::from_be_bytes([0, index_hi, index_mid, index_lo]);

        let mut sample = Self {
            sequence_number,
            source_id_type,
            source_id_index,
            sampling_rate: read_u32(reader, "sampling_rate")?,
            sample_pool: read_u32(reader, "sample_pool")?,
            drops: read_u32(reader, "drops")?,
            input: read_u32(reader, "input")?,
            output: read_u32(reader, "output")?,
            declared_records: read_u32(reader, "record_count")?,
            records: Vec::new(),
        };

        trace!(
            sequence_number,
            source_id_type,
            source_id_index,
            declared_records = sample.declared_records,
            "Decoded flow sample header"
        );

        let max_record_length = registry.limits().max_record_length;
        for _ in 0..sample.declared_records {
            let type_code = read_u32(reader, "record type")?;
            let length = read_u32(reader, "record length")?;

            if length > max_record_length {
                return Err(SflowError::size_guard(
                    format!("record type {type_code}"),
                    u64::from(length),
                    u64::from(max_record_length),
                ));
            }

            let Some(entry) = registry.lookup(type_code) else {
                debug!(type_code, length, "Skipping unknown flow record");
                reader.seek(SeekFrom::Current(i64::from(length)))?;
                continue;
            };

            let mut body = (&mut *reader).take(u64::from(length));
            let record = entry.decode(&mut body, registry.limits())?;

            // Trailing bytes the schema does not describe
            let unread = body.limit();
            if unread > 0 {
                trace!(type_code, unread, "Skipping unread record bytes");
                reader.seek(SeekFrom::Current(unread as i64))?;
            }

            sample.records.push(record);
        }

        Ok(sample)
    }

    /// The 32-bit source id word: type in the high byte, index below it.
    pub fn source_id(&self) -> Result<u32> {
        if self.source_id_index > MAX_SOURCE_ID_INDEX {
            return Err(SflowError::invalid_field(
                "source_id_index",
                format!("{} does not fit in 24 bits", self.source_id_index),
            ));
        }
        Ok((u32::from(self.source_id_type) << 24) | self.source_id_index)
    }

    /// Length of the encoded sample body, excluding the 8-byte framing.
    pub fn encoded_len(&self) -> Result<usize> {
        let mut total = SAMPLE_HEADER_LEN;
        for record in &self.records {
            total += 8 + record.encoded_len()?;
        }
        Ok(total)
    }

    /// Encode with sample type and length framing.
    ///
    /// The record count is taken from `records`, not `declared_records`.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let source_id = self.source_id()?;

        let mut encoded_records = Vec::new();
        for record in &self.records {
            encoded_records.extend_from_slice(&record.encode()?);
        }

        let length = SAMPLE_HEADER_LEN + encoded_records.len();
        let wire_length = u32::try_from(length).map_err(|_| {
            SflowError::invalid_field("flow sample", format!("body of {length} bytes"))
        })?;

        let mut out = Vec::with_capacity(8 + length);
        for word in [
            FLOW_SAMPLE_TYPE,
            wire_length,
            self.sequence_number,
            source_id,
            self.sampling_rate,
            self.sample_pool,
            self.drops,
            self.input,
            self.output,
            wire_len(self.records.len()),
        ] {
            out.extend_from_slice(&word.to_be_bytes());
        }
        out.extend_from_slice(&encoded_records);

        trace!(records = self.records.len(), length, "Encoded flow sample");
        Ok(out)
    }
}

/// Decode `count` framed samples, keeping flow samples and skipping every
/// other sample type by its declared length.
pub fn decode_samples<R: Read + Seek + ?Sized>(
    reader: &mut R,
    registry: &Registry,
    count: u32,
) -> Result<Vec<FlowSample>> {
    let mut samples = Vec::new();

    for _ in 0..count {
        let sample_type = read_u32(reader, "sample type")?;
        let length = read_u32(reader, "sample length")?;
        let start = reader.stream_position()?;
        let end = start + u64::from(length);

        if sample_type != FLOW_SAMPLE_TYPE {
            debug!(sample_type, length, "Skipping non-flow sample");
            reader.seek(SeekFrom::Start(end))?;
            continue;
        }

        let sample = FlowSample::decode(reader, registry)?;
        let position = reader.stream_position()?;
        if position > end {
            return Err(SflowError::size_guard(
                format!("flow sample {}", sample.sequence_number),
                position - start,
                u64::from(length),
            ));
        }
        if position < end {
            debug!(position, end, "Skipping unread flow sample bytes");
            reader.seek(SeekFrom::Start(end))?;
        }
        samples.push(sample);
    }

    Ok(samples)
}
