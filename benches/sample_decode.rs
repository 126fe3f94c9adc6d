//! Benchmarks for flow sample decoding and encoding
//!
//! Tests throughput for:
//! - Decoding a typical sample (raw packet, switch and gateway records)
//! - Decoding samples padded with unknown records that must be skipped
//! - Encoding the same sample back to bytes
//! - Header disassembly on its own

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use sflow_codec::disassembler::disassemble;
use sflow_codec::test_utils::{WireBuilder, tcp_capture, typical_flow_sample};
use sflow_codec::{FlowSample, Registry};
use std::hint::black_box;
use std::io::Cursor;

fn bench_sample_decode(c: &mut Criterion) {
    let wire = typical_flow_sample(1).encode().expect("Failed to encode sample");
    let registry = Registry::global();

    let mut group = c.benchmark_group("sample_decode");
    group.throughput(Throughput::Bytes(wire.len() as u64));

    group.bench_function("typical_sample", |b| {
        b.iter(|| {
            let mut cursor = Cursor::new(black_box(&wire[8..]));
            black_box(FlowSample::decode(&mut cursor, registry).unwrap())
        })
    });

    group.finish();
}

fn bench_unknown_skip(c: &mut Criterion) {
    let registry = Registry::global();
    let mut group = c.benchmark_group("unknown_record_skip");

    for unknown in [1u32, 8, 32] {
        let mut builder = WireBuilder::new()
            .u32(1)
            .u32(0)
            .u32(1024)
            .u32(0)
            .u32(0)
            .u32(1)
            .u32(2)
            .u32(unknown);
        for i in 0..unknown {
            builder = builder.record(9000 + i, &[0u8; 64]);
        }
        let wire = builder.finish();

        group.bench_with_input(BenchmarkId::from_parameter(unknown), &wire, |b, wire| {
            b.iter(|| {
                let mut cursor = Cursor::new(black_box(wire.as_slice()));
                black_box(FlowSample::decode(&mut cursor, registry).unwrap())
            })
        });
    }

    group.finish();
}

fn bench_sample_encode(c: &mut Criterion) {
    let sample = typical_flow_sample(1);

    c.bench_function("sample_encode", |b| b.iter(|| black_box(sample.encode().unwrap())));
}

fn bench_disassembly(c: &mut Criterion) {
    let capture = tcp_capture();

    c.bench_function("disassemble_tcp", |b| b.iter(|| black_box(disassemble(1, black_box(&capture)))));
}

criterion_group!(
    benches,
    bench_sample_decode,
    bench_unknown_skip,
    bench_sample_encode,
    bench_disassembly
);
criterion_main!(benches);
