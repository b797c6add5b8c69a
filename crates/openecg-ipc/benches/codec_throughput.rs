//! Codec Benchmarks
//!
//! Per-sample encode and decode cost of both record kinds.

use criterion::{Criterion, criterion_group, criterion_main};
use openecg_filters::derive_leads;
use openecg_ipc::prelude::*;

fn filtered() -> WireMessage {
    WireMessage::Filtered(FilteredRecord {
        timestamp: 1_700_000_000.123_456,
        leads: derive_leads([0.1, 0.2, 0.3]),
        bpm: Some(72.5),
    })
}

fn bench_encode(c: &mut Criterion) {
    let raw = WireMessage::Raw(RawRecord {
        timestamp: 1_700_000_000.123_456,
        ra: 0.1,
        la: 0.2,
        ll: 0.3,
    });
    let filtered = filtered();

    c.bench_function("encode_raw", |b| {
        b.iter(|| std::hint::black_box(encode(std::hint::black_box(&raw))))
    });
    c.bench_function("encode_filtered_frame", |b| {
        b.iter(|| std::hint::black_box(encode_frame(std::hint::black_box(&filtered))))
    });
}

fn bench_decode(c: &mut Criterion) {
    let Ok(bytes) = encode(&filtered()) else {
        return;
    };

    c.bench_function("decode_filtered", |b| {
        b.iter(|| std::hint::black_box(decode(Topic::Filtered, std::hint::black_box(&bytes))))
    });
}

criterion_group!(benches, bench_encode, bench_decode);
criterion_main!(benches);
