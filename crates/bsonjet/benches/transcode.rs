//! Benchmark – `bsonjet::transcode`
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use bsonjet::{transcode, transcode_chunked, IsaTier, TranscodeOptions};

/// Builds a deterministic BSON document of roughly `target_len` bytes mixing
/// the value types a real collection would hold.
fn make_document(target_len: usize) -> Vec<u8> {
    let mut elements = Vec::new();
    let mut n = 0u32;
    while elements.len() < target_len {
        let name = format!("field_{n}");
        match n % 6 {
            0 => push_string(&mut elements, &name, "the quick brown fox jumps over the lazy dog"),
            1 => push_i32(&mut elements, &name, n as i32 * 7919),
            2 => push_f64(&mut elements, &name, f64::from(n) * 0.125),
            3 => push_oid(&mut elements, &name, [n as u8; 12]),
            4 => push_date(&mut elements, &name, i64::from(n) * 86_400_000),
            _ => push_string(&mut elements, &name, "short \"quoted\" value"),
        }
        n += 1;
    }
    let size = 4 + elements.len() as i32 + 1;
    let mut doc = Vec::with_capacity(size as usize);
    doc.extend_from_slice(&size.to_le_bytes());
    doc.extend_from_slice(&elements);
    doc.push(0);
    doc
}

fn push_header(out: &mut Vec<u8>, type_byte: u8, name: &str) {
    out.push(type_byte);
    out.extend_from_slice(name.as_bytes());
    out.push(0);
}

fn push_string(out: &mut Vec<u8>, name: &str, v: &str) {
    push_header(out, 0x02, name);
    out.extend_from_slice(&(v.len() as i32 + 1).to_le_bytes());
    out.extend_from_slice(v.as_bytes());
    out.push(0);
}

fn push_i32(out: &mut Vec<u8>, name: &str, v: i32) {
    push_header(out, 0x10, name);
    out.extend_from_slice(&v.to_le_bytes());
}

fn push_f64(out: &mut Vec<u8>, name: &str, v: f64) {
    push_header(out, 0x01, name);
    out.extend_from_slice(&v.to_le_bytes());
}

fn push_oid(out: &mut Vec<u8>, name: &str, bytes: [u8; 12]) {
    push_header(out, 0x07, name);
    out.extend_from_slice(&bytes);
}

fn push_date(out: &mut Vec<u8>, name: &str, ms: i64) {
    push_header(out, 0x09, name);
    out.extend_from_slice(&ms.to_le_bytes());
}

fn bench_tiers(c: &mut Criterion) {
    let doc = make_document(64 * 1024);
    let mut group = c.benchmark_group("transcode_tiers");
    group.throughput(Throughput::Bytes(doc.len() as u64));
    for tier in [IsaTier::Scalar, IsaTier::Sse2, IsaTier::Sse42, IsaTier::Avx2] {
        if !tier.is_supported() {
            continue;
        }
        let options = TranscodeOptions {
            isa: Some(tier),
            ..Default::default()
        };
        group.bench_with_input(BenchmarkId::from_parameter(tier.name()), &doc, |b, doc| {
            b.iter(|| transcode(black_box(doc), &options).unwrap());
        });
    }
    group.finish();
}

fn bench_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("transcode_sizes");
    for kib in [1usize, 16, 256, 1024] {
        let doc = make_document(kib * 1024);
        group.throughput(Throughput::Bytes(doc.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(kib), &doc, |b, doc| {
            b.iter(|| transcode(black_box(doc), &TranscodeOptions::default()).unwrap());
        });
    }
    group.finish();
}

fn bench_chunked(c: &mut Criterion) {
    let doc = make_document(256 * 1024);
    let mut group = c.benchmark_group("transcode_chunked");
    group.throughput(Throughput::Bytes(doc.len() as u64));
    for chunk_size in [4 * 1024usize, 64 * 1024] {
        let options = TranscodeOptions {
            chunk_size,
            ..Default::default()
        };
        group.bench_with_input(
            BenchmarkId::from_parameter(chunk_size),
            &doc,
            |b, doc| {
                b.iter(|| {
                    let mut total = 0usize;
                    for chunk in transcode_chunked(doc.clone(), &options) {
                        total += chunk.unwrap().len();
                    }
                    black_box(total)
                });
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_tiers, bench_sizes, bench_chunked);
criterion_main!(benches);
