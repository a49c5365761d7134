//! Benchmarks for the constant pool runtime.
//!
//! - Keystream generation
//! - Block decryption with both reference mixers
//! - Full decode (decrypt + decompress) per codec
//! - Id lookups on a decoded store

extern crate dotshield;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use dotshield::{
    config::ConstantsConfig,
    runtime::constants::{
        ArxMixer, BlockMixer, ChainedBlockCipher, ConstantId, ConstantPoolBuilder, ConstantStore,
        Keystream, XorMixer,
    },
    utils::Compression,
};
use std::hint::black_box;

/// Builds a pool of `count` strings and as many scalars.
fn sample_pool(count: usize) -> (ConstantPoolBuilder, Vec<ConstantId>) {
    let mut builder = ConstantPoolBuilder::new();
    let mut ids = Vec::with_capacity(count * 2);
    for i in 0..count {
        ids.push(builder.add_string(&format!("constant string number {i}")).unwrap());
        ids.push(builder.add_scalar(i as u64).unwrap());
    }
    (builder, ids)
}

/// Benchmark keystream block generation.
fn bench_keystream(c: &mut Criterion) {
    let mut group = c.benchmark_group("keystream");
    group.throughput(Throughput::Bytes(64 * 1024));
    group.bench_function("blocks_64k", |b| {
        b.iter(|| {
            let mut stream = Keystream::new(black_box(0x1234_5678));
            for _ in 0..1024 {
                black_box(stream.next_block());
            }
        });
    });
    group.finish();
}

/// Benchmark chained decryption of 64 KiB with each mixer.
fn bench_decrypt(c: &mut Criterion) {
    let plaintext = vec![0x5Au8; 64 * 1024];
    let mixers: [(&str, &dyn BlockMixer); 2] = [("xor", &XorMixer), ("arx", &ArxMixer)];

    let mut group = c.benchmark_group("decrypt");
    group.throughput(Throughput::Bytes(plaintext.len() as u64));
    for (name, mixer) in mixers {
        let ciphertext = ChainedBlockCipher::new(mixer, 7).encrypt(&plaintext);
        group.bench_function(name, |b| {
            b.iter(|| {
                let decrypted = ChainedBlockCipher::new(mixer, 7)
                    .decrypt(black_box(&ciphertext))
                    .unwrap();
                black_box(decrypted)
            });
        });
    }
    group.finish();
}

/// Benchmark the full one-time decode per codec.
fn bench_decode(c: &mut Criterion) {
    let (builder, _) = sample_pool(1000);

    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Bytes(builder.len() as u64));
    for compression in [Compression::None, Compression::Deflate, Compression::Lzma] {
        let config = ConstantsConfig::new().with_compression(compression);
        let payload = builder.seal(0xBEEF, &ArxMixer, &config).unwrap();
        group.bench_function(compression.to_string(), |b| {
            b.iter(|| {
                let store = ConstantStore::decode(black_box(&payload), &ArxMixer, &config).unwrap();
                black_box(store)
            });
        });
    }
    group.finish();
}

/// Benchmark lookups on a decoded store, interned and not.
fn bench_lookup(c: &mut Criterion) {
    let (builder, ids) = sample_pool(1000);
    let plain = ConstantsConfig::new().with_compression(Compression::None);

    for (name, config) in [
        ("lookup_interned", plain),
        ("lookup_uninterned", plain.with_interning(false)),
    ] {
        let store = ConstantStore::from_plaintext(builder.as_bytes().to_vec(), &config);
        c.bench_function(name, |b| {
            b.iter(|| {
                for pair in ids.chunks_exact(2) {
                    black_box(store.get_string(black_box(pair[0])).unwrap());
                    black_box(store.get::<u64>(black_box(pair[1])).unwrap());
                }
            });
        });
    }
}

criterion_group!(benches, bench_keystream, bench_decrypt, bench_decode, bench_lookup);
criterion_main!(benches);
