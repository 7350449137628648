use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::io::Write;
use zipout::{EntryOptions, ZipOutput};

fn generate_compressible_data(size: usize) -> Vec<u8> {
    // Pattern that compresses well
    let pattern = b"The quick brown fox jumps over the lazy dog. ";
    let mut data = Vec::with_capacity(size);
    while data.len() < size {
        data.extend_from_slice(pattern);
    }
    data.truncate(size);
    data
}

fn generate_random_data(size: usize) -> Vec<u8> {
    // Pseudo-random data that doesn't compress well
    let mut data = Vec::with_capacity(size);
    let mut state = 0x12345678u32;
    for _ in 0..size {
        state = state.wrapping_mul(1103515245).wrapping_add(12345);
        data.push((state >> 16) as u8);
    }
    data
}

fn write_single(options: EntryOptions, data: &[u8]) -> Vec<u8> {
    let mut zip = ZipOutput::from_writer(Vec::new()).unwrap();
    zip.write_entry("test.bin", options, black_box(data)).unwrap();
    zip.close().unwrap()
}

fn bench_compression_methods(c: &mut Criterion) {
    let sizes = vec![
        1024,             // 1KB
        10 * 1024,        // 10KB
        100 * 1024,       // 100KB
        1024 * 1024,      // 1MB
        10 * 1024 * 1024, // 10MB
    ];

    for size in sizes {
        let mut group = c.benchmark_group(format!("write_compressible_{}", format_size(size)));
        group.throughput(Throughput::Bytes(size as u64));

        let data = generate_compressible_data(size);

        group.bench_with_input(BenchmarkId::new("stored", size), &data, |b, data| {
            b.iter(|| write_single(EntryOptions::stored(), data));
        });

        group.bench_with_input(BenchmarkId::new("stored_aligned_4096", size), &data, |b, data| {
            b.iter(|| write_single(EntryOptions::stored().alignment(4096), data));
        });

        group.bench_with_input(BenchmarkId::new("deflate", size), &data, |b, data| {
            b.iter(|| write_single(EntryOptions::deflated(), data));
        });

        group.bench_with_input(
            BenchmarkId::new("deflate_with_hint", size),
            &data,
            |b, data| {
                b.iter(|| write_single(EntryOptions::deflated().size_hint(size as u64), data));
            },
        );

        group.finish();
    }
}

fn bench_random_data_compression(c: &mut Criterion) {
    let sizes = vec![100 * 1024, 1024 * 1024]; // 100KB, 1MB

    for size in sizes {
        let mut group = c.benchmark_group(format!("write_random_{}", format_size(size)));
        group.throughput(Throughput::Bytes(size as u64));

        let data = generate_random_data(size);

        group.bench_with_input(BenchmarkId::new("deflate", size), &data, |b, data| {
            b.iter(|| write_single(EntryOptions::deflated(), data));
        });

        group.finish();
    }
}

fn bench_interleaved_entries(c: &mut Criterion) {
    let mut group = c.benchmark_group("write_interleaved_entries");

    let entry_count = 100;
    let entry_size = 10 * 1024; // 10KB per entry
    group.throughput(Throughput::Bytes((entry_count * entry_size) as u64));

    let data = generate_compressible_data(entry_size);

    group.bench_function("deflate_100_open_entries", |b| {
        b.iter(|| {
            let mut zip = ZipOutput::from_writer(Vec::new()).unwrap();
            let mut sinks: Vec<_> = (0..entry_count)
                .map(|i| {
                    zip.create_entry(&format!("file_{}.txt", i), EntryOptions::deflated())
                        .unwrap()
                })
                .collect();
            for chunk in data.chunks(1024) {
                for sink in sinks.iter_mut() {
                    sink.write_all(black_box(chunk)).unwrap();
                }
            }
            // finish in reverse to exercise out-of-order placement
            while let Some(sink) = sinks.pop() {
                sink.finish(&mut zip).unwrap();
            }
            zip.close().unwrap()
        });
    });

    group.finish();
}

fn format_size(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{}B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{}KB", bytes / 1024)
    } else {
        format!("{}MB", bytes / (1024 * 1024))
    }
}

criterion_group!(
    benches,
    bench_compression_methods,
    bench_random_data_compression,
    bench_interleaved_entries
);
criterion_main!(benches);
