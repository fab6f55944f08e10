//! Benchmarks for archive compression.

use criterion::{black_box, criterion_group, criterion_main, Criterion, BenchmarkId, Throughput};
use music_archiver::archive::compress::compress_directory;
use music_archiver::archive::CancelToken;
use std::fs;
use tempfile::TempDir;

/// Benchmark a library of albums with different track counts
fn bench_album_counts(c: &mut Criterion) {
    let mut group = c.benchmark_group("album_counts");
    let track_size = 64 * 1024;

    for albums in [1, 10, 50] {
        let library = TempDir::new().unwrap();
        let output_dir = TempDir::new().unwrap();

        for album in 0..albums {
            let album_dir = library.path().join(format!("album_{}", album));
            fs::create_dir_all(&album_dir).unwrap();
            for track in 0..10 {
                let data: Vec<u8> = (0..track_size).map(|i| (i % 251) as u8).collect();
                fs::write(album_dir.join(format!("track_{:02}.flac", track)), data).unwrap();
            }
        }

        group.throughput(Throughput::Bytes((albums * 10 * track_size) as u64));
        group.bench_with_input(
            BenchmarkId::new("compress_directory", format!("{}_albums", albums)),
            &(library.path(), output_dir.path()),
            |b, (source, dest)| {
                let cancel = CancelToken::new();
                b.iter(|| {
                    compress_directory(black_box(source), black_box(dest), &cancel).unwrap();
                });
            },
        );
    }

    group.finish();
}

/// Benchmark already-compressed audio against text that deflates well
fn bench_content_types(c: &mut Criterion) {
    let mut group = c.benchmark_group("content_types");

    let inputs = vec![
        ("mp3", "track.mp3", (0..512 * 1024).map(|i| (i * 7 % 256) as u8).collect::<Vec<u8>>()),
        ("text", "notes.txt", vec![b'A'; 512 * 1024]),
    ];

    for (label, filename, data) in inputs {
        let library = TempDir::new().unwrap();
        let output_dir = TempDir::new().unwrap();
        fs::write(library.path().join(filename), &data).unwrap();

        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("compress", label),
            &(library.path(), output_dir.path()),
            |b, (source, dest)| {
                let cancel = CancelToken::new();
                b.iter(|| {
                    compress_directory(black_box(source), black_box(dest), &cancel).unwrap();
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_album_counts, bench_content_types);
criterion_main!(benches);
