//! Benchmarks for particle file scanning and iteration

use corsika_formats::{EventIndex, FileStream, ParticleIterator, RawStream};
use corsika_test_utils::SyntheticFile;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use std::hint::black_box;
use std::io::Cursor;

/// Build the index of files with growing event counts.
fn bench_index_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_build");

    for events in [10u32, 100] {
        let bytes = SyntheticFile::multi_event(true, false, events, 40, true).to_bytes();
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(events), &bytes, |b, bytes| {
            b.iter(|| {
                let mut stream = RawStream::from_reader(Cursor::new(bytes.as_slice()))
                    .expect("Failed to open benchmark stream");
                black_box(EventIndex::build(&mut stream).expect("Failed to build index"))
            });
        });
    }

    group.finish();
}

/// Iterate every particle of one large event.
fn bench_particle_iteration(c: &mut Criterion) {
    let file = SyntheticFile::multi_event(false, false, 1, 500, false);
    let bytes = file.to_bytes();

    let mut group = c.benchmark_group("particle_iteration");
    group.throughput(Throughput::Elements(500 * 39));
    group.bench_function("not_thinned", |b| {
        b.iter(|| {
            let mut stream = RawStream::from_reader(Cursor::new(bytes.as_slice()))
                .expect("Failed to open benchmark stream");
            let particles =
                ParticleIterator::new(&mut stream, 2).expect("Failed to start iteration");
            let momentum: f32 = particles
                .map(|record| record.expect("Failed to read particle").px)
                .sum();
            black_box(momentum)
        });
    });
    group.finish();
}

/// Backward seeks on a gzip file, each replaying from the start.
fn bench_gzip_replay(c: &mut Criterion) {
    let dir = tempfile::tempdir().expect("Failed to create benchmark directory");
    let path = dir.path().join("DAT000001.gz");
    SyntheticFile::multi_event(false, false, 20, 40, false)
        .write_gzip_to(&path)
        .expect("Failed to write benchmark file");

    c.bench_function("gzip_replay_seek", |b| {
        let mut stream = FileStream::open(&path).expect("Failed to open gzip file");
        b.iter(|| {
            stream.seek(black_box(800)).expect("Failed to seek forward");
            stream.seek(black_box(1)).expect("Failed to seek back");
        });
    });
}

criterion_group!(
    benches,
    bench_index_build,
    bench_particle_iteration,
    bench_gzip_replay
);
criterion_main!(benches);
