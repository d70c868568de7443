//! Throughput of `LogManager::write` under both durability modes, with and
//! without concurrent producers.

use std::sync::Arc;
use std::thread;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use femto_audit_log::test_doubles::RecordingSink;
use femto_audit_log::LogManager;

const RECORD: &[u8] = b"2026-08-01T00:00:00Z INFO service.worker: request handled in 3ms\n";

fn single_producer_best_effort(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_producer");

    group.bench_function("best_effort", |b| {
        let mut manager = LogManager::new(1024 * 1024);
        manager.set_file(RecordingSink::new());
        manager.start_fsync_thread();

        b.iter(|| {
            manager.write(black_box(RECORD)).expect("write");
        });

        manager.stop_fsync_thread();
    });

    group.bench_function("full_durability", |b| {
        let mut manager = LogManager::new(1024 * 1024);
        manager.set_file(RecordingSink::new());
        manager.set_full_durability_mode(true);
        manager.start_fsync_thread();

        b.iter(|| {
            manager.write(black_box(RECORD)).expect("write");
        });

        manager.stop_fsync_thread();
    });

    group.finish();
}

fn concurrent_producers_best_effort(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent_producers");

    for producers in [2usize, 4, 8] {
        group.bench_with_input(
            BenchmarkId::from_parameter(producers),
            &producers,
            |b, &producers| {
                let mut manager = LogManager::new(4 * 1024 * 1024);
                manager.set_file(RecordingSink::new());
                manager.start_fsync_thread();
                let manager = Arc::new(manager);

                b.iter(|| {
                    thread::scope(|scope| {
                        for _ in 0..producers {
                            let manager = Arc::clone(&manager);
                            scope.spawn(move || {
                                manager.write(black_box(RECORD)).expect("write");
                            });
                        }
                    });
                });

                // Arc::try_unwrap needs the only remaining handle; drop the
                // clone kept alive by the loop's final iteration first.
                drop(manager);
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    single_producer_best_effort,
    concurrent_producers_best_effort
);
criterion_main!(benches);
