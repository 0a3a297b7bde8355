use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use bounded_pool::{Config, WorkerPool};
use std::hint::black_box;

// Benchmark 1: submit + drain with no-op work
fn bench_submit_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("submit_drain");

    for size in [100u64, 1000, 10000] {
        group.throughput(Throughput::Elements(size));
        group.bench_with_input(BenchmarkId::new("noop", size), &size, |b, &size| {
            let pool = WorkerPool::new(Config::new(size as usize, 4), |id| {
                black_box(id);
                Ok(())
            })
            .unwrap();

            b.iter(|| {
                for id in 0..size {
                    let _ = pool.submit(id);
                }
                pool.wait_idle();
            });
        });
    }

    group.finish();
}

// Benchmark 2: worker count scaling
fn bench_thread_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("thread_scaling");
    group.sample_size(20);

    let tasks = 5000u64;
    group.throughput(Throughput::Elements(tasks));

    for threads in [1usize, 2, 4, 8, 16] {
        if threads <= num_cpus::get() * 2 {
            group.bench_with_input(BenchmarkId::new("threads", threads), &threads, |b, &threads| {
                let pool = WorkerPool::new(Config::new(tasks as usize, threads), |id| {
                    let mut acc = id;
                    for i in 0..200u64 {
                        acc = black_box(acc.rotate_left(7) ^ i);
                    }
                    Ok(())
                })
                .unwrap();

                b.iter(|| {
                    for id in 0..tasks {
                        let _ = pool.submit(id);
                    }
                    pool.wait_idle();
                });
            });
        }
    }

    group.finish();
}

// Benchmark 3: stats snapshot under load
fn bench_stats_under_load(c: &mut Criterion) {
    let pool = WorkerPool::new(Config::cpu_bound(), |id| {
        black_box(id);
        Ok(())
    })
    .unwrap();

    c.bench_function("stats_under_load", |b| {
        let mut next = 0u64;
        b.iter(|| {
            let _ = pool.submit(next);
            next += 1;
            black_box(pool.stats())
        });
    });
}

criterion_group!(
    benches,
    bench_submit_drain,
    bench_thread_scaling,
    bench_stats_under_load,
);
criterion_main!(benches);
