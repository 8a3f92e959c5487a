use core::hint::black_box;
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use futures::future::join_all;
use snowmint::{
    IdGenStatus, LockSnowflakeGenerator, MonotonicClock, SnowflakeGenerator,
    SnowflakeGeneratorAsyncExt, TimeSource, TokioSleep, WallClock, YieldNow,
};
use std::{
    sync::{Arc, Barrier},
    thread::scope,
    time::Instant,
};
use tokio::runtime::Builder;

struct FixedMockTime {
    millis: u64,
}

impl TimeSource for FixedMockTime {
    fn current_millis(&self) -> u64 {
        self.millis
    }
}

// Number of IDs generated per benchmark iteration (per-thread for
// multi-threaded).
const TOTAL_IDS: usize = 4096;

/// Benchmarks a hot-path generator where IDs are always `Ready` (one full
/// millisecond of sequence space on a frozen clock).
fn bench_fixed_clock(c: &mut Criterion) {
    let mut group = c.benchmark_group("lock/fixed");
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        b.iter_custom(|iters| {
            let start = Instant::now();
            for _ in 0..iters {
                let generator =
                    LockSnowflakeGenerator::new(0, FixedMockTime { millis: 1 }).unwrap();
                for _ in 0..TOTAL_IDS {
                    match generator.try_poll_id() {
                        IdGenStatus::Ready { id } => {
                            black_box(id);
                        }
                        IdGenStatus::Pending { .. } => unreachable!(),
                    }
                }
            }
            start.elapsed()
        });
    });

    group.finish();
}

/// Benchmarks blocking generation against real clocks, including the spin
/// once a millisecond is exhausted.
fn bench_real_clock<G: SnowflakeGenerator>(
    c: &mut Criterion,
    group_name: &str,
    generator_fn: impl Fn() -> G,
) {
    let mut group = c.benchmark_group(group_name);
    group.throughput(Throughput::Elements(TOTAL_IDS as u64));

    group.bench_function(format!("elems/{TOTAL_IDS}"), |b| {
        let generator = generator_fn();
        b.iter(|| {
            for _ in 0..TOTAL_IDS {
                black_box(generator.next_id());
            }
        });
    });

    group.finish();
}

/// Benchmarks a shared generator across threads.
fn bench_contended<G: SnowflakeGenerator + Send + Sync>(
    c: &mut Criterion,
    group_name: &str,
    generator_fn: impl Fn() -> G,
) {
    let mut group = c.benchmark_group(group_name);

    for threads in [1, 2, 4, num_cpus::get().max(1)] {
        let total_ids = TOTAL_IDS * threads;
        group.throughput(Throughput::Elements(total_ids as u64));

        group.bench_function(format!("elems/{total_ids}/threads/{threads}"), |b| {
            b.iter_custom(|iters| {
                let mut elapsed = core::time::Duration::ZERO;
                for _ in 0..iters {
                    let generator = generator_fn();
                    let barrier = Barrier::new(threads + 1);
                    let start = scope(|s| {
                        for _ in 0..threads {
                            s.spawn(|| {
                                barrier.wait();
                                for _ in 0..TOTAL_IDS {
                                    black_box(generator.next_id());
                                }
                            });
                        }
                        barrier.wait();
                        Instant::now()
                    });
                    elapsed += start.elapsed();
                }
                elapsed
            });
        });
    }

    group.finish();
}

/// Benchmarks the async extension with many tasks sharing one generator.
fn bench_async_tokio(c: &mut Criterion) {
    let rt = Builder::new_multi_thread().enable_all().build().unwrap();
    let mut group = c.benchmark_group("lock/async/tokio");

    for tasks in [1, 8, 64] {
        let total_ids = TOTAL_IDS * tasks;
        group.throughput(Throughput::Elements(total_ids as u64));

        group.bench_function(format!("elems/{total_ids}/tasks/{tasks}"), |b| {
            b.to_async(&rt).iter(|| async move {
                let generator = Arc::new(LockSnowflakeGenerator::create(0).unwrap());
                let handles = (0..tasks).map(|_| {
                    let generator = Arc::clone(&generator);
                    tokio::spawn(async move {
                        for _ in 0..TOTAL_IDS {
                            black_box(generator.next_id_async_with::<TokioSleep>().await);
                        }
                    })
                });
                for result in join_all(handles).await {
                    result.unwrap();
                }
            });
        });
    }

    group.finish();
}

fn benches(c: &mut Criterion) {
    bench_fixed_clock(c);
    bench_real_clock(c, "lock/wall_clock", || LockSnowflakeGenerator::create(0).unwrap());
    bench_real_clock(c, "lock/mono_clock", || {
        LockSnowflakeGenerator::new(0, MonotonicClock::default()).unwrap()
    });
    bench_contended(c, "lock/contended/spin", || {
        LockSnowflakeGenerator::new(0, WallClock::default()).unwrap()
    });
    bench_contended(c, "lock/contended/yield", || {
        LockSnowflakeGenerator::create(0)
            .unwrap()
            .with_backoff(YieldNow)
    });
    bench_async_tokio(c);
}

criterion_group!(group, benches);
criterion_main!(group);
