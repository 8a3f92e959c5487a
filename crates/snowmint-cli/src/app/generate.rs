use crate::app::config::{ClockArg, GenerateConfig};
use anyhow::Context;
use snowmint::{LockSnowflakeGenerator, MonotonicClock, RateReporter, TimeSource, WallClock};
use std::{
    io::{self, Write},
    sync::Arc,
    thread,
    time::{Duration, Instant},
};
use tokio::signal;

/// Runs `snowmint generate` to completion.
pub async fn run(config: GenerateConfig) -> anyhow::Result<()> {
    match config.clock {
        ClockArg::Wall => run_with_clock(config, WallClock::default()).await,
        ClockArg::Monotonic => run_with_clock(config, MonotonicClock::default()).await,
    }
}

async fn run_with_clock<T>(config: GenerateConfig, clock: T) -> anyhow::Result<()>
where
    T: TimeSource + Send + Sync + 'static,
{
    let generator = Arc::new(
        LockSnowflakeGenerator::new(config.worker_id, clock)
            .context("failed to create generator")?
            .with_clock_policy(config.clock_policy),
    );

    let reporter = config
        .report_interval
        .map(|interval| RateReporter::spawn(Arc::clone(&generator), interval));

    tracing::info!(
        worker_id = generator.worker_id(),
        count = config.count,
        threads = config.threads,
        clock = ?config.clock,
        policy = ?config.clock_policy,
        "Generating IDs"
    );

    let started = Instant::now();
    let workers: Vec<_> = split_count(config.count, config.threads)
        .into_iter()
        .map(|count| {
            let generator = Arc::clone(&generator);
            let (pause, print) = (config.pause, config.print);
            tokio::task::spawn_blocking(move || mint(&generator, count, pause, print))
        })
        .collect();

    let mut generated = 0;
    for worker in workers {
        generated += worker.await.context("generator thread panicked")??;
    }

    let elapsed = started.elapsed();
    tracing::info!(
        generated,
        elapsed_ms = elapsed.as_millis() as u64,
        "Finished generating IDs"
    );

    if config.hold {
        tracing::info!("Holding until Ctrl+C or SIGTERM");
        shutdown_signal().await?;
    }

    if let Some(reporter) = reporter {
        reporter.finish().await;
    }
    Ok(())
}

/// Generates `count` IDs on the calling thread and returns how many were
/// produced.
fn mint<T>(
    generator: &LockSnowflakeGenerator<T>,
    count: u64,
    pause: Duration,
    print: bool,
) -> io::Result<u64>
where
    T: TimeSource,
{
    for _ in 0..count {
        let id = generator.next_id();
        if print {
            // per-line lock so the reporter can interleave its lines
            writeln!(io::stdout().lock(), "{id}")?;
        }
        if !pause.is_zero() {
            thread::sleep(pause);
        }
    }
    Ok(count)
}

/// Splits `total` into `parts` shares that differ by at most one.
fn split_count(total: u64, parts: usize) -> Vec<u64> {
    let parts_u64 = parts as u64;
    let (base, remainder) = (total / parts_u64, total % parts_u64);
    (0..parts_u64)
        .map(|i| base + u64::from(i < remainder))
        .collect()
}

async fn shutdown_signal() -> io::Result<()> {
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())?
            .recv()
            .await;
        Ok::<(), io::Error>(())
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<io::Result<()>>();

    tokio::select! {
        res = signal::ctrl_c() => {
            res?;
            tracing::info!("Received Ctrl+C signal");
        },
        res = terminate => {
            res?;
            tracing::info!("Received SIGTERM signal");
        },
    }
    Ok(())
}
