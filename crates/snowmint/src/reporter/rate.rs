use core::{fmt, time::Duration};
use portable_atomic::{AtomicBool, Ordering};
use std::{
    io::Write,
    sync::{Arc, Weak},
};

use tokio::{
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

use crate::SnowflakeGenerator;

/// Interval between two rate reports unless configured otherwise.
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(1);

/// Number of IDs a generator produced during one reporting interval.
///
/// Its [`Display`](fmt::Display) form is the line the reporter prints:
///
/// ```
/// use std::time::Duration;
/// use snowmint::RateSample;
///
/// let sample = RateSample { count: 4096, interval: Duration::from_secs(1) };
/// assert_eq!(
///     sample.to_string(),
///     "[ID Stats] Generated 4096 IDs in the last 1 second",
/// );
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RateSample {
    /// IDs produced during the interval.
    pub count: u64,
    /// Length of the interval.
    pub interval: Duration,
}

impl fmt::Display for RateSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ID Stats] Generated {} IDs in the last ", self.count)?;
        if self.interval.subsec_nanos() == 0 {
            match self.interval.as_secs() {
                1 => write!(f, "1 second"),
                secs => write!(f, "{secs} seconds"),
            }
        } else {
            write!(f, "{} milliseconds", self.interval.as_millis())
        }
    }
}

/// Background task that periodically reports how many IDs a generator
/// produced.
///
/// Every tick it takes the generator's counter (under the same lock used for
/// ID production, see [`SnowflakeGenerator::take_generated_count`]) and hands
/// a [`RateSample`] to its sink. It never touches the timestamp or sequence,
/// so IDs are identical with or without a reporter.
///
/// The reporter holds only a weak reference to the generator and stops on its
/// own once the generator is dropped. It also stops on [`Self::shutdown`] or
/// when the handle is dropped. [`Self::finish`] stops it after one last sample
/// covering the partial interval since the previous tick.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use snowmint::{DEFAULT_REPORT_INTERVAL, LockSnowflakeGenerator, RateReporter};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let generator = Arc::new(LockSnowflakeGenerator::create(1).unwrap());
/// let reporter = RateReporter::spawn(Arc::clone(&generator), DEFAULT_REPORT_INTERVAL);
///
/// generator.next_id();
///
/// reporter.shutdown().await;
/// # }
/// ```
#[derive(Debug)]
pub struct RateReporter {
    token: CancellationToken,
    flush_on_stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl RateReporter {
    /// Starts a reporter that writes one line per interval to stdout.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime or if `interval` is zero.
    pub fn spawn<G>(generator: Arc<G>, interval: Duration) -> Self
    where
        G: SnowflakeGenerator + Send + Sync + 'static,
    {
        Self::spawn_with_sink(generator, interval, |sample| {
            // stdout going away must not take the reporter down with it
            let _ = writeln!(std::io::stdout().lock(), "{sample}");
        })
    }

    /// Starts a reporter that passes every [`RateSample`] to `sink`.
    ///
    /// The generator's counter is reset when the reporter starts, so the
    /// first sample only covers the first interval.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime or if `interval` is zero.
    pub fn spawn_with_sink<G, F>(generator: Arc<G>, interval: Duration, sink: F) -> Self
    where
        G: SnowflakeGenerator + Send + Sync + 'static,
        F: FnMut(RateSample) + Send + 'static,
    {
        assert!(!interval.is_zero(), "report interval must be non-zero");
        generator.take_generated_count();

        let token = CancellationToken::new();
        let flush_on_stop = Arc::new(AtomicBool::new(false));
        let handle = tokio::spawn(report_loop(
            Arc::downgrade(&generator),
            interval,
            sink,
            token.clone(),
            Arc::clone(&flush_on_stop),
        ));

        Self {
            token,
            flush_on_stop,
            handle: Some(handle),
        }
    }

    /// Returns true once the background task has exited.
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Stops the reporter after it reported the IDs produced since the last
    /// tick, then waits for the background task to exit.
    ///
    /// The final [`RateSample`] carries the actual length of the partial
    /// interval. Nothing is reported if the generator is already gone.
    pub async fn finish(self) {
        self.flush_on_stop.store(true, Ordering::Release);
        self.shutdown().await;
    }

    /// Stops the reporter and waits for the background task to exit.
    ///
    /// IDs produced since the last tick stay in the generator's counter.
    pub async fn shutdown(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(_e) = handle.await {
                #[cfg(feature = "tracing")]
                tracing::error!("rate reporter task failed: {:?}", _e);
            }
        }
    }
}

impl Drop for RateReporter {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

async fn report_loop<G, F>(
    generator: Weak<G>,
    period: Duration,
    mut sink: F,
    token: CancellationToken,
    flush_on_stop: Arc<AtomicBool>,
) where
    G: SnowflakeGenerator + Send + Sync + 'static,
    F: FnMut(RateSample) + Send + 'static,
{
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    #[cfg(feature = "tracing")]
    tracing::debug!(?period, "rate reporter started");

    let mut last_report = Instant::now();
    loop {
        tokio::select! {
            biased;
            () = token.cancelled() => {
                if flush_on_stop.load(Ordering::Acquire) {
                    if let Some(generator) = generator.upgrade() {
                        report(&*generator, last_report.elapsed(), &mut sink);
                    }
                }
                break;
            }
            _ = ticker.tick() => {
                let Some(generator) = generator.upgrade() else {
                    break;
                };
                last_report = Instant::now();
                report(&*generator, period, &mut sink);
            }
        }
    }

    #[cfg(feature = "tracing")]
    tracing::debug!("rate reporter stopped");
}

fn report<G, F>(generator: &G, interval: Duration, sink: &mut F)
where
    G: SnowflakeGenerator,
    F: FnMut(RateSample),
{
    let sample = RateSample {
        count: generator.take_generated_count(),
        interval,
    };

    #[cfg(feature = "tracing")]
    tracing::debug!(
        worker_id = generator.worker_id(),
        count = sample.count,
        ?interval,
        "id generation rate"
    );

    sink(sample);
}
