use core::{future::Future, time::Duration};

/// A trait that abstracts over how to wait for a given [`Duration`] in async
/// contexts.
///
/// Used by [`SnowflakeGeneratorAsyncExt`] while the generator reports
/// [`IdGenStatus::Pending`].
///
/// [`SnowflakeGeneratorAsyncExt`]: crate::SnowflakeGeneratorAsyncExt
/// [`IdGenStatus::Pending`]: crate::IdGenStatus::Pending
pub trait SleepProvider {
    /// Returns a future that completes after (roughly) `dur`.
    fn sleep_for(dur: Duration) -> impl Future<Output = ()> + Send;
}

/// An implementation of [`SleepProvider`] using Tokio's timer.
///
/// This is the default provider for use in async applications built on Tokio.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioSleep;

impl SleepProvider for TokioSleep {
    fn sleep_for(dur: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(dur)
    }
}

/// An implementation of [`SleepProvider`] using Tokio's yield.
///
/// This strategy avoids timer-based delays by yielding to the scheduler
/// immediately, which can improve responsiveness in low-concurrency scenarios.
///
/// However, it comes at the cost of more frequent rescheduling, which can
/// result in tighter polling loops and increased CPU usage under load. In
/// highly concurrent cases, a timer-based sleep (e.g., [`TokioSleep`]) is often
/// more efficient due to reduced scheduler churn.
#[derive(Clone, Copy, Debug, Default)]
pub struct TokioYield;

impl SleepProvider for TokioYield {
    fn sleep_for(_dur: Duration) -> impl Future<Output = ()> + Send {
        tokio::task::yield_now()
    }
}
