use core::{future::Future, time::Duration};

use tokio_util::sync::CancellationToken;

use super::{SleepProvider, TokioSleep};
use crate::{Error, IdGenStatus, Result, SnowflakeGenerator, SnowflakeId};

/// Extension trait for asynchronously generating Snowflake IDs.
///
/// Instead of holding the generator lock while the clock catches up, these
/// methods use [`SnowflakeGenerator::try_poll_id`] and await a
/// [`SleepProvider`] between attempts, so waiting tasks never block a runtime
/// worker thread or each other.
///
/// # Example
///
/// ```
/// use snowmint::{LockSnowflakeGenerator, SnowflakeGeneratorAsyncExt};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let generator = LockSnowflakeGenerator::create(3).unwrap();
/// let id = generator.next_id_async().await;
/// assert_eq!(id.worker_id(), 3);
/// # }
/// ```
pub trait SnowflakeGeneratorAsyncExt {
    /// Returns a future that resolves to the next available ID, waiting with
    /// `S` whenever the generator is pending.
    fn next_id_async_with<S>(&self) -> impl Future<Output = SnowflakeId> + Send
    where
        S: SleepProvider;

    /// Same as [`Self::next_id_async_with`] using [`TokioSleep`].
    fn next_id_async(&self) -> impl Future<Output = SnowflakeId> + Send;

    /// Returns a future that resolves to the next available ID unless `token`
    /// is cancelled first.
    ///
    /// An ID that is ready on the first attempt is returned even if the token
    /// is already cancelled; cancellation only interrupts waiting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] if `token` fires while waiting.
    fn next_id_cancellable_with<S>(
        &self,
        token: &CancellationToken,
    ) -> impl Future<Output = Result<SnowflakeId>> + Send
    where
        S: SleepProvider;

    /// Same as [`Self::next_id_cancellable_with`] using [`TokioSleep`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Cancelled`] if `token` fires while waiting.
    fn next_id_cancellable(
        &self,
        token: &CancellationToken,
    ) -> impl Future<Output = Result<SnowflakeId>> + Send;
}

impl<G> SnowflakeGeneratorAsyncExt for G
where
    G: SnowflakeGenerator + Sync,
{
    fn next_id_async_with<S>(&self) -> impl Future<Output = SnowflakeId> + Send
    where
        S: SleepProvider,
    {
        async move {
            loop {
                let dur = match self.try_poll_id() {
                    IdGenStatus::Ready { id } => return id,
                    IdGenStatus::Pending { yield_for } => Duration::from_millis(yield_for),
                };
                S::sleep_for(dur).await;
            }
        }
    }

    fn next_id_async(&self) -> impl Future<Output = SnowflakeId> + Send {
        self.next_id_async_with::<TokioSleep>()
    }

    fn next_id_cancellable_with<S>(
        &self,
        token: &CancellationToken,
    ) -> impl Future<Output = Result<SnowflakeId>> + Send
    where
        S: SleepProvider,
    {
        async move {
            loop {
                let dur = match self.try_poll_id() {
                    IdGenStatus::Ready { id } => return Ok(id),
                    IdGenStatus::Pending { yield_for } => Duration::from_millis(yield_for),
                };
                tokio::select! {
                    biased;
                    () = token.cancelled() => {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(
                            worker_id = self.worker_id(),
                            "cancelled while waiting for clock"
                        );
                        return Err(Error::Cancelled);
                    }
                    () = S::sleep_for(dur) => {}
                }
            }
        }
    }

    fn next_id_cancellable(
        &self,
        token: &CancellationToken,
    ) -> impl Future<Output = Result<SnowflakeId>> + Send {
        self.next_id_cancellable_with::<TokioSleep>(token)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashSet,
        sync::{
            Arc,
            atomic::{AtomicU64, Ordering},
        },
        time::Duration,
    };

    use futures::future::try_join_all;

    use super::*;
    use crate::{LockSnowflakeGenerator, MonotonicClock, TimeSource, TokioYield, WallClock};

    const TOTAL_IDS: usize = 4096;
    const NUM_TASKS: usize = 8;
    const IDS_PER_TASK: usize = TOTAL_IDS * 4; // enough to exhaust several milliseconds

    #[derive(Clone, Default)]
    struct SharedTime(Arc<AtomicU64>);

    impl SharedTime {
        fn set(&self, millis: u64) {
            self.0.store(millis, Ordering::Relaxed);
        }
    }

    impl TimeSource for SharedTime {
        fn current_millis(&self) -> u64 {
            self.0.load(Ordering::Relaxed)
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn can_call_next_id_async() {
        let generator = LockSnowflakeGenerator::create(0).unwrap();
        let id = generator.next_id_async().await;
        assert_eq!(id.worker_id(), 0);

        let id2 = SnowflakeGeneratorAsyncExt::next_id_async_with::<TokioYield>(&generator).await;
        assert!(id2 > id);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_for_clock_to_advance() {
        let time = SharedTime::default();
        time.set(7);
        let generator = LockSnowflakeGenerator::from_components(Some(7), 4, 4095, time.clone())
            .unwrap();

        let ticker = tokio::spawn({
            let time = time.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                time.set(8);
            }
        });

        let id = generator.next_id_async().await;
        assert_eq!(id.timestamp(), 8);
        assert_eq!(id.sequence(), 0);
        assert_eq!(id.worker_id(), 4);
        ticker.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_interrupts_wait() {
        let time = SharedTime::default();
        time.set(7);
        let generator = LockSnowflakeGenerator::from_components(Some(7), 0, 4095, time).unwrap();

        let token = CancellationToken::new();
        let canceller = tokio::spawn({
            let token = token.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                token.cancel();
            }
        });

        let result = generator.next_id_cancellable(&token).await;
        assert_eq!(result, Err(Error::Cancelled));
        assert_eq!(generator.take_generated_count(), 0);
        canceller.await.unwrap();
    }

    #[tokio::test]
    async fn cancelled_token_still_returns_ready_id() {
        let generator = LockSnowflakeGenerator::create(1).unwrap();
        let token = CancellationToken::new();
        token.cancel();

        let id = generator.next_id_cancellable(&token).await.unwrap();
        assert_eq!(id.worker_id(), 1);
    }

    #[tokio::test]
    async fn cancelled_token_stops_pending_generator() {
        let time = SharedTime::default();
        time.set(3);
        let generator = LockSnowflakeGenerator::from_components(Some(3), 0, 4095, time).unwrap();
        let token = CancellationToken::new();
        token.cancel();

        let result = generator
            .next_id_cancellable_with::<TokioYield>(&token)
            .await;
        assert_eq!(result, Err(Error::Cancelled));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn shared_generator_unique_ids_sleep() {
        let generator = Arc::new(LockSnowflakeGenerator::create(0).unwrap());
        let ids = collect_from_tasks(generator, |g| async move {
            g.next_id_async_with::<TokioSleep>().await
        })
        .await;
        validate_unique(&ids);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn shared_generator_unique_ids_yield() {
        let generator = Arc::new(
            LockSnowflakeGenerator::new(0, MonotonicClock::default()).unwrap(),
        );
        let ids = collect_from_tasks(generator, |g| async move {
            g.next_id_async_with::<TokioYield>().await
        })
        .await;
        validate_unique(&ids);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn one_generator_per_worker_unique_ids() {
        let clock = WallClock::default();
        let tasks: Vec<_> = (0..NUM_TASKS)
            .map(|worker_id| {
                let generator =
                    LockSnowflakeGenerator::new(i64::try_from(worker_id).unwrap(), clock)
                        .unwrap();
                tokio::spawn(async move {
                    let mut ids = Vec::with_capacity(IDS_PER_TASK);
                    for _ in 0..IDS_PER_TASK {
                        ids.push(generator.next_id_async().await);
                    }
                    ids
                })
            })
            .collect();

        let ids: Vec<_> = try_join_all(tasks).await.unwrap().concat();
        validate_unique(&ids);
    }

    async fn collect_from_tasks<G, F, Fut>(generator: Arc<G>, next: F) -> Vec<SnowflakeId>
    where
        G: SnowflakeGenerator + Send + Sync + 'static,
        F: Fn(Arc<G>) -> Fut + Copy + Send + 'static,
        Fut: Future<Output = SnowflakeId> + Send + 'static,
    {
        let tasks: Vec<_> = (0..NUM_TASKS)
            .map(|_| {
                let generator = Arc::clone(&generator);
                tokio::spawn(async move {
                    let mut ids = Vec::with_capacity(IDS_PER_TASK);
                    for _ in 0..IDS_PER_TASK {
                        ids.push(next(Arc::clone(&generator)).await);
                    }
                    ids
                })
            })
            .collect();

        try_join_all(tasks).await.unwrap().concat()
    }

    fn validate_unique(ids: &[SnowflakeId]) {
        let expected_total = NUM_TASKS * IDS_PER_TASK;
        assert_eq!(ids.len(), expected_total);

        let mut seen = HashSet::with_capacity(ids.len());
        for id in ids {
            assert!(seen.insert(id), "Duplicate ID found: {id:?}");
        }
    }
}
