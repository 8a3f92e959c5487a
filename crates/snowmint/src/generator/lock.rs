use core::{cmp::Ordering, convert::Infallible};
use std::time::Instant;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    Backoff, ClockPolicy, Error, IdGenStatus, Result, SnowflakeGenerator, SnowflakeId, SpinLoop,
    TimeSource, WallClock,
    generator::mutex::{Mutex, MutexGuard},
};

/// The mutable state of a generator. Always read and written as one unit
/// under the generator lock.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct GeneratorState {
    /// Timestamp of the last issued ID; `None` until the first ID.
    pub(crate) last_timestamp: Option<u64>,
    /// Sequence of the last issued ID within `last_timestamp`.
    pub(crate) sequence: u64,
    /// IDs issued since the counter was last taken.
    pub(crate) counter: u64,
}

/// A lock-based Snowflake ID generator suitable for multi-threaded
/// environments.
///
/// All mutable state (last timestamp, sequence and the diagnostic counter)
/// lives behind one [`parking_lot::Mutex`]. Share the generator across threads
/// with an [`Arc`](std::sync::Arc); independent instances never interfere
/// with each other.
///
/// ## Features
/// - ✅ Thread-safe
/// - ✅ Unique per instance for the lifetime of the generator
/// - ✅ Time-ordered under the default [`ClockPolicy::Wait`]
///
/// ## Blocking
/// [`Self::next_id`] holds the lock while it waits for the clock to advance
/// (4096 IDs were already issued this millisecond, or the clock is behind
/// under [`ClockPolicy::Wait`]). Other callers queue behind it. Use
/// [`Self::next_id_until`] to bound the wait or [`Self::try_poll_id`] to
/// never wait.
///
/// # Example
/// ```
/// use snowmint::{LockSnowflakeGenerator, SnowflakeId};
///
/// let generator = LockSnowflakeGenerator::create(7).unwrap();
/// let a = generator.next_id();
/// let b = generator.next_id();
///
/// assert!(b > a);
/// assert_eq!(a.worker_id(), 7);
/// ```
#[derive(Debug)]
pub struct LockSnowflakeGenerator<T = WallClock, B = SpinLoop> {
    #[cfg(feature = "cache-padded")]
    state: crossbeam_utils::CachePadded<Mutex<GeneratorState>>,
    #[cfg(not(feature = "cache-padded"))]
    state: Mutex<GeneratorState>,
    worker_id: u64,
    policy: ClockPolicy,
    time: T,
    backoff: B,
}

impl LockSnowflakeGenerator {
    /// Creates a generator for `worker_id` that reads the system wall clock,
    /// relative to [`SNOWMINT_EPOCH`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWorkerId`] unless `0 <= worker_id <= 1023`.
    ///
    /// [`SNOWMINT_EPOCH`]: crate::SNOWMINT_EPOCH
    pub fn create(worker_id: i64) -> Result<Self> {
        Self::new(worker_id, WallClock::default())
    }
}

impl<T> LockSnowflakeGenerator<T, SpinLoop>
where
    T: TimeSource,
{
    /// Creates a new [`LockSnowflakeGenerator`] for the given worker ID and
    /// time source.
    ///
    /// # Parameters
    ///
    /// - `worker_id`: A unique identifier for the node or instance generating
    ///   IDs, assigned out-of-band. Encoded into every generated ID.
    /// - `time`: A [`TimeSource`] implementation (e.g., [`WallClock`] or
    ///   [`MonotonicClock`]) that determines how timestamps are read.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWorkerId`] unless `0 <= worker_id <= 1023`.
    ///
    /// [`MonotonicClock`]: crate::MonotonicClock
    pub fn new(worker_id: i64, time: T) -> Result<Self> {
        Self::from_components(None, worker_id, 0, time)
    }

    /// Creates a new generator from explicit state.
    ///
    /// Useful for restoring state or for driving the generator into a
    /// specific situation (e.g. a full sequence) in tests. Prefer
    /// [`Self::new`] otherwise.
    ///
    /// # Parameters
    /// - `last_timestamp`: timestamp of the last issued ID, or `None` if no
    ///   ID was issued yet
    /// - `worker_id`: the worker identifier
    /// - `sequence`: the sequence of the last issued ID (truncated to 12
    ///   bits)
    /// - `time`: the [`TimeSource`] used to read the current time
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWorkerId`] unless `0 <= worker_id <= 1023`.
    pub fn from_components(
        last_timestamp: Option<u64>,
        worker_id: i64,
        sequence: u64,
        time: T,
    ) -> Result<Self> {
        let worker_id = u64::try_from(worker_id)
            .ok()
            .filter(|id| *id <= SnowflakeId::MAX_WORKER_ID)
            .ok_or(Error::invalid_worker_id(worker_id))?;

        let state = Mutex::new(GeneratorState {
            last_timestamp,
            sequence: sequence & SnowflakeId::SEQUENCE_MASK,
            counter: 0,
        });
        Ok(Self {
            #[cfg(feature = "cache-padded")]
            state: crossbeam_utils::CachePadded::new(state),
            #[cfg(not(feature = "cache-padded"))]
            state,
            worker_id,
            policy: ClockPolicy::default(),
            time,
            backoff: SpinLoop,
        })
    }
}

impl<T, B> LockSnowflakeGenerator<T, B>
where
    T: TimeSource,
    B: Backoff,
{
    /// Sets how the generator reacts to the clock reading earlier than the
    /// last issued timestamp.
    #[must_use]
    pub fn with_clock_policy(mut self, policy: ClockPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replaces the [`Backoff`] used while [`Self::next_id`] waits for the
    /// clock.
    pub fn with_backoff<B2: Backoff>(self, backoff: B2) -> LockSnowflakeGenerator<T, B2> {
        LockSnowflakeGenerator {
            state: self.state,
            worker_id: self.worker_id,
            policy: self.policy,
            time: self.time,
            backoff,
        }
    }

    /// The worker ID embedded in every ID.
    pub const fn worker_id(&self) -> u64 {
        self.worker_id
    }

    /// The active [`ClockPolicy`].
    pub const fn clock_policy(&self) -> ClockPolicy {
        self.policy
    }

    /// Generates the next ID.
    ///
    /// Reads the clock and updates the state under a single lock
    /// acquisition. If the current millisecond's 4096 sequence values are
    /// used up, the call keeps re-reading the clock (calling the
    /// [`Backoff`] between reads) until the next millisecond begins; the
    /// lock stays held for the whole wait.
    ///
    /// # Example
    /// ```
    /// use snowmint::{LockSnowflakeGenerator, WallClock};
    ///
    /// let generator = LockSnowflakeGenerator::new(1, WallClock::default()).unwrap();
    /// let id = generator.next_id();
    /// assert_eq!(id.worker_id(), 1);
    /// assert!(id.to_i64() > 0);
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_id(&self) -> SnowflakeId {
        match self.wait_for_id(|_| Ok::<(), Infallible>(())) {
            Ok(id) => id,
            Err(e) => match e {},
        }
    }

    /// Generates the next ID, giving up once `deadline` has passed.
    ///
    /// Behaves like [`Self::next_id`] but stops waiting for the clock at the
    /// deadline. A timed-out call leaves the generator state untouched.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] if no ID could be issued before `deadline`.
    ///
    /// # Example
    /// ```
    /// use std::time::{Duration, Instant};
    /// use snowmint::LockSnowflakeGenerator;
    ///
    /// let generator = LockSnowflakeGenerator::create(1).unwrap();
    /// let id = generator
    ///     .next_id_until(Instant::now() + Duration::from_millis(50))
    ///     .unwrap();
    /// assert_eq!(id.worker_id(), 1);
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn next_id_until(&self, deadline: Instant) -> Result<SnowflakeId> {
        self.wait_for_id(|_spins| {
            if Instant::now() >= deadline {
                Err(Error::Timeout)
            } else {
                Ok(())
            }
        })
    }

    /// Attempts to generate the next ID without waiting.
    ///
    /// Returns [`IdGenStatus::Ready`] with a new ID, or
    /// [`IdGenStatus::Pending`] with the number of milliseconds until a retry
    /// can succeed. The lock is released before returning, so callers may
    /// sleep, yield, or do other work between attempts.
    ///
    /// # Example
    /// ```
    /// use snowmint::{IdGenStatus, LockSnowflakeGenerator, SnowflakeId};
    ///
    /// let generator = LockSnowflakeGenerator::create(0).unwrap();
    ///
    /// let id: SnowflakeId = loop {
    ///     match generator.try_poll_id() {
    ///         IdGenStatus::Ready { id } => break id,
    ///         IdGenStatus::Pending { .. } => std::thread::yield_now(),
    ///     }
    /// };
    /// assert_eq!(id.worker_id(), 0);
    /// ```
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn try_poll_id(&self) -> IdGenStatus {
        let mut state = self.lock();
        let now = self.time.current_millis();
        self.advance(&mut state, now)
    }

    /// Reads and zeroes the count of IDs issued since the previous call.
    ///
    /// Takes the same lock as ID production, so every issued ID is counted
    /// in exactly one interval.
    pub fn take_generated_count(&self) -> u64 {
        core::mem::take(&mut self.lock().counter)
    }

    fn lock(&self) -> MutexGuard<'_, GeneratorState> {
        self.state.lock()
    }

    /// Runs the blocking loop: `check` is consulted after every failed
    /// attempt with the number of attempts so far, and aborts the wait by
    /// returning an error.
    fn wait_for_id<E>(
        &self,
        mut check: impl FnMut(u64) -> Result<(), E>,
    ) -> Result<SnowflakeId, E> {
        let mut state = self.lock();
        let mut spins = 0_u64;
        loop {
            let now = self.time.current_millis();
            match self.advance(&mut state, now) {
                IdGenStatus::Ready { id } => {
                    #[cfg(feature = "tracing")]
                    {
                        if spins > 0 {
                            tracing::debug!(
                                worker_id = self.worker_id,
                                spins,
                                "clock advanced after wait"
                            );
                        }
                    }
                    return Ok(id);
                }
                IdGenStatus::Pending { yield_for } => {
                    if let Err(e) = check(spins) {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(
                            worker_id = self.worker_id,
                            spins,
                            yield_for,
                            "stopped waiting for clock"
                        );
                        #[cfg(not(feature = "tracing"))]
                        let _ = yield_for;
                        return Err(e);
                    }
                    spins += 1;
                    self.backoff.snooze();
                }
            }
        }
    }

    /// One step of the algorithm against a clock reading `now`.
    fn advance(&self, state: &mut GeneratorState, now: u64) -> IdGenStatus {
        let Some(last) = state.last_timestamp else {
            return self.issue(state, now, 0);
        };

        match now.cmp(&last) {
            Ordering::Equal => {
                if state.sequence < SnowflakeId::MAX_SEQUENCE {
                    let sequence = state.sequence + 1;
                    self.issue(state, now, sequence)
                } else {
                    IdGenStatus::Pending { yield_for: 1 }
                }
            }
            Ordering::Greater => self.issue(state, now, 0),
            Ordering::Less => self.cold_clock_behind(state, now, last),
        }
    }

    fn issue(&self, state: &mut GeneratorState, timestamp: u64, sequence: u64) -> IdGenStatus {
        debug_assert!(timestamp <= SnowflakeId::MAX_TIMESTAMP, "timestamp overflow");
        state.last_timestamp = Some(timestamp);
        state.sequence = sequence;
        state.counter += 1;
        IdGenStatus::Ready {
            id: SnowflakeId::from_components(timestamp, self.worker_id, sequence),
        }
    }

    #[cold]
    #[inline(never)]
    fn cold_clock_behind(&self, state: &mut GeneratorState, now: u64, last: u64) -> IdGenStatus {
        match self.policy {
            ClockPolicy::Reset => {
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    worker_id = self.worker_id,
                    now,
                    last,
                    "clock moved backwards; resetting sequence"
                );
                self.issue(state, now, 0)
            }
            ClockPolicy::Wait => IdGenStatus::Pending {
                yield_for: last - now,
            },
        }
    }
}

impl<T, B> SnowflakeGenerator for LockSnowflakeGenerator<T, B>
where
    T: TimeSource,
    B: Backoff,
{
    fn worker_id(&self) -> u64 {
        self.worker_id()
    }

    fn next_id(&self) -> SnowflakeId {
        self.next_id()
    }

    fn try_poll_id(&self) -> IdGenStatus {
        self.try_poll_id()
    }

    fn take_generated_count(&self) -> u64 {
        self.take_generated_count()
    }
}

#[cfg(test)]
impl<T, B> LockSnowflakeGenerator<T, B> {
    pub(crate) fn state(&self) -> GeneratorState {
        *self.state.lock()
    }

    pub(crate) fn set_state(&self, last_timestamp: Option<u64>, sequence: u64) {
        let mut state = self.state.lock();
        state.last_timestamp = last_timestamp;
        state.sequence = sequence;
    }
}
