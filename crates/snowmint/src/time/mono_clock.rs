use core::time::Duration;
use portable_atomic::{AtomicU64, Ordering};
use std::{
    sync::{Arc, Weak},
    thread,
    time::Instant,
};

use crate::{SNOWMINT_EPOCH, TimeSource, WallClock};

/// A time source that is aligned to the wall clock once and then only moves
/// forward.
///
/// Backward wall-clock steps (NTP corrections, manual changes) never reach a
/// generator reading this clock. The cost is drift: a long running process
/// keeps its start-up alignment.
///
/// A detached ticker thread publishes the elapsed milliseconds into a shared
/// atomic, so reads never make a syscall. Clones share the ticker, and the
/// thread exits on its next tick after the last clone is dropped.
#[derive(Clone, Debug)]
pub struct MonotonicClock {
    elapsed: Arc<AtomicU64>,
    epoch_offset: u64,
}

impl Default for MonotonicClock {
    /// A monotonic clock counting from [`SNOWMINT_EPOCH`].
    fn default() -> Self {
        Self::with_epoch(SNOWMINT_EPOCH)
    }
}

impl MonotonicClock {
    /// A monotonic clock counting from `epoch`, given as a [`Duration`] since
    /// 1970-01-01 UTC.
    ///
    /// The start-up reading saturates at zero when the system clock is
    /// earlier than `epoch`, like [`WallClock`].
    ///
    /// # Example
    ///
    /// ```
    /// use std::time::{Duration, SystemTime, UNIX_EPOCH};
    /// use snowmint::{MonotonicClock, TimeSource};
    ///
    /// let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap();
    /// let clock = MonotonicClock::with_epoch(now);
    ///
    /// let first = clock.current_millis();
    /// std::thread::sleep(Duration::from_millis(5));
    /// assert!(clock.current_millis() >= first);
    /// ```
    pub fn with_epoch(epoch: Duration) -> Self {
        let anchor = Instant::now();
        let epoch_offset = WallClock::with_epoch(epoch).current_millis();

        let elapsed = Arc::new(AtomicU64::new(0));
        let ticker = Arc::downgrade(&elapsed);
        thread::spawn(move || run_ticker(&ticker, anchor));

        Self {
            elapsed,
            epoch_offset,
        }
    }
}

/// Publishes whole milliseconds since `anchor` until every clock sharing
/// `elapsed` is gone. The strong reference is only held while storing.
#[allow(clippy::cast_possible_truncation)]
fn run_ticker(elapsed: &Weak<AtomicU64>, anchor: Instant) {
    let mut next_tick = Duration::ZERO;
    loop {
        if let Some(wait) = next_tick.checked_sub(anchor.elapsed()) {
            thread::sleep(wait);
        }
        let Some(elapsed) = elapsed.upgrade() else {
            break;
        };
        let millis = anchor.elapsed().as_millis() as u64;
        elapsed.store(millis, Ordering::Relaxed);
        next_tick = Duration::from_millis(millis + 1);
    }
}

impl TimeSource for MonotonicClock {
    fn current_millis(&self) -> u64 {
        self.epoch_offset + self.elapsed.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_moves_backwards() {
        let clock = MonotonicClock::default();
        let mut last = clock.current_millis();
        for _ in 0..10_000 {
            let now = clock.current_millis();
            assert!(now >= last);
            last = now;
        }
    }

    #[test]
    fn starts_aligned_with_wall_clock() {
        let wall = WallClock::default().current_millis();
        let mono = MonotonicClock::default().current_millis();
        assert!(mono.abs_diff(wall) < 1_000);
    }

    #[test]
    fn advances_with_real_time() {
        let clock = MonotonicClock::default();
        let first = clock.current_millis();
        thread::sleep(Duration::from_millis(20));
        assert!(clock.current_millis() > first);
    }

    #[test]
    fn clones_share_one_ticker() {
        let clock = MonotonicClock::default();
        let clone = clock.clone();
        assert!(Arc::ptr_eq(&clock.elapsed, &clone.elapsed));
    }

    #[test]
    fn epoch_in_the_future_starts_at_zero() {
        let future = Duration::from_millis(WallClock::unix_millis() + 60_000);
        let clock = MonotonicClock::with_epoch(future);
        assert!(clock.current_millis() < 1_000);
    }
}
