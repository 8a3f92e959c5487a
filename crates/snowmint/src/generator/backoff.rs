/// How a blocking generator call spends its time while waiting for the clock
/// to advance.
///
/// The wait happens with the generator lock held, so every implementation
/// should return quickly; the generator re-reads the clock after each call.
pub trait Backoff {
    /// Called once per failed attempt.
    fn snooze(&self);
}

/// Busy-waits with [`core::hint::spin_loop`].
///
/// The lowest-latency choice: the next ID is minted as soon as the
/// millisecond ticks. This is the default.
#[derive(Clone, Copy, Debug, Default)]
pub struct SpinLoop;

impl Backoff for SpinLoop {
    #[inline]
    fn snooze(&self) {
        core::hint::spin_loop();
    }
}

/// Yields the thread to the OS scheduler between clock reads.
///
/// Friendlier to oversubscribed machines where a spinning thread would steal
/// time from the thread that is about to advance things.
#[derive(Clone, Copy, Debug, Default)]
pub struct YieldNow;

impl Backoff for YieldNow {
    #[inline]
    fn snooze(&self) {
        std::thread::yield_now();
    }
}
