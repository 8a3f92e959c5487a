use crate::{IdGenStatus, SnowflakeId};

/// A minimal interface for generating Snowflake IDs.
///
/// Implemented by [`LockSnowflakeGenerator`]; the async extension and the
/// rate reporter are written against this trait.
///
/// [`LockSnowflakeGenerator`]: crate::LockSnowflakeGenerator
pub trait SnowflakeGenerator {
    /// The worker ID embedded in every ID this generator produces.
    fn worker_id(&self) -> u64;

    /// Generates the next ID, waiting for the clock if necessary.
    fn next_id(&self) -> SnowflakeId;

    /// Attempts to generate the next ID without waiting.
    ///
    /// The returned [`IdGenStatus`] contains either:
    /// - the newly generated ID, or
    /// - the number of milliseconds to wait before retrying.
    fn try_poll_id(&self) -> IdGenStatus;

    /// Reads and zeroes the number of IDs produced since the previous call.
    fn take_generated_count(&self) -> u64;
}
