use crate::SnowflakeId;

/// Represents the result of attempting to generate a new Snowflake ID without
/// blocking.
///
/// This type models the outcome of [`SnowflakeGenerator::try_poll_id`]:
///
/// - [`IdGenStatus::Ready`] indicates a new ID was successfully generated.
/// - [`IdGenStatus::Pending`] means the generator cannot produce a new ID
///   until the clock advances by `yield_for` milliseconds, either because the
///   sequence is exhausted for the current millisecond or because the clock is
///   behind the last issued timestamp.
///
/// # Example
///
/// ```
/// use snowmint::{IdGenStatus, LockSnowflakeGenerator, SnowflakeGenerator, TimeSource};
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1
///     }
/// }
///
/// let generator = LockSnowflakeGenerator::from_components(Some(1), 0, 4095, FixedTime).unwrap();
/// match generator.try_poll_id() {
///     IdGenStatus::Ready { id } => println!("ID: {id}"),
///     IdGenStatus::Pending { yield_for } => println!("Back off for {yield_for} ms"),
/// }
/// ```
///
/// [`SnowflakeGenerator::try_poll_id`]: crate::SnowflakeGenerator::try_poll_id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdGenStatus {
    /// A unique ID was generated and is ready to use.
    Ready {
        /// The generated Snowflake ID.
        id: SnowflakeId,
    },
    /// No ID could be generated yet.
    Pending {
        /// Milliseconds to wait before a retry can succeed.
        yield_for: u64,
    },
}
