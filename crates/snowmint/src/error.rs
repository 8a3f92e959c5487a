use crate::SnowflakeId;

/// A result type defaulting to the crate's [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors that `snowmint` can produce.
///
/// Producing an ID through [`LockSnowflakeGenerator::next_id`] never fails; the
/// only mandatory failure point is construction with an out-of-range worker
/// ID. The remaining variants come from the opt-in timeout, cancellation and
/// parsing APIs.
///
/// [`LockSnowflakeGenerator::next_id`]: crate::LockSnowflakeGenerator::next_id
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The worker ID passed at construction does not fit the 10-bit field.
    ///
    /// Treat this as a start-up configuration fault: the generator was not
    /// created and retrying with the same value will fail again.
    #[error("worker ID {worker_id} is out of range (expected 0..={max})")]
    InvalidWorkerId {
        /// The rejected worker ID.
        worker_id: i64,
        /// The largest accepted worker ID.
        max: u64,
    },

    /// The deadline passed before the clock advanced far enough to mint a new
    /// ID.
    #[error("timed out waiting for the clock to advance")]
    Timeout,

    /// The caller cancelled the request while the generator was waiting.
    #[error("ID generation was cancelled")]
    Cancelled,

    /// A value could not be interpreted as a [`SnowflakeId`].
    #[error("invalid snowflake ID: {reason}")]
    InvalidId {
        /// Why the value was rejected.
        reason: String,
    },
}

impl Error {
    pub(crate) const fn invalid_worker_id(worker_id: i64) -> Self {
        Self::InvalidWorkerId {
            worker_id,
            max: SnowflakeId::MAX_WORKER_ID,
        }
    }
}
