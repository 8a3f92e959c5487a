use core::time::Duration;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::{SNOWMINT_EPOCH, TimeSource};

/// A time source that samples the system wall clock on every call.
///
/// Each reading is `SystemTime::now()` in milliseconds minus the configured
/// epoch. The wall clock can be stepped backwards (NTP corrections, manual
/// changes); how the generator reacts to that is governed by its
/// [`ClockPolicy`]. Readings before the epoch saturate at zero.
///
/// [`ClockPolicy`]: crate::ClockPolicy
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WallClock {
    epoch_millis: u64,
}

impl Default for WallClock {
    /// Constructs a wall clock aligned to [`SNOWMINT_EPOCH`].
    fn default() -> Self {
        Self::with_epoch(SNOWMINT_EPOCH)
    }
}

impl WallClock {
    /// Constructs a wall clock using `epoch` (a [`Duration`] since
    /// 1970-01-01 UTC) as the origin.
    #[allow(clippy::cast_possible_truncation)]
    pub const fn with_epoch(epoch: Duration) -> Self {
        Self {
            epoch_millis: epoch.as_millis() as u64,
        }
    }

    /// Milliseconds since the Unix epoch, as reported by the system clock.
    #[allow(clippy::cast_possible_truncation)]
    pub fn unix_millis() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as u64)
    }
}

impl TimeSource for WallClock {
    fn current_millis(&self) -> u64 {
        Self::unix_millis().saturating_sub(self.epoch_millis)
    }
}
