use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

const MICROS_PER_SEC: u64 = 1_000_000;

/// Wall-clock creation time with microsecond resolution.
///
/// Captured once when a ledger entry is constructed and included in its
/// hash input. It is never validated on its own.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp {
    unix_micros: u64,
}

impl Timestamp {
    /// The UNIX epoch. Used for the genesis entry.
    pub const UNIX_EPOCH: Self = Self { unix_micros: 0 };

    /// Create a timestamp from microseconds since the UNIX epoch.
    pub const fn from_unix_micros(unix_micros: u64) -> Self {
        Self { unix_micros }
    }

    /// The current wall-clock time.
    pub fn now() -> Self {
        let since_epoch = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self::from_duration(since_epoch)
    }

    /// Microseconds in `since_epoch`, saturating at `u64::MAX`.
    fn from_duration(since_epoch: Duration) -> Self {
        Self {
            unix_micros: u64::try_from(since_epoch.as_micros()).unwrap_or(u64::MAX),
        }
    }

    /// Microseconds since the UNIX epoch.
    pub fn unix_micros(&self) -> u64 {
        self.unix_micros
    }

    /// Whole seconds since the UNIX epoch.
    pub fn unix_secs(&self) -> u64 {
        self.unix_micros / MICROS_PER_SEC
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({self})")
    }
}

/// Renders as `secs.micros`, e.g. `1721476800.000123`.
impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:06}",
            self.unix_micros / MICROS_PER_SEC,
            self.unix_micros % MICROS_PER_SEC
        )
    }
}
