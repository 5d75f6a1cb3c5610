//! Virtual time for a recording session.
//!
//! Every event timestamp comes from a [`TypingClock`]. Wall-clock readings
//! (the header start time and the duration of each command) come from a
//! [`TimeSource`], which tests replace with [`ManualTime`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant, SystemTime as StdSystemTime, UNIX_EPOCH};

use crate::error::{CastError, Result};

/// Session clock, in seconds since the header timestamp.
///
/// The value only ever grows: [`TypingClock::advance`] rejects negative and
/// non-finite deltas.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct TypingClock {
    ts: f64,
}

impl TypingClock {
    /// Create a clock at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self { ts: 0.0 }
    }

    /// Current value in seconds.
    #[must_use]
    pub const fn now(&self) -> f64 {
        self.ts
    }

    /// Move the clock forward by `delta` seconds and return the new value.
    pub fn advance(&mut self, delta: f64) -> Result<f64> {
        if !delta.is_finite() || delta < 0.0 {
            return Err(CastError::invalid_delay(delta));
        }
        self.ts += delta;
        Ok(self.ts)
    }

    /// Move the clock forward by a measured duration.
    pub fn advance_by(&mut self, elapsed: Duration) -> Result<f64> {
        self.advance(elapsed.as_secs_f64())
    }
}

/// Source of wall-clock readings.
pub trait TimeSource: Send + Sync + std::fmt::Debug {
    /// Current Unix time in whole seconds.
    fn unix_timestamp(&self) -> u64;

    /// Monotonic reading, used only for differences.
    fn monotonic(&self) -> Duration;
}

/// The host clocks.
#[derive(Debug, Clone, Copy)]
pub struct SystemTime {
    origin: Instant,
}

impl SystemTime {
    /// Create a time source anchored at the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemTime {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTime {
    fn unix_timestamp(&self) -> u64 {
        StdSystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs())
    }

    fn monotonic(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Deterministic time source for tests.
///
/// Each call to [`TimeSource::monotonic`] returns the current reading and
/// then moves it forward by `step`, so a command measured between two calls
/// appears to take exactly `step`.
#[derive(Debug)]
pub struct ManualTime {
    unix: AtomicU64,
    nanos: AtomicU64,
    step_nanos: u64,
}

impl ManualTime {
    /// Create a manual time source.
    #[must_use]
    pub fn new(unix_timestamp: u64, step: Duration) -> Self {
        Self {
            unix: AtomicU64::new(unix_timestamp),
            nanos: AtomicU64::new(0),
            step_nanos: u64::try_from(step.as_nanos()).unwrap_or(u64::MAX),
        }
    }

    /// Set the Unix timestamp reported from now on.
    pub fn set_unix_timestamp(&self, unix_timestamp: u64) {
        self.unix.store(unix_timestamp, Ordering::SeqCst);
    }

    /// Move the monotonic reading forward.
    pub fn advance(&self, by: Duration) {
        let by = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.nanos.fetch_add(by, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTime {
    fn unix_timestamp(&self) -> u64 {
        self.unix.load(Ordering::SeqCst)
    }

    fn monotonic(&self) -> Duration {
        Duration::from_nanos(self.nanos.fetch_add(self.step_nanos, Ordering::SeqCst))
    }
}
