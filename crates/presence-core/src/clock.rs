//! Wall-clock abstraction
//!
//! Every consumer reads time through a [`Clock`]. A [`Timestamp`] carries the
//! millisecond instant together with the local hour computed from that same
//! instant, so hour-derived flags can never disagree with the time they were
//! computed for.

use chrono::{Local, TimeZone, Timelike, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Milliseconds since the Unix epoch (or since an arbitrary origin for manual clocks).
pub type Millis = u64;

pub const HOUR_MS: Millis = 3_600_000;

/// A single instant: milliseconds plus the local hour (0-23) of that instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timestamp {
    pub millis: Millis,
    pub hour: u8,
}

impl Timestamp {
    pub fn new(millis: Millis, hour: u8) -> Self {
        Self {
            millis,
            hour: hour % 24,
        }
    }

    /// Milliseconds elapsed since `earlier`, saturating at zero.
    pub fn since(&self, earlier: Millis) -> Millis {
        self.millis.saturating_sub(earlier)
    }
}

pub trait Clock: Send + Sync {
    /// Current instant in milliseconds.
    fn now_millis(&self) -> Millis;

    /// Resolve an arbitrary instant into a timestamp (computes its local hour).
    fn at(&self, millis: Millis) -> Timestamp;

    fn now(&self) -> Timestamp {
        self.at(self.now_millis())
    }
}

/// Real time, local hour from the host timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> Millis {
        Utc::now().timestamp_millis().max(0) as Millis
    }

    fn at(&self, millis: Millis) -> Timestamp {
        let hour = Local
            .timestamp_millis_opt(millis as i64)
            .earliest()
            .map(|t| t.hour() as u8)
            .unwrap_or(0);
        Timestamp::new(millis, hour)
    }
}

/// Manually driven clock for simulation and tests.
///
/// The hour is derived from the millisecond value as if it were UTC, so
/// `ManualClock::starting_at_hour(23)` starts at 23:00 on day zero.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    millis: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start: Millis) -> Self {
        Self {
            millis: Arc::new(AtomicU64::new(start)),
        }
    }

    pub fn starting_at_hour(hour: u8) -> Self {
        Self::new((hour % 24) as Millis * HOUR_MS)
    }

    pub fn set(&self, millis: Millis) {
        self.millis.store(millis, Ordering::SeqCst);
    }

    pub fn advance(&self, delta: Millis) -> Millis {
        self.millis.fetch_add(delta, Ordering::SeqCst) + delta
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> Millis {
        self.millis.load(Ordering::SeqCst)
    }

    fn at(&self, millis: Millis) -> Timestamp {
        Timestamp::new(millis, ((millis / HOUR_MS) % 24) as u8)
    }
}
