//! Cadence scheduler
//!
//! Owns every periodic cadence of a session on one clock. The session asks
//! for the earliest due entry up to a target instant and processes entries in
//! timestamp order; equal instants resolve in registration order.

use presence_core::Millis;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Cadence {
    /// Sensor recompute of idle time, fatigue, focus and attention.
    SensorTick,
    /// Engine TIME_TICK.
    EngineTick,
}

#[derive(Debug, Clone)]
struct Entry {
    cadence: Cadence,
    interval: Millis,
    next_due: Millis,
}

#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    entries: Vec<Entry>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a cadence whose first firing is one interval after `start`.
    pub fn every(mut self, cadence: Cadence, interval: Millis, start: Millis) -> Self {
        let interval = interval.max(1);
        self.entries.push(Entry {
            cadence,
            interval,
            next_due: start + interval,
        });
        self
    }

    /// Earliest instant at which any cadence is due.
    pub fn next_due(&self) -> Option<Millis> {
        self.entries.iter().map(|e| e.next_due).min()
    }

    /// Take the earliest cadence due at or before `until`, rescheduling it.
    pub fn pop_due(&mut self, until: Millis) -> Option<(Millis, Cadence)> {
        let entry = self
            .entries
            .iter_mut()
            .filter(|e| e.next_due <= until)
            .min_by_key(|e| e.next_due)?;
        let due = entry.next_due;
        entry.next_due += entry.interval;
        Some((due, entry.cadence))
    }
}
