//! World context store: the single shared mutable snapshot
//!
//! Written by the context sensor, read by the engine and the whisper
//! selector. Owned by the session; there is no global instance.

use crate::clock::Timestamp;
use crate::world::{clamp_signal, WorldContext, WorldUpdate};

/// Friction added per behavioral signal (fast scroll, erratic pointer, click burst).
pub const FRICTION_STEP: f64 = 0.5;
/// Friction removed per idle tick.
pub const FRICTION_DECAY: f64 = 0.1;

#[derive(Debug, Clone, Default)]
pub struct WorldStore {
    world: WorldContext,
}

impl WorldStore {
    pub fn new(at: Timestamp) -> Self {
        Self {
            world: WorldContext::at(at),
        }
    }

    pub fn get(&self) -> &WorldContext {
        &self.world
    }

    /// Merge a partial update, recomputing hour flags from `at`.
    pub fn update(&mut self, update: &WorldUpdate, at: Timestamp) {
        self.world.apply(update, at);
    }

    /// Input arrived: idle time drops back to zero.
    pub fn record_activity(&mut self) {
        self.world.idle_time = 0;
    }

    pub fn increment_friction(&mut self) {
        self.add_friction(FRICTION_STEP);
    }

    pub fn decrement_friction(&mut self) {
        self.add_friction(-FRICTION_DECAY);
    }

    /// Add (or with a negative amount, remove) friction, clamped to 0-10.
    pub fn add_friction(&mut self, amount: f64) {
        self.world.friction = clamp_signal(self.world.friction + amount);
    }
}
