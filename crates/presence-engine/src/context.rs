//! Engine-owned context: the last world snapshot plus manifestation history

use presence_core::{EmotionalTone, Millis, WorldContext};
use serde::Serialize;

pub const WISDOM_MIN: f64 = 1.0;
pub const WISDOM_MAX: f64 = 10.0;
pub const WISDOM_STEP: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriticalContext {
    pub world: WorldContext,
    /// None until the first manifestation.
    pub last_manifestation: Option<Millis>,
    pub manifestation_count: u32,
    pub silence_streak: u32,
    pub wisdom_level: f64,
    pub current_tone: EmotionalTone,
}

impl Default for CriticalContext {
    fn default() -> Self {
        Self {
            world: WorldContext::default(),
            last_manifestation: None,
            manifestation_count: 0,
            silence_streak: 0,
            wisdom_level: WISDOM_MIN,
            current_tone: EmotionalTone::Neutral,
        }
    }
}

impl CriticalContext {
    pub fn new(world: WorldContext) -> Self {
        Self {
            world,
            ..Default::default()
        }
    }

    /// Whether more than `window` ms passed since the last manifestation.
    /// Always true before the first one.
    pub fn quiet_for_more_than(&self, now: Millis, window: Millis) -> bool {
        match self.last_manifestation {
            Some(at) => now.saturating_sub(at) > window,
            None => true,
        }
    }

    pub fn record_manifestation(&mut self, now: Millis) {
        self.last_manifestation = Some(now);
        self.manifestation_count += 1;
        self.silence_streak = 0;
    }

    pub fn increment_silence(&mut self) {
        self.silence_streak += 1;
    }

    pub fn increment_wisdom(&mut self) {
        self.wisdom_level = (self.wisdom_level + WISDOM_STEP).min(WISDOM_MAX);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_manifested_is_always_quiet() {
        let ctx = CriticalContext::default();
        assert!(ctx.quiet_for_more_than(0, 300_000));
    }

    #[test]
    fn quiet_window_is_strict() {
        let mut ctx = CriticalContext::default();
        ctx.record_manifestation(1_000);
        assert!(!ctx.quiet_for_more_than(61_000, 60_000));
        assert!(ctx.quiet_for_more_than(61_001, 60_000));
    }

    #[test]
    fn manifestation_resets_silence() {
        let mut ctx = CriticalContext::default();
        ctx.increment_silence();
        ctx.increment_silence();
        ctx.record_manifestation(5);
        assert_eq!(ctx.silence_streak, 0);
        assert_eq!(ctx.manifestation_count, 1);
        assert_eq!(ctx.last_manifestation, Some(5));
    }

    #[test]
    fn wisdom_caps_at_ten() {
        let mut ctx = CriticalContext {
            wisdom_level: 9.95,
            ..Default::default()
        };
        ctx.increment_wisdom();
        assert_eq!(ctx.wisdom_level, WISDOM_MAX);
        ctx.increment_wisdom();
        assert_eq!(ctx.wisdom_level, WISDOM_MAX);
    }
}
