//! Guard predicates
//!
//! Comparisons are strict. The two random draws are uniform in [0, 1) and
//! only taken once every deterministic condition already holds.

use crate::context::CriticalContext;
use crate::random::RandomSource;
use presence_core::Millis;
use serde::{Deserialize, Serialize};

pub const CRITICAL_FRICTION: f64 = 8.0;
pub const CRITICAL_RESTLESSNESS: f64 = 7.0;
pub const CRITICAL_COOLDOWN_MS: Millis = 60_000;

pub const LATE_NIGHT_FATIGUE: f64 = 6.0;
pub const LATE_NIGHT_FOCUS_MS: Millis = 30_000;
pub const LATE_NIGHT_COOLDOWN_MS: Millis = 300_000;

pub const LOST_IDLE_MS: Millis = 10_000;
pub const LOST_COOLDOWN_MS: Millis = 120_000;

pub const INTERESTING_MAX_VELOCITY: f64 = 2.0;
pub const INTERESTING_FOCUS_MS: Millis = 15_000;
pub const INTERESTING_ATTENTION: f64 = 7.0;

pub const SHIFT_VELOCITY: f64 = 5.0;
pub const SHIFT_RESTLESSNESS: f64 = 5.0;

pub const WORTH_MAX_SILENCE: u32 = 3;
pub const WORTH_MIN_WISDOM: f64 = 2.0;

pub const SPEAK_COOLDOWN_MS: Millis = 180_000;
pub const SPEAK_FRICTION: f64 = 3.0;
pub const SPEAK_MAX_MANIFESTATIONS: u32 = 10;

/// Thresholds a uniform draw must exceed. Tunable, not business rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawThresholds {
    pub worth_mentioning: f64,
    pub speak: f64,
}

impl Default for DrawThresholds {
    fn default() -> Self {
        Self {
            worth_mentioning: 0.7,
            speak: 0.5,
        }
    }
}

/// The user is struggling: high friction, erratic pointer, no recent manifestation.
pub fn critical_friction_detected(ctx: &CriticalContext, now: Millis) -> bool {
    ctx.world.friction > CRITICAL_FRICTION
        && ctx.world.mouse_restlessness > CRITICAL_RESTLESSNESS
        && ctx.quiet_for_more_than(now, CRITICAL_COOLDOWN_MS)
}

pub fn late_night_fatigue(ctx: &CriticalContext, now: Millis) -> bool {
    ctx.world.is_late_night
        && ctx.world.fatigue > LATE_NIGHT_FATIGUE
        && ctx.world.focus_duration > LATE_NIGHT_FOCUS_MS
        && ctx.quiet_for_more_than(now, LATE_NIGHT_COOLDOWN_MS)
}

pub fn user_seems_lost(ctx: &CriticalContext, now: Millis) -> bool {
    ctx.world.seems_lost
        && ctx.world.idle_time > LOST_IDLE_MS
        && !ctx.world.is_exploring
        && ctx.quiet_for_more_than(now, LOST_COOLDOWN_MS)
}

/// Calm, focused, attentive reading.
pub fn something_interesting(ctx: &CriticalContext) -> bool {
    ctx.world.scroll_velocity < INTERESTING_MAX_VELOCITY
        && ctx.world.focus_duration > INTERESTING_FOCUS_MS
        && ctx.world.attention > INTERESTING_ATTENTION
}

pub fn context_shift(ctx: &CriticalContext) -> bool {
    ctx.world.scroll_velocity > SHIFT_VELOCITY || ctx.world.mouse_restlessness > SHIFT_RESTLESSNESS
}

pub fn worth_mentioning(
    ctx: &CriticalContext,
    thresholds: &DrawThresholds,
    random: &mut dyn RandomSource,
) -> bool {
    ctx.silence_streak < WORTH_MAX_SILENCE
        && ctx.wisdom_level > WORTH_MIN_WISDOM
        && random.draw() > thresholds.worth_mentioning
}

pub fn decision_to_speak(
    ctx: &CriticalContext,
    now: Millis,
    thresholds: &DrawThresholds,
    random: &mut dyn RandomSource,
) -> bool {
    let should_speak = ctx.quiet_for_more_than(now, SPEAK_COOLDOWN_MS)
        && ctx.world.friction > SPEAK_FRICTION
        && ctx.manifestation_count < SPEAK_MAX_MANIFESTATIONS;

    should_speak && random.draw() > thresholds.speak
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{FixedDraw, ScriptedDraws};

    fn restless() -> CriticalContext {
        let mut ctx = CriticalContext::default();
        ctx.world.friction = 9.0;
        ctx.world.mouse_restlessness = 8.0;
        ctx
    }

    #[test]
    fn critical_friction_thresholds_are_strict() {
        let mut ctx = restless();
        assert!(critical_friction_detected(&ctx, 0));

        ctx.world.friction = 8.0;
        assert!(!critical_friction_detected(&ctx, 0));

        ctx.world.friction = 9.0;
        ctx.world.mouse_restlessness = 7.0;
        assert!(!critical_friction_detected(&ctx, 0));
    }

    #[test]
    fn critical_friction_cooldown() {
        let mut ctx = restless();
        ctx.record_manifestation(10_000);
        assert!(!critical_friction_detected(&ctx, 69_999));
        assert!(!critical_friction_detected(&ctx, 70_000));
        assert!(critical_friction_detected(&ctx, 70_001));
    }

    #[test]
    fn lost_requires_not_exploring() {
        let mut ctx = CriticalContext::default();
        ctx.world.seems_lost = true;
        ctx.world.idle_time = 10_001;
        assert!(user_seems_lost(&ctx, 0));

        ctx.world.is_exploring = true;
        assert!(!user_seems_lost(&ctx, 0));
    }

    #[test]
    fn context_shift_is_either_signal() {
        let mut ctx = CriticalContext::default();
        assert!(!context_shift(&ctx));
        ctx.world.scroll_velocity = 5.5;
        assert!(context_shift(&ctx));
        ctx.world.scroll_velocity = 0.0;
        ctx.world.mouse_restlessness = 5.5;
        assert!(context_shift(&ctx));
    }

    #[test]
    fn worth_mentioning_needs_wisdom_before_drawing() {
        let mut draws = ScriptedDraws::new([0.99], 0.0);
        let ctx = CriticalContext::default(); // wisdom 1
        assert!(!worth_mentioning(&ctx, &DrawThresholds::default(), &mut draws));
        assert_eq!(draws.remaining(), 1, "draw taken although wisdom gate failed");

        let wise = CriticalContext {
            wisdom_level: 2.5,
            ..Default::default()
        };
        assert!(worth_mentioning(&wise, &DrawThresholds::default(), &mut draws));
        assert!(!worth_mentioning(&wise, &DrawThresholds::default(), &mut FixedDraw(0.7)));
    }

    #[test]
    fn decision_to_speak_gates() {
        let mut ctx = CriticalContext::default();
        ctx.world.friction = 3.5;
        let thresholds = DrawThresholds::default();
        assert!(decision_to_speak(&ctx, 0, &thresholds, &mut FixedDraw(0.51)));
        assert!(!decision_to_speak(&ctx, 0, &thresholds, &mut FixedDraw(0.5)));

        ctx.manifestation_count = 10;
        assert!(!decision_to_speak(&ctx, 0, &thresholds, &mut FixedDraw(0.99)));

        ctx.manifestation_count = 0;
        ctx.record_manifestation(0);
        assert!(!decision_to_speak(&ctx, 180_000, &thresholds, &mut FixedDraw(0.99)));
        assert!(decision_to_speak(&ctx, 180_001, &thresholds, &mut FixedDraw(0.99)));
    }
}
