//! Critical engine: owns the presence state and context, applies effects

use crate::context::CriticalContext;
use crate::guards::DrawThresholds;
use crate::machine::{step, Effect, EngineEvent, Input, PresenceState, Transition};
use crate::random::{self, RandomSource};
use presence_core::{Clock, ConsciousnessState, EmotionalTone, Millis, Timestamp, WorldContext};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// TIME_TICK cadence in milliseconds.
    pub tick_ms: Millis,
    /// Seed for the guard random source. Unset draws from OS entropy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// A sensing timeout whispers only when a uniform draw exceeds this.
    pub worth_mentioning_draw: f64,
    /// A pondering timeout whispers only when a uniform draw exceeds this.
    pub speak_draw: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let draws = DrawThresholds::default();
        Self {
            tick_ms: 2_000,
            seed: None,
            worth_mentioning_draw: draws.worth_mentioning,
            speak_draw: draws.speak,
        }
    }
}

impl EngineConfig {
    pub fn thresholds(&self) -> DrawThresholds {
        DrawThresholds {
            worth_mentioning: self.worth_mentioning_draw,
            speak: self.speak_draw,
        }
    }
}

/// A state change produced by one event or timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StateChange {
    pub from: ConsciousnessState,
    pub to: ConsciousnessState,
    pub at: Millis,
    pub tone: EmotionalTone,
    pub reason: &'static str,
}

pub struct CriticalEngine {
    state: PresenceState,
    context: CriticalContext,
    thresholds: DrawThresholds,
    random: Box<dyn RandomSource>,
}

impl CriticalEngine {
    /// Start dormant at `now` with the configured (or entropy-seeded) random source.
    pub fn new(config: &EngineConfig, now: Timestamp) -> Self {
        Self::with_random(config, now, Box::new(random::from_seed(config.seed)))
    }

    pub fn with_random(config: &EngineConfig, now: Timestamp, random: Box<dyn RandomSource>) -> Self {
        Self {
            state: PresenceState::Dormant { since: now.millis },
            context: CriticalContext::new(WorldContext::at(now)),
            thresholds: config.thresholds(),
            random,
        }
    }

    pub fn state(&self) -> ConsciousnessState {
        self.state.kind()
    }

    pub fn presence(&self) -> &PresenceState {
        &self.state
    }

    pub fn context(&self) -> &CriticalContext {
        &self.context
    }

    pub fn tone(&self) -> EmotionalTone {
        self.context.current_tone
    }

    pub fn intensity(&self) -> f64 {
        self.state.kind().intensity()
    }

    /// When the current state's timeout fires, if it has one.
    pub fn next_deadline(&self) -> Option<Millis> {
        self.state.deadline()
    }

    /// Deliver an external event. Unhandled events are no-ops.
    pub fn send(&mut self, event: EngineEvent, now: Timestamp) -> Option<StateChange> {
        let transition = step(
            &self.state,
            &self.context,
            Input::Event(&event),
            now.millis,
            &self.thresholds,
            self.random.as_mut(),
        );
        if transition.is_ignored() {
            debug!("{} ignored in {}", event.name(), self.state.kind());
            return None;
        }
        self.apply(transition, now)
    }

    /// Fire the current state's timeout if its deadline is at or before `now`.
    /// Processed at the deadline itself, stamped by `clock` at that instant.
    pub fn poll_timeout(&mut self, now: Millis, clock: &dyn Clock) -> Option<StateChange> {
        let deadline = self.state.deadline().filter(|d| *d <= now)?;
        let at = clock.at(deadline);
        let transition = step(
            &self.state,
            &self.context,
            Input::Timeout,
            deadline,
            &self.thresholds,
            self.random.as_mut(),
        );
        self.apply(transition, at)
    }

    /// Fire every timeout due up to `now`, chaining through states.
    pub fn advance(&mut self, now: Millis, clock: &dyn Clock) -> Vec<StateChange> {
        let mut changes = Vec::new();
        while let Some(change) = self.poll_timeout(now, clock) {
            changes.push(change);
        }
        changes
    }

    fn apply(&mut self, transition: Transition, at: Timestamp) -> Option<StateChange> {
        for effect in &transition.effects {
            match effect {
                Effect::UpdateWorld(update) => self.context.world.apply(update, at),
                Effect::SetTone(tone) => self.context.current_tone = *tone,
                Effect::RecordManifestation => self.context.record_manifestation(at.millis),
                Effect::IncrementSilence => self.context.increment_silence(),
                Effect::IncrementWisdom => self.context.increment_wisdom(),
                Effect::ResetTone => self.context.current_tone = EmotionalTone::Neutral,
            }
        }

        let next = transition.next?;
        let from = self.state.kind();
        self.state = next;

        let change = StateChange {
            from,
            to: next.kind(),
            at: at.millis,
            tone: self.context.current_tone,
            reason: transition.reason,
        };

        if change.to.is_manifestation() {
            info!(
                "manifesting: {} -> {} ({}, tone {}, #{})",
                change.from, change.to, change.reason, change.tone, self.context.manifestation_count
            );
        } else {
            debug!("{} -> {} ({})", change.from, change.to, change.reason);
        }

        Some(change)
    }
}

impl std::fmt::Debug for CriticalEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CriticalEngine")
            .field("state", &self.state)
            .field("context", &self.context)
            .field("thresholds", &self.thresholds)
            .finish_non_exhaustive()
    }
}
