//! Presence state machine
//!
//! Each state carries only what is valid for it: states with a timeout carry
//! the instant they were entered, `Observing` carries nothing. [`step`] is a
//! pure interpretation of the transition table; it returns the next state (if
//! any) and the effects to apply to the context, in order: transition actions
//! first, then entry actions of the target.
//!
//! ```text
//! dormant      --5s-->                          observing
//! observing    --tick[criticalFriction]-->      interrupting   (tone concerned)
//!              --tick[lateNightFatigue]-->      whispering     (tone concerned)
//!              --tick[userSeemsLost]-->         whispering     (tone encouraging)
//!              --tick[somethingInteresting]-->  pondering      (tone curious)
//!              --tick[contextShift]-->          sensing
//! sensing      --2s[worthMentioning]-->         whispering | observing
//! pondering    --3s[decisionToSpeak]-->         whispering | observing (+silence)
//!              --forceRetreat-->                retreating
//! whispering   --8s | ack (+wisdom) | complete | forceRetreat--> retreating
//! interrupting --15s | forceRetreat-->          retreating
//!              --ack (+wisdom)-->               observing
//! retreating   --2s-->                          observing
//! ```

use crate::context::CriticalContext;
use crate::guards::{self, DrawThresholds};
use crate::random::RandomSource;
use presence_core::{ConsciousnessState, EmotionalTone, Millis, WorldUpdate};

pub const DORMANT_TIMEOUT_MS: Millis = 5_000;
pub const SENSING_TIMEOUT_MS: Millis = 2_000;
pub const PONDERING_TIMEOUT_MS: Millis = 3_000;
pub const WHISPERING_TIMEOUT_MS: Millis = 8_000;
pub const INTERRUPTING_TIMEOUT_MS: Millis = 15_000;
pub const RETREATING_TIMEOUT_MS: Millis = 2_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceState {
    Dormant { since: Millis },
    Observing,
    Sensing { since: Millis },
    Pondering { since: Millis },
    Whispering { since: Millis },
    Interrupting { since: Millis },
    Retreating { since: Millis },
}

impl PresenceState {
    /// Enter `kind` at `now`.
    pub fn enter(kind: ConsciousnessState, now: Millis) -> Self {
        match kind {
            ConsciousnessState::Dormant => PresenceState::Dormant { since: now },
            ConsciousnessState::Observing => PresenceState::Observing,
            ConsciousnessState::Sensing => PresenceState::Sensing { since: now },
            ConsciousnessState::Pondering => PresenceState::Pondering { since: now },
            ConsciousnessState::Whispering => PresenceState::Whispering { since: now },
            ConsciousnessState::Interrupting => PresenceState::Interrupting { since: now },
            ConsciousnessState::Retreating => PresenceState::Retreating { since: now },
        }
    }

    pub fn kind(&self) -> ConsciousnessState {
        match self {
            PresenceState::Dormant { .. } => ConsciousnessState::Dormant,
            PresenceState::Observing => ConsciousnessState::Observing,
            PresenceState::Sensing { .. } => ConsciousnessState::Sensing,
            PresenceState::Pondering { .. } => ConsciousnessState::Pondering,
            PresenceState::Whispering { .. } => ConsciousnessState::Whispering,
            PresenceState::Interrupting { .. } => ConsciousnessState::Interrupting,
            PresenceState::Retreating { .. } => ConsciousnessState::Retreating,
        }
    }

    /// Instant at which the state's timeout fires, if it has one.
    pub fn deadline(&self) -> Option<Millis> {
        let (since, timeout) = match *self {
            PresenceState::Dormant { since } => (since, DORMANT_TIMEOUT_MS),
            PresenceState::Observing => return None,
            PresenceState::Sensing { since } => (since, SENSING_TIMEOUT_MS),
            PresenceState::Pondering { since } => (since, PONDERING_TIMEOUT_MS),
            PresenceState::Whispering { since } => (since, WHISPERING_TIMEOUT_MS),
            PresenceState::Interrupting { since } => (since, INTERRUPTING_TIMEOUT_MS),
            PresenceState::Retreating { since } => (since, RETREATING_TIMEOUT_MS),
        };
        Some(since + timeout)
    }

    fn accepts_world_updates(&self) -> bool {
        matches!(
            self,
            PresenceState::Dormant { .. }
                | PresenceState::Observing
                | PresenceState::Sensing { .. }
                | PresenceState::Pondering { .. }
        )
    }
}

/// Events accepted from outside the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    WorldUpdate(WorldUpdate),
    TimeTick,
    ManifestationComplete,
    UserAcknowledged,
    ForceRetreat,
}

impl EngineEvent {
    pub fn name(&self) -> &'static str {
        match self {
            EngineEvent::WorldUpdate(_) => "WORLD_UPDATE",
            EngineEvent::TimeTick => "TIME_TICK",
            EngineEvent::ManifestationComplete => "MANIFESTATION_COMPLETE",
            EngineEvent::UserAcknowledged => "USER_ACKNOWLEDGED",
            EngineEvent::ForceRetreat => "FORCE_RETREAT",
        }
    }
}

/// What `step` reacts to: an external event or the current state's timeout.
#[derive(Debug, Clone, Copy)]
pub enum Input<'a> {
    Event(&'a EngineEvent),
    Timeout,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    UpdateWorld(WorldUpdate),
    SetTone(EmotionalTone),
    RecordManifestation,
    IncrementSilence,
    IncrementWisdom,
    ResetTone,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// None keeps the current state without re-entering it.
    pub next: Option<PresenceState>,
    pub effects: Vec<Effect>,
    /// Which guard or trigger produced the transition.
    pub reason: &'static str,
}

impl Transition {
    fn ignored() -> Self {
        Self {
            next: None,
            effects: Vec::new(),
            reason: "ignored",
        }
    }

    fn stay(effects: Vec<Effect>, reason: &'static str) -> Self {
        Self {
            next: None,
            effects,
            reason,
        }
    }

    fn to(kind: ConsciousnessState, now: Millis, mut actions: Vec<Effect>, reason: &'static str) -> Self {
        actions.extend(entry_effects(kind));
        Self {
            next: Some(PresenceState::enter(kind, now)),
            effects: actions,
            reason,
        }
    }

    pub fn is_ignored(&self) -> bool {
        self.next.is_none() && self.effects.is_empty()
    }
}

fn entry_effects(kind: ConsciousnessState) -> Vec<Effect> {
    match kind {
        ConsciousnessState::Whispering | ConsciousnessState::Interrupting => {
            vec![Effect::RecordManifestation]
        }
        ConsciousnessState::Retreating => vec![Effect::ResetTone],
        _ => Vec::new(),
    }
}

/// Interpret one input against the transition table.
///
/// `now` is the instant the input is processed (for a timeout, the state's
/// deadline). Random draws are only taken by the sensing and pondering
/// timeouts.
pub fn step(
    state: &PresenceState,
    ctx: &CriticalContext,
    input: Input<'_>,
    now: Millis,
    thresholds: &DrawThresholds,
    random: &mut dyn RandomSource,
) -> Transition {
    use ConsciousnessState as S;

    if let Input::Event(EngineEvent::WorldUpdate(update)) = input {
        return if state.accepts_world_updates() {
            Transition::stay(vec![Effect::UpdateWorld(update.clone())], "world update")
        } else {
            Transition::ignored()
        };
    }

    match (state, input) {
        (PresenceState::Dormant { .. }, Input::Timeout) => {
            Transition::to(S::Observing, now, vec![], "dormant timeout")
        }

        (PresenceState::Observing, Input::Event(EngineEvent::TimeTick)) => {
            if guards::critical_friction_detected(ctx, now) {
                Transition::to(
                    S::Interrupting,
                    now,
                    vec![Effect::SetTone(EmotionalTone::Concerned)],
                    "critical friction",
                )
            } else if guards::late_night_fatigue(ctx, now) {
                Transition::to(
                    S::Whispering,
                    now,
                    vec![Effect::SetTone(EmotionalTone::Concerned)],
                    "late night fatigue",
                )
            } else if guards::user_seems_lost(ctx, now) {
                Transition::to(
                    S::Whispering,
                    now,
                    vec![Effect::SetTone(EmotionalTone::Encouraging)],
                    "user seems lost",
                )
            } else if guards::something_interesting(ctx) {
                Transition::to(
                    S::Pondering,
                    now,
                    vec![Effect::SetTone(EmotionalTone::Curious)],
                    "something interesting",
                )
            } else if guards::context_shift(ctx) {
                Transition::to(S::Sensing, now, vec![], "context shift")
            } else {
                Transition::ignored()
            }
        }

        (PresenceState::Sensing { .. }, Input::Timeout) => {
            if guards::worth_mentioning(ctx, thresholds, random) {
                Transition::to(S::Whispering, now, vec![], "worth mentioning")
            } else {
                Transition::to(S::Observing, now, vec![], "sensing timeout")
            }
        }

        (PresenceState::Pondering { .. }, Input::Timeout) => {
            if guards::decision_to_speak(ctx, now, thresholds, random) {
                Transition::to(S::Whispering, now, vec![], "decision to speak")
            } else {
                Transition::to(S::Observing, now, vec![Effect::IncrementSilence], "kept silent")
            }
        }
        (PresenceState::Pondering { .. }, Input::Event(EngineEvent::ForceRetreat)) => {
            Transition::to(S::Retreating, now, vec![], "forced retreat")
        }

        (PresenceState::Whispering { .. }, Input::Timeout) => {
            Transition::to(S::Retreating, now, vec![], "whisper timeout")
        }
        (PresenceState::Whispering { .. }, Input::Event(EngineEvent::UserAcknowledged)) => {
            Transition::to(S::Retreating, now, vec![Effect::IncrementWisdom], "acknowledged")
        }
        (PresenceState::Whispering { .. }, Input::Event(EngineEvent::ManifestationComplete)) => {
            Transition::to(S::Retreating, now, vec![], "manifestation complete")
        }
        (PresenceState::Whispering { .. }, Input::Event(EngineEvent::ForceRetreat)) => {
            Transition::to(S::Retreating, now, vec![], "forced retreat")
        }

        (PresenceState::Interrupting { .. }, Input::Timeout) => {
            Transition::to(S::Retreating, now, vec![], "interruption timeout")
        }
        (PresenceState::Interrupting { .. }, Input::Event(EngineEvent::UserAcknowledged)) => {
            Transition::to(S::Observing, now, vec![Effect::IncrementWisdom], "acknowledged")
        }
        (PresenceState::Interrupting { .. }, Input::Event(EngineEvent::ForceRetreat)) => {
            Transition::to(S::Retreating, now, vec![], "forced retreat")
        }

        (PresenceState::Retreating { .. }, Input::Timeout) => {
            Transition::to(S::Observing, now, vec![], "retreat complete")
        }

        _ => Transition::ignored(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::FixedDraw;

    fn run(state: PresenceState, ctx: &CriticalContext, input: Input<'_>, now: Millis) -> Transition {
        step(&state, ctx, input, now, &DrawThresholds::default(), &mut FixedDraw(0.0))
    }

    #[test]
    fn deadlines_follow_table() {
        assert_eq!(PresenceState::Dormant { since: 0 }.deadline(), Some(5_000));
        assert_eq!(PresenceState::Observing.deadline(), None);
        assert_eq!(PresenceState::Sensing { since: 10 }.deadline(), Some(2_010));
        assert_eq!(PresenceState::Pondering { since: 0 }.deadline(), Some(3_000));
        assert_eq!(PresenceState::Whispering { since: 0 }.deadline(), Some(8_000));
        assert_eq!(PresenceState::Interrupting { since: 0 }.deadline(), Some(15_000));
        assert_eq!(PresenceState::Retreating { since: 0 }.deadline(), Some(2_000));
    }

    #[test]
    fn enter_and_kind_agree() {
        for kind in ConsciousnessState::ALL {
            assert_eq!(PresenceState::enter(kind, 42).kind(), kind);
        }
    }

    #[test]
    fn interrupting_entry_records_after_tone() {
        let mut ctx = CriticalContext::default();
        ctx.world.friction = 9.0;
        ctx.world.mouse_restlessness = 8.0;
        let t = run(PresenceState::Observing, &ctx, Input::Event(&EngineEvent::TimeTick), 100);
        assert_eq!(t.next, Some(PresenceState::Interrupting { since: 100 }));
        assert_eq!(
            t.effects,
            vec![Effect::SetTone(EmotionalTone::Concerned), Effect::RecordManifestation]
        );
    }

    #[test]
    fn world_updates_only_in_quiet_states() {
        let ctx = CriticalContext::default();
        let event = EngineEvent::WorldUpdate(WorldUpdate {
            friction: Some(2.0),
            ..Default::default()
        });
        let t = run(PresenceState::Sensing { since: 0 }, &ctx, Input::Event(&event), 1);
        assert_eq!(t.next, None);
        assert_eq!(t.effects.len(), 1);

        let t = run(PresenceState::Whispering { since: 0 }, &ctx, Input::Event(&event), 1);
        assert!(t.is_ignored());
    }

    #[test]
    fn unhandled_events_are_ignored() {
        let ctx = CriticalContext::default();
        assert!(run(PresenceState::Dormant { since: 0 }, &ctx, Input::Event(&EngineEvent::TimeTick), 1).is_ignored());
        assert!(run(PresenceState::Observing, &ctx, Input::Event(&EngineEvent::UserAcknowledged), 1).is_ignored());
        assert!(run(PresenceState::Observing, &ctx, Input::Timeout, 1).is_ignored());
        assert!(run(PresenceState::Sensing { since: 0 }, &ctx, Input::Event(&EngineEvent::ForceRetreat), 1).is_ignored());
        assert!(run(PresenceState::Retreating { since: 0 }, &ctx, Input::Event(&EngineEvent::UserAcknowledged), 1).is_ignored());
        assert!(run(PresenceState::Interrupting { since: 0 }, &ctx, Input::Event(&EngineEvent::ManifestationComplete), 1).is_ignored());
    }

    #[test]
    fn retreating_entry_resets_tone() {
        let ctx = CriticalContext::default();
        let t = run(PresenceState::Whispering { since: 0 }, &ctx, Input::Timeout, 8_000);
        assert_eq!(t.next, Some(PresenceState::Retreating { since: 8_000 }));
        assert_eq!(t.effects, vec![Effect::ResetTone]);
    }

    #[test]
    fn sensing_speaks_only_when_wise_and_lucky() {
        let wise = CriticalContext {
            wisdom_level: 3.0,
            ..Default::default()
        };
        let thresholds = DrawThresholds::default();
        let state = PresenceState::Sensing { since: 0 };

        let t = step(&state, &wise, Input::Timeout, 2_000, &thresholds, &mut FixedDraw(0.8));
        assert_eq!(t.next.map(|s| s.kind()), Some(ConsciousnessState::Whispering));

        let t = step(&state, &wise, Input::Timeout, 2_000, &thresholds, &mut FixedDraw(0.7));
        assert_eq!(t.next.map(|s| s.kind()), Some(ConsciousnessState::Observing));
        assert!(t.effects.is_empty());
    }
}
