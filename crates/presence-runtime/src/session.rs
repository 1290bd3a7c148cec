//! Presence session: the orchestrator that owns store, sensor and engine
//!
//! The session is the single writer for everything it owns. Every entry point
//! first catches up to the clock: due engine timeouts and cadence ticks are
//! processed in timestamp order, each at its own instant.

use crate::config::PresenceConfig;
use crate::scheduler::{Cadence, Scheduler};
use presence_core::{
    Clock, ConsciousnessState, EmotionalTone, Millis, TimeOfDay, Timestamp, WorldContext, WorldStore,
    WorldUpdate,
};
use presence_engine::{
    select_whisper, CriticalEngine, EngineEvent, RandomSource, StateChange, WhisperHistory, WhisperMessage,
};
use presence_sensor::{ContextSensor, InputEvent};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

/// Commands from the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Command {
    /// The user acknowledged the current manifestation.
    Acknowledge,
    ForceRetreat,
    /// The presentation finished showing the whisper.
    CompleteManifestation,
    /// Add friction (clamped to 10) as if the user had struggled.
    SimulateFriction { amount: f64 },
}

/// Something observable happened in the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    Transition(StateChange),
    Whisper {
        at: Millis,
        message: &'static WhisperMessage,
    },
}

/// Everything the presentation layer consumes, plus the signals worth showing
/// in a debug panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresenceSnapshot {
    pub state: ConsciousnessState,
    pub tone: EmotionalTone,
    pub intensity: f64,
    pub pending_whisper: Option<&'static WhisperMessage>,
    pub time_of_day: TimeOfDay,
    pub friction: f64,
    pub attention: f64,
    pub fatigue: f64,
    pub idle_time: Millis,
    pub is_late_night: bool,
}

pub struct Session {
    id: Uuid,
    clock: Arc<dyn Clock>,
    now: Millis,
    store: WorldStore,
    sensor: ContextSensor,
    engine: CriticalEngine,
    scheduler: Scheduler,
    history: WhisperHistory,
    pending: Option<&'static WhisperMessage>,
    events: Vec<SessionEvent>,
}

impl Session {
    pub fn new(config: &PresenceConfig, clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();
        let engine = CriticalEngine::new(&config.engine, now);
        Self::build(config, clock, now, engine)
    }

    /// Session whose engine draws from `random` instead of the configured seed.
    pub fn with_random(config: &PresenceConfig, clock: Arc<dyn Clock>, random: Box<dyn RandomSource>) -> Self {
        let now = clock.now();
        let engine = CriticalEngine::with_random(&config.engine, now, random);
        Self::build(config, clock, now, engine)
    }

    fn build(config: &PresenceConfig, clock: Arc<dyn Clock>, now: Timestamp, engine: CriticalEngine) -> Self {
        let id = Uuid::new_v4();
        let scheduler = Scheduler::new()
            .every(Cadence::SensorTick, config.sensor.tick_ms, now.millis)
            .every(Cadence::EngineTick, config.engine.tick_ms, now.millis);
        info!("Session {} started at {} (hour {})", id, now.millis, now.hour);
        Self {
            id,
            clock,
            now: now.millis,
            store: WorldStore::new(now),
            sensor: ContextSensor::new(config.sensor.clone(), now.millis),
            engine,
            scheduler,
            history: WhisperHistory::new(config.whisper.history_limit),
            pending: None,
            events: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Last instant the session has processed.
    pub fn now(&self) -> Millis {
        self.now
    }

    pub fn world(&self) -> &WorldContext {
        self.store.get()
    }

    pub fn engine(&self) -> &CriticalEngine {
        &self.engine
    }

    pub fn history(&self) -> &WhisperHistory {
        &self.history
    }

    pub fn pending_whisper(&self) -> Option<&'static WhisperMessage> {
        self.pending
    }

    /// Catch up to the clock.
    pub fn advance(&mut self) {
        self.advance_to(self.clock.now_millis());
    }

    /// Process every timeout and cadence due up to `target`, in time order.
    /// Engine timeouts run before cadence ticks at the same instant.
    pub fn advance_to(&mut self, target: Millis) {
        let target = target.max(self.now);
        loop {
            let timeout = self.engine.next_deadline().filter(|d| *d <= target);
            let tick = self.scheduler.next_due().filter(|d| *d <= target);
            match (timeout, tick) {
                (Some(deadline), Some(due)) if deadline <= due => self.fire_timeout(deadline),
                (Some(deadline), None) => self.fire_timeout(deadline),
                (_, Some(_)) => {
                    if let Some((due, cadence)) = self.scheduler.pop_due(target) {
                        self.fire_cadence(due, cadence);
                    }
                }
                (None, None) => break,
            }
        }
        self.now = target;
    }

    fn fire_timeout(&mut self, deadline: Millis) {
        self.now = deadline;
        if let Some(change) = self.engine.poll_timeout(deadline, &*self.clock) {
            self.record(change);
        }
    }

    fn fire_cadence(&mut self, due: Millis, cadence: Cadence) {
        self.now = due;
        let at = self.clock.at(due);
        match cadence {
            Cadence::SensorTick => {
                if self.sensor.is_enabled() {
                    self.sensor.tick(at, &mut self.store);
                    self.forward_world(at);
                }
            }
            Cadence::EngineTick => {
                if self.sensor.is_enabled() {
                    self.send(EngineEvent::TimeTick, at);
                    // keep looking while whispering with nothing queued
                    if self.engine.state() == ConsciousnessState::Whispering && self.pending.is_none() {
                        self.choose_whisper(due);
                    }
                }
            }
        }
    }

    /// Feed one raw input event at the current clock instant.
    pub fn input(&mut self, event: &InputEvent) {
        self.advance();
        let at = self.clock.at(self.now);
        if self.sensor.handle(event, at, &mut self.store) {
            self.forward_world(at);
        }
    }

    pub fn apply(&mut self, command: Command) {
        match command {
            Command::Acknowledge => self.acknowledge(),
            Command::ForceRetreat => self.force_retreat(),
            Command::CompleteManifestation => self.complete_manifestation(),
            Command::SimulateFriction { amount } => self.simulate_friction(amount),
        }
    }

    pub fn acknowledge(&mut self) {
        self.command(EngineEvent::UserAcknowledged);
    }

    pub fn force_retreat(&mut self) {
        self.command(EngineEvent::ForceRetreat);
    }

    pub fn complete_manifestation(&mut self) {
        self.command(EngineEvent::ManifestationComplete);
    }

    pub fn simulate_friction(&mut self, amount: f64) {
        self.advance();
        let at = self.clock.at(self.now);
        self.store.add_friction(amount);
        debug!("Session {} friction simulated: +{} -> {}", self.id, amount, self.store.get().friction);
        self.forward_world(at);
    }

    fn command(&mut self, event: EngineEvent) {
        self.advance();
        let at = self.clock.at(self.now);
        self.pending = None;
        self.send(event, at);
    }

    fn forward_world(&mut self, at: Timestamp) {
        let update = WorldUpdate::snapshot(self.store.get());
        self.send(EngineEvent::WorldUpdate(update), at);
    }

    fn send(&mut self, event: EngineEvent, at: Timestamp) {
        if let Some(change) = self.engine.send(event, at) {
            self.record(change);
        }
    }

    fn record(&mut self, change: StateChange) {
        if change.to == ConsciousnessState::Observing {
            self.pending = None;
        }
        self.events.push(SessionEvent::Transition(change));
        if change.to == ConsciousnessState::Whispering && self.pending.is_none() {
            self.choose_whisper(change.at);
        }
    }

    fn choose_whisper(&mut self, at: Millis) {
        let Some(message) = select_whisper(self.store.get(), &self.history) else {
            debug!("Session {} whispering with nothing eligible to say", self.id);
            return;
        };
        info!("Session {} whisper {}: {}", self.id, message.id, message.text);
        self.history.push(message.id);
        self.pending = Some(message);
        self.events.push(SessionEvent::Whisper { at, message });
    }

    /// Events recorded since the last drain, oldest first.
    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> PresenceSnapshot {
        let world = self.store.get();
        PresenceSnapshot {
            state: self.engine.state(),
            tone: self.engine.tone(),
            intensity: self.engine.intensity(),
            pending_whisper: self.pending,
            time_of_day: world.time_of_day(),
            friction: world.friction,
            attention: world.attention,
            fatigue: world.fatigue,
            idle_time: world.idle_time,
            is_late_night: world.is_late_night,
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("now", &self.now)
            .field("state", &self.engine.state())
            .field("pending", &self.pending.map(|m| m.id))
            .finish_non_exhaustive()
    }
}
