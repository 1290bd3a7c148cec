//! Trace replay on a manual clock

use std::sync::Arc;

use presence_core::{Clock, ManualClock, Millis};
use presence_runtime::{PresenceConfig, PresenceSnapshot, Session, SessionEvent};
use tracing::info;

use crate::trace::{TraceAction, TraceRecord};

#[derive(Debug, Clone)]
pub struct SimulateOptions {
    /// Overrides `engine.seed` from the config.
    pub seed: Option<u64>,
    /// Local hour at which the trace starts.
    pub start_hour: u8,
    /// Keep the clock running until this offset; defaults to the last record.
    pub until_ms: Option<Millis>,
}

impl Default for SimulateOptions {
    fn default() -> Self {
        Self {
            seed: None,
            start_hour: 12,
            until_ms: None,
        }
    }
}

pub struct SimulationReport {
    /// Clock value at trace offset zero.
    pub origin: Millis,
    pub events: Vec<SessionEvent>,
    pub last: PresenceSnapshot,
}

pub fn simulate(records: &[TraceRecord], config: &PresenceConfig, options: &SimulateOptions) -> SimulationReport {
    let mut config = config.clone();
    if options.seed.is_some() {
        config.engine.seed = options.seed;
    }

    let clock = ManualClock::starting_at_hour(options.start_hour);
    let origin = clock.now_millis();
    let mut session = Session::new(&config, Arc::new(clock.clone()));
    let mut events = Vec::new();

    for record in records {
        clock.set(origin + record.at);
        match record.action {
            TraceAction::Input(input) => session.input(&input),
            TraceAction::Command(command) => session.apply(command),
        }
        events.extend(session.drain_events());
    }

    let end = options
        .until_ms
        .or_else(|| records.last().map(|r| r.at))
        .unwrap_or(0);
    session.advance_to(origin + end);
    events.extend(session.drain_events());

    info!(
        "Replayed {} records over {}ms: {} events, session {}",
        records.len(),
        end,
        events.len(),
        session.id()
    );

    SimulationReport {
        origin,
        events,
        last: session.snapshot(),
    }
}
