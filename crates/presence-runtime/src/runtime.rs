//! Async driver: runs one session inside a tokio task
//!
//! Input events and commands arrive on mpsc channels, a single interval
//! advances the session clock, snapshots go out on a `watch` channel and
//! session events on a broadcast channel. One `CancellationToken` stops
//! everything; once the task returns the session is dropped.

use crate::config::PresenceConfig;
use crate::session::{Command, PresenceSnapshot, Session, SessionEvent};
use presence_core::{Clock, Error, Result};
use presence_sensor::InputEvent;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

pub struct PresenceRuntime;

impl PresenceRuntime {
    /// Validate `config`, build a session on `clock` and start driving it.
    /// Must be called from within a tokio runtime.
    pub fn spawn(config: PresenceConfig, clock: Arc<dyn Clock>) -> Result<PresenceHandle> {
        config.validate()?;
        let session = Session::new(&config, clock);
        Ok(Self::spawn_session(session, &config))
    }

    /// Drive an already built session (e.g. one with a scripted random source).
    pub fn spawn_session(session: Session, config: &PresenceConfig) -> PresenceHandle {
        let buffer = config.runtime.input_buffer.max(1);
        let (input_tx, input_rx) = mpsc::channel(buffer);
        let (command_tx, command_rx) = mpsc::channel(buffer);
        let (snapshot_tx, snapshot_rx) = watch::channel(session.snapshot());
        let (events_tx, _) = broadcast::channel(buffer);
        let cancel = CancellationToken::new();
        let session_id = session.id();

        let driver = Driver {
            session,
            input_rx,
            command_rx,
            snapshot_tx,
            events_tx: events_tx.clone(),
            resolution: Duration::from_millis(config.runtime.resolution_ms.max(1)),
            cancel: cancel.clone(),
        };
        let join = tokio::spawn(driver.run());

        PresenceHandle {
            session_id,
            input_tx,
            command_tx,
            snapshots: snapshot_rx,
            events_tx,
            cancel,
            join,
        }
    }
}

struct Driver {
    session: Session,
    input_rx: mpsc::Receiver<InputEvent>,
    command_rx: mpsc::Receiver<Command>,
    snapshot_tx: watch::Sender<PresenceSnapshot>,
    events_tx: broadcast::Sender<SessionEvent>,
    resolution: Duration,
    cancel: CancellationToken,
}

impl Driver {
    async fn run(mut self) {
        let id = self.session.id();
        info!("Presence runtime {} started ({:?} resolution)", id, self.resolution);

        let mut interval = tokio::time::interval(self.resolution);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    debug!("Presence runtime {} cancelled", id);
                    break;
                }

                event = self.input_rx.recv() => match event {
                    Some(event) => self.session.input(&event),
                    None => break,
                },

                command = self.command_rx.recv() => match command {
                    Some(command) => self.session.apply(command),
                    None => break,
                },

                _ = interval.tick() => self.session.advance(),
            }
            self.publish();
        }

        info!("Presence runtime {} stopped", id);
    }

    /// Snapshot first, so an event subscriber never reads a stale snapshot.
    fn publish(&mut self) {
        let snapshot = self.session.snapshot();
        self.snapshot_tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
        for event in self.session.drain_events() {
            // no subscribers is fine
            let _ = self.events_tx.send(event);
        }
    }
}

/// Handle to a running session. Dropping it closes the channels, which also
/// stops the driver.
pub struct PresenceHandle {
    session_id: Uuid,
    input_tx: mpsc::Sender<InputEvent>,
    command_tx: mpsc::Sender<Command>,
    snapshots: watch::Receiver<PresenceSnapshot>,
    events_tx: broadcast::Sender<SessionEvent>,
    cancel: CancellationToken,
    join: JoinHandle<()>,
}

impl PresenceHandle {
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub async fn input(&self, event: InputEvent) -> Result<()> {
        self.input_tx
            .send(event)
            .await
            .map_err(|_| Error::channel_closed("input"))
    }

    pub async fn command(&self, command: Command) -> Result<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| Error::channel_closed("command"))
    }

    pub async fn acknowledge(&self) -> Result<()> {
        self.command(Command::Acknowledge).await
    }

    pub async fn force_retreat(&self) -> Result<()> {
        self.command(Command::ForceRetreat).await
    }

    pub async fn complete_manifestation(&self) -> Result<()> {
        self.command(Command::CompleteManifestation).await
    }

    pub async fn simulate_friction(&self, amount: f64) -> Result<()> {
        self.command(Command::SimulateFriction { amount }).await
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> PresenceSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PresenceSnapshot> {
        self.snapshots.clone()
    }

    pub fn events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events_tx.subscribe()
    }

    /// Token that stops the driver when cancelled (e.g. from a Ctrl-C handler).
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancel the driver and wait for it to finish.
    pub async fn shutdown(self) -> Result<()> {
        self.cancel.cancel();
        self.join.await.map_err(|e| Error::TaskError(e.to_string()))
    }

    /// Close the input and command channels, then wait for the driver to stop.
    pub async fn finish(self) -> Result<()> {
        let PresenceHandle {
            input_tx,
            command_tx,
            join,
            ..
        } = self;
        drop(input_tx);
        drop(command_tx);
        join.await.map_err(|e| Error::TaskError(e.to_string()))
    }
}
