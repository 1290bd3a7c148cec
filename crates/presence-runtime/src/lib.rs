//! Presence Runtime: configuration, session orchestration and the async driver
//!
//! - `config`: TOML configuration with per-section defaults
//! - `scheduler`: every periodic cadence of a session on one clock
//! - `session`: store, sensor, engine and whisper history wired together
//! - `runtime`: tokio task driving a session, with cancellation

pub mod config;
pub mod runtime;
pub mod scheduler;
pub mod session;

pub use config::{PresenceConfig, RuntimeConfig, WhisperConfig};
pub use runtime::{PresenceHandle, PresenceRuntime};
pub use scheduler::{Cadence, Scheduler};
pub use session::{Command, PresenceSnapshot, Session, SessionEvent};
