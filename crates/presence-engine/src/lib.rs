//! Presence Engine: the critical state machine and whisper selection
//!
//! The engine never reacts synchronously to raw input. It samples the world
//! context on a fixed tick, evaluates guards, and makes a probabilistic,
//! hysteresis-guarded decision to surface.
//!
//! - `machine`: presence states, events, effects and the pure `step` function
//! - `guards`: guard predicates and their thresholds
//! - `engine`: `CriticalEngine`, which owns the context and applies effects
//! - `whisper`: static message catalog and the deterministic selector

pub mod context;
pub mod engine;
pub mod guards;
pub mod machine;
pub mod random;
pub mod whisper;

pub use context::CriticalContext;
pub use engine::{CriticalEngine, EngineConfig, StateChange};
pub use guards::DrawThresholds;
pub use machine::{step, EngineEvent, Effect, Input, PresenceState, Transition};
pub use random::{FixedDraw, RandomSource, ScriptedDraws};
pub use whisper::{select_from, select_whisper, WhisperCondition, WhisperHistory, WhisperMessage, WHISPER_CATALOG};
