//! Presence Sensor: derives world-context signals from raw input
//!
//! Two cadences feed the world store:
//! - event-driven: scroll, pointer movement, clicks, visibility changes
//! - tick-driven: idle time, fatigue, focus duration, attention, friction decay

pub mod sensor;
pub mod window;

pub use sensor::*;
pub use window::MovingWindow;
