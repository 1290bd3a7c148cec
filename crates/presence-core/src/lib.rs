//! Presence Core - world context, presence enums, clock, and error handling

pub mod clock;
pub mod error;
pub mod store;
pub mod types;
pub mod world;

pub use clock::{Clock, ManualClock, Millis, SystemClock, Timestamp, HOUR_MS};
pub use error::{Error, Result};
pub use store::WorldStore;
pub use types::*;
pub use world::*;
