//! Context sensor
//!
//! Translates raw input into partial world updates. The sensor never decides
//! anything; it only observes and writes into the [`WorldStore`] it is handed.

use crate::window::MovingWindow;
use presence_core::{Millis, Timestamp, WorldStore, WorldUpdate, HOUR_MS, SIGNAL_MAX};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use tracing::debug;

pub const SCROLL_WINDOW: usize = 10;
pub const POINTER_WINDOW: usize = 20;
pub const CLICK_WINDOW: usize = 5;

/// Average scroll velocity above which the user is exploring.
pub const EXPLORING_VELOCITY: f64 = 3.0;
/// Average scroll velocity that adds friction.
pub const FRICTION_VELOCITY: f64 = 6.0;
/// Average scroll velocity above which the user seems rushed.
pub const RUSHED_VELOCITY: f64 = 8.0;

/// Restlessness that adds friction.
pub const FRICTION_RESTLESSNESS: f64 = 6.0;
/// Restlessness (with slow average speed) at which the user seems lost.
pub const LOST_RESTLESSNESS: f64 = 7.0;
pub const LOST_MAX_SPEED: f64 = 0.5;
pub const RESTLESSNESS_GAIN: f64 = 50.0;

/// A full click window inside this span is a frustration burst.
pub const CLICK_BURST_MS: Millis = 2_000;
/// Friction level forced by a click burst.
pub const CLICK_BURST_FRICTION: f64 = 8.0;

/// Idle time after which friction decays on each tick.
pub const IDLE_DECAY_AFTER_MS: Millis = 5_000;

/// Raw input from the host environment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputEvent {
    /// Pointer position in viewport pixels
    PointerMove { x: f64, y: f64 },
    /// Absolute vertical scroll offset in pixels
    Scroll { y: f64 },
    Click,
    Visibility { hidden: bool },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// When false the sensor ignores input and its tick does nothing.
    pub enabled: bool,
    /// Scales every written velocity/restlessness value.
    pub sensitivity: f64,
    /// Idle/fatigue recompute cadence in milliseconds.
    pub tick_ms: Millis,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sensitivity: 1.0,
            tick_ms: 1_000,
        }
    }
}

/// Fatigue from time spent in the session and the hour of day.
///
/// Three points per hour of session, three more from 23:00, all scaled by
/// 1.5 between 22:00 and 06:00. Capped at 10.
pub fn fatigue_at(session: Millis, hour: u8) -> f64 {
    let hours = session as f64 / HOUR_MS as f64;
    let late_bonus = if hour >= 23 { 3.0 } else { 0.0 };
    let night_factor = if hour >= 22 || hour < 6 { 1.5 } else { 1.0 };
    ((hours * 3.0 + late_bonus) * night_factor).min(SIGNAL_MAX)
}

/// Attention from the current scroll velocity and restlessness, floored at zero.
pub fn attention_from(scroll_velocity: f64, restlessness: f64) -> f64 {
    (SIGNAL_MAX - scroll_velocity - restlessness * 0.5).max(0.0)
}

pub struct ContextSensor {
    config: SensorConfig,

    last_scroll_y: f64,
    last_scroll_at: Millis,
    scroll_velocities: MovingWindow,

    last_pointer: (f64, f64),
    last_pointer_at: Millis,
    pointer_speeds: MovingWindow,

    clicks: VecDeque<Millis>,

    focus_started_at: Millis,
    last_activity_at: Millis,
}

impl ContextSensor {
    pub fn new(config: SensorConfig, started_at: Millis) -> Self {
        Self {
            config,
            last_scroll_y: 0.0,
            last_scroll_at: started_at,
            scroll_velocities: MovingWindow::new(SCROLL_WINDOW),
            last_pointer: (0.0, 0.0),
            last_pointer_at: started_at,
            pointer_speeds: MovingWindow::new(POINTER_WINDOW),
            clicks: VecDeque::with_capacity(CLICK_WINDOW),
            focus_started_at: started_at,
            last_activity_at: started_at,
        }
    }

    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn last_activity_at(&self) -> Millis {
        self.last_activity_at
    }

    /// Restart the focus/session timer (e.g. the host considers the page re-focused).
    pub fn reset_focus_timer(&mut self, at: Millis) {
        self.focus_started_at = at;
    }

    /// Feed one input event. Returns false when the sensor is disabled.
    pub fn handle(&mut self, event: &InputEvent, at: Timestamp, store: &mut WorldStore) -> bool {
        if !self.config.enabled {
            return false;
        }
        match *event {
            InputEvent::Scroll { y } => self.on_scroll(y, at, store),
            InputEvent::PointerMove { x, y } => self.on_pointer_move(x, y, at, store),
            InputEvent::Click => self.on_click(at, store),
            InputEvent::Visibility { hidden } => self.on_visibility(hidden, at, store),
        }
        true
    }

    fn on_scroll(&mut self, y: f64, at: Timestamp, store: &mut WorldStore) {
        let dt = at.since(self.last_scroll_at);
        if dt > 0 {
            let velocity = (y - self.last_scroll_y).abs() / dt as f64 * 100.0;
            self.scroll_velocities.push(velocity);
            let avg = self.scroll_velocities.mean();

            store.update(
                &WorldUpdate {
                    scroll_velocity: Some(avg * self.config.sensitivity),
                    is_exploring: Some(avg > EXPLORING_VELOCITY),
                    seems_rushed: Some(avg > RUSHED_VELOCITY),
                    ..Default::default()
                },
                at,
            );

            if avg > FRICTION_VELOCITY {
                store.increment_friction();
                debug!("fast scroll (avg {:.2}) raised friction to {:.1}", avg, store.get().friction);
            }
        }

        self.last_scroll_y = y;
        self.last_scroll_at = at.millis;
        self.record_activity(at, store);
    }

    fn on_pointer_move(&mut self, x: f64, y: f64, at: Timestamp, store: &mut WorldStore) {
        let dt = at.since(self.last_pointer_at);
        if dt > 0 {
            let (dx, dy) = (x - self.last_pointer.0, y - self.last_pointer.1);
            let speed = (dx * dx + dy * dy).sqrt() / dt as f64;
            self.pointer_speeds.push(speed);

            let avg_speed = self.pointer_speeds.mean();
            let restlessness = (self.pointer_speeds.variance() * RESTLESSNESS_GAIN * self.config.sensitivity)
                .min(SIGNAL_MAX);

            store.update(
                &WorldUpdate {
                    mouse_restlessness: Some(restlessness),
                    seems_lost: Some(restlessness > LOST_RESTLESSNESS && avg_speed < LOST_MAX_SPEED),
                    ..Default::default()
                },
                at,
            );

            if restlessness > FRICTION_RESTLESSNESS {
                store.increment_friction();
                debug!(
                    "erratic pointer (restlessness {:.2}) raised friction to {:.1}",
                    restlessness,
                    store.get().friction
                );
            }
        }

        self.last_pointer = (x, y);
        self.last_pointer_at = at.millis;
        self.record_activity(at, store);
    }

    fn on_click(&mut self, at: Timestamp, store: &mut WorldStore) {
        if self.clicks.len() == CLICK_WINDOW {
            self.clicks.pop_front();
        }
        self.clicks.push_back(at.millis);

        if self.clicks.len() == CLICK_WINDOW {
            let first = self.clicks.front().copied().unwrap_or(at.millis);
            if at.since(first) < CLICK_BURST_MS {
                store.increment_friction();
                store.increment_friction();
                store.update(
                    &WorldUpdate {
                        friction: Some(CLICK_BURST_FRICTION),
                        ..Default::default()
                    },
                    at,
                );
                debug!("click burst: friction forced to {:.1}", CLICK_BURST_FRICTION);
            }
        }

        self.record_activity(at, store);
    }

    fn on_visibility(&mut self, hidden: bool, at: Timestamp, store: &mut WorldStore) {
        let update = if hidden {
            WorldUpdate {
                attention: Some(0.0),
                ..Default::default()
            }
        } else {
            self.focus_started_at = at.millis;
            WorldUpdate {
                has_been_here_recently: Some(true),
                ..Default::default()
            }
        };
        store.update(&update, at);
    }

    fn record_activity(&mut self, at: Timestamp, store: &mut WorldStore) {
        self.last_activity_at = at.millis;
        store.record_activity();
    }

    /// Periodic recompute of idle time, fatigue, focus duration, friction decay and attention.
    pub fn tick(&mut self, at: Timestamp, store: &mut WorldStore) {
        if !self.config.enabled {
            return;
        }

        let idle = at.since(self.last_activity_at);
        let focus = at.since(self.focus_started_at);

        store.update(
            &WorldUpdate {
                idle_time: Some(idle),
                fatigue: Some(fatigue_at(focus, at.hour)),
                focus_duration: Some(focus),
                ..Default::default()
            },
            at,
        );

        if idle > IDLE_DECAY_AFTER_MS {
            store.decrement_friction();
        }

        let world = store.get();
        let attention = attention_from(world.scroll_velocity, world.mouse_restlessness);
        store.update(
            &WorldUpdate {
                attention: Some(attention),
                ..Default::default()
            },
            at,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(millis: Millis) -> Timestamp {
        Timestamp::new(millis, 14)
    }

    #[test]
    fn fatigue_formula() {
        assert_eq!(fatigue_at(0, 14), 0.0);
        assert!((fatigue_at(HOUR_MS, 14) - 3.0).abs() < 1e-9);
        // 22:00 applies the night factor only
        assert!((fatigue_at(HOUR_MS, 22) - 4.5).abs() < 1e-9);
        // 23:00 adds the late bonus and the night factor
        assert!((fatigue_at(HOUR_MS, 23) - 9.0).abs() < 1e-9);
        assert_eq!(fatigue_at(10 * HOUR_MS, 3), 10.0);
    }

    #[test]
    fn attention_floors_at_zero() {
        assert_eq!(attention_from(0.0, 0.0), 10.0);
        assert_eq!(attention_from(4.0, 2.0), 5.0);
        assert_eq!(attention_from(12.0, 10.0), 0.0);
    }

    #[test]
    fn zero_delta_scroll_is_skipped() {
        let mut store = WorldStore::new(ts(0));
        let mut sensor = ContextSensor::new(SensorConfig::default(), 1_000);

        sensor.handle(&InputEvent::Scroll { y: 500.0 }, ts(1_000), &mut store);
        assert_eq!(store.get().scroll_velocity, 0.0);
        assert_eq!(sensor.scroll_velocities.len(), 0);
        // bookkeeping still advanced
        assert_eq!(sensor.last_scroll_y, 500.0);
    }

    #[test]
    fn zero_delta_pointer_move_is_skipped() {
        let mut store = WorldStore::new(ts(0));
        let mut sensor = ContextSensor::new(SensorConfig::default(), 1_000);

        sensor.handle(&InputEvent::PointerMove { x: 300.0, y: 400.0 }, ts(1_000), &mut store);
        assert_eq!(sensor.pointer_speeds.len(), 0);
        assert_eq!(store.get().mouse_restlessness, 0.0);
        assert!(!store.get().seems_lost);
        assert_eq!(sensor.last_pointer, (300.0, 400.0));
        assert_eq!(sensor.last_activity_at(), 1_000);
    }

    #[test]
    fn disabled_sensor_ignores_everything() {
        let config = SensorConfig {
            enabled: false,
            ..Default::default()
        };
        let mut store = WorldStore::new(ts(0));
        let mut sensor = ContextSensor::new(config, 0);

        assert!(!sensor.handle(&InputEvent::Click, ts(10), &mut store));
        sensor.tick(ts(60_000), &mut store);
        assert_eq!(store.get().idle_time, 0);
        assert_eq!(store.get().focus_duration, 0);
    }
}
