//! World context: the snapshot of inferred behavioral and environmental signals

use crate::clock::{Millis, Timestamp};
use crate::types::TimeOfDay;
use serde::{Deserialize, Serialize};

/// Upper bound of every 0-10 signal (friction, attention, fatigue, restlessness).
pub const SIGNAL_MAX: f64 = 10.0;

/// Clamp a 0-10 signal. NaN collapses to zero.
pub fn clamp_signal(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, SIGNAL_MAX)
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.max(0.0)
    }
}

/// 20:00-06:00
pub fn is_night_hour(hour: u8) -> bool {
    hour >= 20 || hour < 6
}

/// 23:00-04:00
pub fn is_late_night_hour(hour: u8) -> bool {
    hour >= 23 || hour < 4
}

/// 05:00-07:00
pub fn is_dawn_hour(hour: u8) -> bool {
    (5..7).contains(&hour)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldContext {
    pub hour: u8,
    pub is_night: bool,
    pub is_late_night: bool,
    pub is_dawn: bool,

    /// ms since the last recorded input
    pub idle_time: Millis,
    /// Smoothed scroll speed, >= 0
    pub scroll_velocity: f64,
    /// Pointer speed variance, 0-10
    pub mouse_restlessness: f64,
    /// ms since the page last regained focus
    pub focus_duration: Millis,

    /// Inferred struggle, 0-10
    pub friction: f64,
    /// 0-10
    pub attention: f64,
    /// 0-10
    pub fatigue: f64,

    pub has_been_here_recently: bool,
    pub is_exploring: bool,
    pub seems_lost: bool,
    pub seems_rushed: bool,
}

impl Default for WorldContext {
    fn default() -> Self {
        Self {
            hour: 12,
            is_night: false,
            is_late_night: false,
            is_dawn: false,
            idle_time: 0,
            scroll_velocity: 0.0,
            mouse_restlessness: 0.0,
            focus_duration: 0,
            friction: 0.0,
            attention: 5.0,
            fatigue: 0.0,
            has_been_here_recently: false,
            is_exploring: false,
            seems_lost: false,
            seems_rushed: false,
        }
    }
}

impl WorldContext {
    /// Defaults with the hour flags derived from `at`.
    pub fn at(at: Timestamp) -> Self {
        let mut world = Self::default();
        world.set_hour(at.hour);
        world
    }

    /// Set the hour and recompute every hour-derived flag from it.
    pub fn set_hour(&mut self, hour: u8) {
        let hour = hour % 24;
        self.hour = hour;
        self.is_night = is_night_hour(hour);
        self.is_late_night = is_late_night_hour(hour);
        self.is_dawn = is_dawn_hour(hour);
    }

    /// Merge a partial update. Ranged fields are clamped at write time and the
    /// hour flags are recomputed from `at`.
    pub fn apply(&mut self, update: &WorldUpdate, at: Timestamp) {
        if let Some(v) = update.idle_time {
            self.idle_time = v;
        }
        if let Some(v) = update.scroll_velocity {
            self.scroll_velocity = non_negative(v);
        }
        if let Some(v) = update.mouse_restlessness {
            self.mouse_restlessness = clamp_signal(v);
        }
        if let Some(v) = update.focus_duration {
            self.focus_duration = v;
        }
        if let Some(v) = update.friction {
            self.friction = clamp_signal(v);
        }
        if let Some(v) = update.attention {
            self.attention = clamp_signal(v);
        }
        if let Some(v) = update.fatigue {
            self.fatigue = clamp_signal(v);
        }
        if let Some(v) = update.has_been_here_recently {
            self.has_been_here_recently = v;
        }
        if let Some(v) = update.is_exploring {
            self.is_exploring = v;
        }
        if let Some(v) = update.seems_lost {
            self.seems_lost = v;
        }
        if let Some(v) = update.seems_rushed {
            self.seems_rushed = v;
        }
        self.set_hour(at.hour);
    }

    pub fn time_of_day(&self) -> TimeOfDay {
        TimeOfDay::from_hour(self.hour)
    }

    pub fn flag(&self, flag: WorldFlag) -> bool {
        match flag {
            WorldFlag::IsNight => self.is_night,
            WorldFlag::IsLateNight => self.is_late_night,
            WorldFlag::IsDawn => self.is_dawn,
            WorldFlag::HasBeenHereRecently => self.has_been_here_recently,
            WorldFlag::IsExploring => self.is_exploring,
            WorldFlag::SeemsLost => self.seems_lost,
            WorldFlag::SeemsRushed => self.seems_rushed,
        }
    }

    pub fn metric(&self, metric: WorldMetric) -> f64 {
        match metric {
            WorldMetric::Hour => self.hour as f64,
            WorldMetric::IdleTime => self.idle_time as f64,
            WorldMetric::ScrollVelocity => self.scroll_velocity,
            WorldMetric::MouseRestlessness => self.mouse_restlessness,
            WorldMetric::FocusDuration => self.focus_duration as f64,
            WorldMetric::Friction => self.friction,
            WorldMetric::Attention => self.attention,
            WorldMetric::Fatigue => self.fatigue,
        }
    }

    /// True when every ranged signal sits inside its documented bounds.
    pub fn signals_in_range(&self) -> bool {
        let unit = 0.0..=SIGNAL_MAX;
        unit.contains(&self.friction)
            && unit.contains(&self.attention)
            && unit.contains(&self.fatigue)
            && unit.contains(&self.mouse_restlessness)
            && self.scroll_velocity >= 0.0
    }
}

/// Boolean fields of [`WorldContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorldFlag {
    IsNight,
    IsLateNight,
    IsDawn,
    HasBeenHereRecently,
    IsExploring,
    SeemsLost,
    SeemsRushed,
}

/// Numeric fields of [`WorldContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorldMetric {
    Hour,
    IdleTime,
    ScrollVelocity,
    MouseRestlessness,
    FocusDuration,
    Friction,
    Attention,
    Fatigue,
}

/// Partial [`WorldContext`]. The hour and its flags are always derived, never set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle_time: Option<Millis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scroll_velocity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mouse_restlessness: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus_duration: Option<Millis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub friction: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attention: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fatigue: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_been_here_recently: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_exploring: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seems_lost: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seems_rushed: Option<bool>,
}

impl WorldUpdate {
    /// Every settable field of `world`.
    pub fn snapshot(world: &WorldContext) -> Self {
        Self {
            idle_time: Some(world.idle_time),
            scroll_velocity: Some(world.scroll_velocity),
            mouse_restlessness: Some(world.mouse_restlessness),
            focus_duration: Some(world.focus_duration),
            friction: Some(world.friction),
            attention: Some(world.attention),
            fatigue: Some(world.fatigue),
            has_been_here_recently: Some(world.has_been_here_recently),
            is_exploring: Some(world.is_exploring),
            seems_lost: Some(world.seems_lost),
            seems_rushed: Some(world.seems_rushed),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
