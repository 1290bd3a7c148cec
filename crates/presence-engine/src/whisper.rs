//! Whisper catalog and selection
//!
//! Selection is a pure function of the world snapshot and the recently shown
//! ids: no randomness, no side effects.

use presence_core::{EmotionalTone, WorldContext, WorldFlag, WorldMetric};
use serde::Serialize;
use std::collections::VecDeque;

/// How many recently shown ids are excluded from selection.
pub const HISTORY_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WhisperCondition {
    /// The flag must equal the value exactly.
    Flag(WorldFlag, bool),
    /// The metric must be at least the value.
    AtLeast(WorldMetric, f64),
}

impl WhisperCondition {
    pub fn holds(&self, world: &WorldContext) -> bool {
        match *self {
            WhisperCondition::Flag(flag, expected) => world.flag(flag) == expected,
            WhisperCondition::AtLeast(metric, minimum) => world.metric(metric) >= minimum,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WhisperMessage {
    pub id: &'static str,
    pub text: &'static str,
    pub tone: EmotionalTone,
    pub priority: u8,
    pub conditions: &'static [WhisperCondition],
}

impl WhisperMessage {
    pub fn is_eligible(&self, world: &WorldContext) -> bool {
        self.conditions.iter().all(|c| c.holds(world))
    }
}

pub static WHISPER_CATALOG: &[WhisperMessage] = &[
    WhisperMessage {
        id: "late-night-1",
        text: "The night keeps its own rhythm.",
        tone: EmotionalTone::Peaceful,
        priority: 2,
        conditions: &[WhisperCondition::Flag(WorldFlag::IsLateNight, true)],
    },
    WhisperMessage {
        id: "late-night-2",
        text: "Not everything has to be finished today.",
        tone: EmotionalTone::Encouraging,
        priority: 3,
        conditions: &[
            WhisperCondition::Flag(WorldFlag::IsLateNight, true),
            WhisperCondition::AtLeast(WorldMetric::Fatigue, 5.0),
        ],
    },
    WhisperMessage {
        id: "friction-1",
        text: "Sometimes stepping back is moving forward.",
        tone: EmotionalTone::Encouraging,
        priority: 4,
        conditions: &[WhisperCondition::AtLeast(WorldMetric::Friction, 6.0)],
    },
    WhisperMessage {
        id: "lost-1",
        text: "Getting lost is a way of exploring too.",
        tone: EmotionalTone::Curious,
        priority: 2,
        conditions: &[WhisperCondition::Flag(WorldFlag::SeemsLost, true)],
    },
    WhisperMessage {
        id: "focus-1",
        text: "Your attention is valuable.",
        tone: EmotionalTone::Neutral,
        priority: 1,
        conditions: &[WhisperCondition::AtLeast(WorldMetric::Attention, 8.0)],
    },
    WhisperMessage {
        id: "dawn-1",
        text: "Dawn forgives long nights.",
        tone: EmotionalTone::Peaceful,
        priority: 2,
        conditions: &[WhisperCondition::Flag(WorldFlag::IsDawn, true)],
    },
    WhisperMessage {
        id: "rushed-1",
        text: "Hurry is the enemy of clarity.",
        tone: EmotionalTone::Concerned,
        priority: 3,
        conditions: &[WhisperCondition::Flag(WorldFlag::SeemsRushed, true)],
    },
    WhisperMessage {
        id: "idle-1",
        text: "Silence communicates too.",
        tone: EmotionalTone::Peaceful,
        priority: 1,
        conditions: &[WhisperCondition::AtLeast(WorldMetric::IdleTime, 20_000.0)],
    },
];

/// Ids of recently shown whispers, oldest evicted first.
#[derive(Debug, Clone)]
pub struct WhisperHistory {
    ids: VecDeque<String>,
    limit: usize,
}

impl Default for WhisperHistory {
    fn default() -> Self {
        Self::new(HISTORY_LIMIT)
    }
}

impl WhisperHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            ids: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut history = Self::default();
        for id in ids {
            history.push(id);
        }
        history
    }

    pub fn push(&mut self, id: impl Into<String>) {
        if self.ids.len() == self.limit {
            self.ids.pop_front();
        }
        self.ids.push_back(id.into());
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|shown| shown == id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }
}

/// Highest-priority eligible message from `catalog` not in `history`.
/// Ties go to the message listed first.
pub fn select_from<'a>(
    catalog: &'a [WhisperMessage],
    world: &WorldContext,
    history: &WhisperHistory,
) -> Option<&'a WhisperMessage> {
    catalog
        .iter()
        .filter(|m| !history.contains(m.id))
        .filter(|m| m.is_eligible(world))
        .fold(None, |best: Option<&'a WhisperMessage>, m| match best {
            Some(b) if b.priority >= m.priority => Some(b),
            _ => Some(m),
        })
}

pub fn select_whisper(world: &WorldContext, history: &WhisperHistory) -> Option<&'static WhisperMessage> {
    select_from(WHISPER_CATALOG, world, history)
}
