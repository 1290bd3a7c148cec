//! Presence states, emotional tones, and time-of-day classification

use serde::{Deserialize, Serialize};

/// How visible/active the presence currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsciousnessState {
    /// Deeply inactive, practically invisible
    Dormant,
    /// Silently watching; the resting state
    Observing,
    /// A shift in context was detected
    Sensing,
    /// Deciding whether speaking is worth it
    Pondering,
    /// Surfacing a short message
    Whispering,
    /// A rare, necessary interruption
    Interrupting,
    /// Withdrawing after a manifestation
    Retreating,
}

impl ConsciousnessState {
    pub const ALL: [ConsciousnessState; 7] = [
        ConsciousnessState::Dormant,
        ConsciousnessState::Observing,
        ConsciousnessState::Sensing,
        ConsciousnessState::Pondering,
        ConsciousnessState::Whispering,
        ConsciousnessState::Interrupting,
        ConsciousnessState::Retreating,
    ];

    /// Presence intensity in 0..=1 consumed by the presentation layer.
    pub fn intensity(self) -> f64 {
        match self {
            ConsciousnessState::Dormant => 0.0,
            ConsciousnessState::Observing => 0.2,
            ConsciousnessState::Sensing => 0.35,
            ConsciousnessState::Pondering => 0.5,
            ConsciousnessState::Whispering => 0.75,
            ConsciousnessState::Interrupting => 1.0,
            ConsciousnessState::Retreating => 0.15,
        }
    }

    /// Whether the state is user-visible (a manifestation).
    pub fn is_manifestation(self) -> bool {
        matches!(
            self,
            ConsciousnessState::Whispering | ConsciousnessState::Interrupting
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ConsciousnessState::Dormant => "dormant",
            ConsciousnessState::Observing => "observing",
            ConsciousnessState::Sensing => "sensing",
            ConsciousnessState::Pondering => "pondering",
            ConsciousnessState::Whispering => "whispering",
            ConsciousnessState::Interrupting => "interrupting",
            ConsciousnessState::Retreating => "retreating",
        }
    }
}

impl std::fmt::Display for ConsciousnessState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mood of the current manifestation, independent of presence state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionalTone {
    #[default]
    Neutral,
    Curious,
    Concerned,
    Encouraging,
    Questioning,
    Peaceful,
}

impl EmotionalTone {
    pub fn as_str(self) -> &'static str {
        match self {
            EmotionalTone::Neutral => "neutral",
            EmotionalTone::Curious => "curious",
            EmotionalTone::Concerned => "concerned",
            EmotionalTone::Encouraging => "encouraging",
            EmotionalTone::Questioning => "questioning",
            EmotionalTone::Peaceful => "peaceful",
        }
    }
}

impl std::fmt::Display for EmotionalTone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse time-of-day marker exposed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimeOfDay {
    LateNight,
    Dawn,
    Night,
    Day,
}

impl TimeOfDay {
    /// Late night wins over dawn, dawn over night.
    pub fn from_hour(hour: u8) -> Self {
        if hour >= 23 || hour < 4 {
            TimeOfDay::LateNight
        } else if (5..7).contains(&hour) {
            TimeOfDay::Dawn
        } else if hour >= 20 || hour < 6 {
            TimeOfDay::Night
        } else {
            TimeOfDay::Day
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TimeOfDay::LateNight => "late-night",
            TimeOfDay::Dawn => "dawn",
            TimeOfDay::Night => "night",
            TimeOfDay::Day => "day",
        }
    }
}

impl std::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intensity_is_within_unit_range() {
        for state in ConsciousnessState::ALL {
            let i = state.intensity();
            assert!((0.0..=1.0).contains(&i), "{state} intensity {i}");
        }
        assert_eq!(ConsciousnessState::Interrupting.intensity(), 1.0);
        assert_eq!(ConsciousnessState::Dormant.intensity(), 0.0);
    }

    #[test]
    fn time_of_day_precedence() {
        assert_eq!(TimeOfDay::from_hour(23), TimeOfDay::LateNight);
        assert_eq!(TimeOfDay::from_hour(3), TimeOfDay::LateNight);
        assert_eq!(TimeOfDay::from_hour(4), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_hour(5), TimeOfDay::Dawn);
        assert_eq!(TimeOfDay::from_hour(6), TimeOfDay::Dawn);
        assert_eq!(TimeOfDay::from_hour(7), TimeOfDay::Day);
        assert_eq!(TimeOfDay::from_hour(21), TimeOfDay::Night);
    }

    #[test]
    fn state_serializes_lowercase() {
        let json = serde_json::to_string(&ConsciousnessState::Whispering).unwrap();
        assert_eq!(json, "\"whispering\"");
        let tone: EmotionalTone = serde_json::from_str("\"encouraging\"").unwrap();
        assert_eq!(tone, EmotionalTone::Encouraging);
    }
}
