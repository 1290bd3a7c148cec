//! Presence configuration
//!
//! All tunable parameters in one place. Loaded from TOML at startup,
//! falls back to defaults if no config file exists.

use presence_core::{Error, Millis, Result};
use presence_engine::EngineConfig;
use presence_sensor::SensorConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level presence configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceConfig {
    /// Input sampling and signal derivation.
    pub sensor: SensorConfig,
    /// Tick cadence, seed and draw thresholds of the critical engine.
    pub engine: EngineConfig,
    /// Whisper anti-repetition.
    pub whisper: WhisperConfig,
    /// Async driver parameters.
    pub runtime: RuntimeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WhisperConfig {
    /// Recently shown ids excluded from selection.
    pub history_limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// How often the driver advances the session clock, in milliseconds.
    pub resolution_ms: Millis,
    /// Capacity of the input and command channels.
    pub input_buffer: usize,
}

// ============================================================
// Defaults
// ============================================================

impl Default for WhisperConfig {
    fn default() -> Self {
        Self {
            history_limit: presence_engine::whisper::HISTORY_LIMIT,
        }
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            resolution_ms: 100,
            input_buffer: 256,
        }
    }
}

impl PresenceConfig {
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_toml_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to load {}: {}, using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                tracing::info!("No config at {}, using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Parse and validate.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.sensor.sensitivity > 0.0) {
            return Err(Error::config(format!(
                "sensor.sensitivity must be positive, got {}",
                self.sensor.sensitivity
            )));
        }
        for (name, value) in [
            ("sensor.tick_ms", self.sensor.tick_ms),
            ("engine.tick_ms", self.engine.tick_ms),
            ("runtime.resolution_ms", self.runtime.resolution_ms),
        ] {
            if value == 0 {
                return Err(Error::config(format!("{name} must be greater than zero")));
            }
        }
        for (name, value) in [
            ("engine.worth_mentioning_draw", self.engine.worth_mentioning_draw),
            ("engine.speak_draw", self.engine.speak_draw),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::config(format!("{name} must be within [0, 1], got {value}")));
            }
        }
        if self.whisper.history_limit == 0 {
            return Err(Error::config("whisper.history_limit must be greater than zero"));
        }
        if self.runtime.input_buffer == 0 {
            return Err(Error::config("runtime.input_buffer must be greater than zero"));
        }
        Ok(())
    }

    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(PresenceConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let config = PresenceConfig::from_toml_str("[engine]\nseed = 7\n").unwrap();
        assert_eq!(config.engine.seed, Some(7));
        assert_eq!(config.engine.tick_ms, 2_000);
        assert_eq!(config.sensor.tick_ms, 1_000);
        assert_eq!(config.whisper.history_limit, 20);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(PresenceConfig::from_toml_str("[sensor]\nsensitivity = 0.0\n").is_err());
        assert!(PresenceConfig::from_toml_str("[engine]\nspeak_draw = 1.5\n").is_err());
        assert!(PresenceConfig::from_toml_str("[runtime]\nresolution_ms = 0\n").is_err());
        assert!(PresenceConfig::from_toml_str("[sensor]\ntick_ms = 0\n").is_err());
    }

    #[test]
    fn dumped_toml_parses_back() {
        let text = PresenceConfig::default().to_toml();
        assert!(text.contains("[sensor]"));
        assert!(text.contains("worth_mentioning_draw"));
        let parsed = PresenceConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed.runtime.resolution_ms, 100);
    }
}
