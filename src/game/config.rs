//! Config - Tunable constants for stride physics and race timing

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading a [`GameConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {field} must be a positive finite number (got {value})")]
    Invalid { field: &'static str, value: f64 },
}

/// Game configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Distance added by one completed stride (meters)
    pub stride_length: f64,
    /// Finish line (meters)
    pub target_distance: f64,
    /// Speed lost per second of momentum ticking (m/s per second)
    pub speed_decay: f64,
    /// Motion tick cadence (seconds)
    pub motion_tick_secs: f64,
    /// Elapsed-time tick cadence (seconds)
    pub clock_tick_secs: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            stride_length: 0.6,
            target_distance: 10.0,
            speed_decay: 0.5,
            motion_tick_secs: 0.1,
            clock_tick_secs: 0.01,
        }
    }
}

impl GameConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Check that every value is positive and finite
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("stride_length", self.stride_length),
            ("target_distance", self.target_distance),
            ("speed_decay", self.speed_decay),
            ("motion_tick_secs", self.motion_tick_secs),
            ("clock_tick_secs", self.clock_tick_secs),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid { field, value });
            }
        }
        Ok(())
    }

    /// Motion tick cadence as a duration
    pub fn motion_tick(&self) -> Duration {
        Duration::from_secs_f64(self.motion_tick_secs)
    }

    /// Elapsed-time tick cadence as a duration
    pub fn clock_tick(&self) -> Duration {
        Duration::from_secs_f64(self.clock_tick_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_game_constants() {
        let config = GameConfig::default();
        assert_eq!(config.stride_length, 0.6);
        assert_eq!(config.target_distance, 10.0);
        assert_eq!(config.motion_tick(), Duration::from_millis(100));
        assert_eq!(config.clock_tick(), Duration::from_millis(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config = GameConfig::from_json(r#"{ "target_distance": 25.0 }"#).unwrap();
        assert_eq!(config.target_distance, 25.0);
        assert_eq!(config.stride_length, 0.6);
    }

    #[test]
    fn rejects_non_positive_values() {
        let err = GameConfig::from_json(r#"{ "motion_tick_secs": 0.0 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { field: "motion_tick_secs", .. }
        ));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(
            GameConfig::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = GameConfig::load(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
