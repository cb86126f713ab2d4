//! Motion controller configuration
//!
//! Every section has a default, so a JSON document only needs the fields
//! it changes at the top level of each section.

use std::path::Path;

use kinema_arbiter::{PriorityTable, DEFAULT_BLEND_DURATION};
use kinema_compose::BodyComposerConfig;
use kinema_core::{KinemaError, KinemaResult, MotionMode};
use kinema_input::InputConfig;
use kinema_signal::ConfidenceConfig;
use serde::{Deserialize, Serialize};

use crate::LoggingConfig;

/// Arbitration tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArbiterConfig {
    /// Seconds to blend between owners
    pub blend_duration: f32,
    /// An event-driven owner with no new request for this long yields to the fallback
    pub idle_after_seconds: f32,
    pub priority: PriorityTable,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            blend_duration: DEFAULT_BLEND_DURATION,
            idle_after_seconds: 2.0,
            priority: PriorityTable::default(),
        }
    }
}

impl ArbiterConfig {
    pub fn validate(&self) -> KinemaResult<()> {
        if !(self.blend_duration.is_finite() && self.blend_duration > 0.0) {
            return Err(KinemaError::InvalidConfig(format!(
                "blend_duration must be positive, got {}",
                self.blend_duration
            )));
        }
        if !(self.idle_after_seconds.is_finite() && self.idle_after_seconds > 0.0) {
            return Err(KinemaError::InvalidConfig(format!(
                "idle_after_seconds must be positive, got {}",
                self.idle_after_seconds
            )));
        }
        self.priority.validate()
    }
}

/// Full controller configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    pub arbiter: ArbiterConfig,
    /// Per-target owner freshness ramps
    pub confidence: ConfidenceConfig,
    pub body: BodyComposerConfig,
    pub input: InputConfig,
    pub mode: MotionMode,
    pub logging: LoggingConfig,
}

impl MotionConfig {
    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> KinemaResult<Self> {
        let config: MotionConfig =
            serde_json::from_str(json).map_err(|e| KinemaError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON file
    pub fn load(path: impl AsRef<Path>) -> KinemaResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| KinemaError::ConfigParse(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> KinemaResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| KinemaError::ConfigParse(e.to_string()))
    }

    pub fn validate(&self) -> KinemaResult<()> {
        self.arbiter.validate()?;
        self.confidence.validate()?;
        self.body.validate()?;
        self.input.validate()?;
        self.logging.validate()
    }
}
