//! Engine configuration.
//!
//! [`EngineConfig`] is deserialized from JSON with every field optional;
//! anything missing takes its default. Call [`EngineConfig::validate`] (done
//! by [`EngineConfig::from_json`] and [`EngineConfig::load`]) before use.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// Visible world area, in world units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 600.0,
            height: 400.0,
        }
    }
}

/// Camera top-left corner in world units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Sleep between simulation iterations, in milliseconds. 0 spins.
    pub yield_interval_ms: u64,
    /// Frames per second of the headless render driver.
    pub frame_rate: f64,
    pub viewport: ViewportConfig,
    pub camera: CameraConfig,
    /// Hunger each unit loses per simulated second.
    pub hunger_decay_per_second: f32,
    /// Upper bound on the wall-clock `dt` of a single tick, in seconds.
    /// Unbounded when absent.
    pub max_dt: Option<f32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            yield_interval_ms: 10,
            frame_rate: 60.0,
            viewport: ViewportConfig::default(),
            camera: CameraConfig::default(),
            hunger_decay_per_second: 0.0,
            max_dt: None,
        }
    }
}

impl EngineConfig {
    pub fn from_json(text: &str) -> Result<Self, EngineError> {
        let config: Self = serde_json::from_str(text).map_err(|source| EngineError::Config {
            what: "engine config",
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.frame_rate.is_finite() && self.frame_rate > 0.0) {
            return Err(invalid(format!(
                "frame_rate must be positive and finite, got {}",
                self.frame_rate
            )));
        }
        let ViewportConfig { width, height } = self.viewport;
        if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
            return Err(invalid(format!(
                "viewport must be positive, got {width}x{height}"
            )));
        }
        if !(self.camera.x.is_finite() && self.camera.y.is_finite()) {
            return Err(invalid("camera position must be finite".to_owned()));
        }
        if !(self.hunger_decay_per_second.is_finite() && self.hunger_decay_per_second >= 0.0) {
            return Err(invalid(format!(
                "hunger_decay_per_second must be >= 0, got {}",
                self.hunger_decay_per_second
            )));
        }
        if let Some(max_dt) = self.max_dt {
            if !(max_dt.is_finite() && max_dt > 0.0) {
                return Err(invalid(format!("max_dt must be positive, got {max_dt}")));
            }
        }
        Ok(())
    }

    pub fn yield_interval(&self) -> Duration {
        Duration::from_millis(self.yield_interval_ms)
    }

    /// Time between two frames of the headless render driver.
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.frame_rate)
    }
}

fn invalid(message: String) -> EngineError {
    EngineError::InvalidConfig(message)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
