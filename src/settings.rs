//! Engine timing settings
//!
//! Loaded from JSON so demos can run in slow motion or fast-forward without a rebuild.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::SettingsError;

/// Timing configuration for a [`GameManager`](crate::engine::GameManager)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Simulated seconds per tick, as seen by objects
    pub game_dt: f32,
    /// Wall-clock seconds between ticks
    pub real_dt: f32,
    /// Maximum ticks run by a single `advance` call
    pub max_substeps: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            game_dt: DEFAULT_GAME_DT,
            real_dt: DEFAULT_REAL_DT,
            max_substeps: MAX_SUBSTEPS,
        }
    }
}

impl Settings {
    /// Parse settings from a JSON document (missing fields keep their defaults)
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        Ok(settings.validated())
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.as_ref().display());
        Ok(settings)
    }

    /// Replace out-of-range values with defaults
    pub fn validated(mut self) -> Self {
        if !is_valid_dt(self.game_dt) {
            log::warn!("Ignoring invalid game_dt {}, using {}", self.game_dt, DEFAULT_GAME_DT);
            self.game_dt = DEFAULT_GAME_DT;
        }
        if !is_valid_dt(self.real_dt) {
            log::warn!("Ignoring invalid real_dt {}, using {}", self.real_dt, DEFAULT_REAL_DT);
            self.real_dt = DEFAULT_REAL_DT;
        }
        if self.max_substeps == 0 {
            log::warn!("max_substeps must be at least 1, using {}", MAX_SUBSTEPS);
            self.max_substeps = MAX_SUBSTEPS;
        }
        self
    }
}

/// A tick delta must be a positive, finite number of seconds
#[inline]
pub fn is_valid_dt(dt: f32) -> bool {
    dt.is_finite() && dt > 0.0
}
