//! Run configuration
//!
//! The world seed is the only input the simulation needs; the rest drives
//! the headless runner. Loaded from JSON, with every field optional.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Seed used when none is configured
pub const DEFAULT_SEED: u64 = 0;

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Cave generation seed
    pub seed: u64,
    /// Gameplay event seed (derived from `seed` when absent)
    pub gameplay_seed: Option<u64>,
    /// Skip the ready phase
    pub autostart: bool,

    // === Headless runner ===
    /// Frame length (ms)
    pub frame_ms: u32,
    /// How long to run (s)
    pub demo_seconds: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            gameplay_seed: None,
            autostart: false,
            frame_ms: 16,
            demo_seconds: 30.0,
        }
    }
}

impl Settings {
    /// Parse settings from JSON
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Serialize settings to pretty JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(err) => {
                    log::warn!("Ignoring malformed settings {}: {}", path.display(), err);
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!("Cannot read settings {}: {}", path.display(), err);
                Self::default()
            }
        }
    }

    /// Number of frames the runner should simulate
    pub fn demo_frames(&self) -> u32 {
        if self.frame_ms == 0 {
            return 0;
        }
        (self.demo_seconds.max(0.0) * 1000.0 / self.frame_ms as f32) as u32
    }
}
