use std::path::Path;

use serde::Deserialize;

/// Behavior knobs for the simulated device.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Whether dispense requests complete successfully.
    pub dispense_success: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dispense_success: true,
        }
    }
}

impl Settings {
    /// Load from a JSON file. Missing or malformed files fall back to
    /// defaults with a warning; the emulator still starts.
    pub fn load(path: &Path) -> Self {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "settings not readable, using defaults");
                return Self::default();
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(settings) => {
                tracing::debug!(path = %path.display(), ?settings, "settings loaded");
                settings
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "settings malformed, using defaults");
                Self::default()
            }
        }
    }

    /// Result code reported in `dispenseComplete`.
    pub fn dispense_code(&self) -> u32 {
        if self.dispense_success {
            0
        } else {
            1
        }
    }
}
