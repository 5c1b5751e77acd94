// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use serde::{Deserialize, Serialize};

use crate::types::{CameraFacing, FormatSet};

/// Persistent application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Sampling period for the frame sampler, in milliseconds.
    pub scan_interval_ms: u64,
    /// Ideal capture width requested from the camera.
    pub width_hint: u32,
    /// Ideal capture height requested from the camera.
    pub height_hint: u32,
    /// Camera used when a scan starts.
    pub default_facing: CameraFacing,
    /// Symbologies enabled for new sessions.
    pub default_formats: FormatSet,
    /// Ask for the torch as soon as the camera opens.
    pub torch_on_start: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scan_interval_ms: 300,
            width_hint: 1920,
            height_hint: 1080,
            default_facing: CameraFacing::Back,
            default_formats: FormatSet::default(),
            torch_on_start: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible_for_barcode_work() {
        let config = AppConfig::default();
        assert_eq!(config.scan_interval_ms, 300);
        assert_eq!(config.width_hint, 1920);
        assert_eq!(config.height_hint, 1080);
        assert_eq!(config.default_facing, CameraFacing::Back);
        assert_eq!(config.default_formats.len(), 3);
        assert!(!config.torch_on_start);
    }

    #[test]
    fn config_round_trips_through_json() {
        let mut config = AppConfig::default();
        config.scan_interval_ms = 150;
        config.default_facing = CameraFacing::Front;

        let json = serde_json::to_string(&config).expect("serialize");
        let back: AppConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.scan_interval_ms, 150);
        assert_eq!(back.default_facing, CameraFacing::Front);
        assert_eq!(back.default_formats, config.default_formats);
    }
}
