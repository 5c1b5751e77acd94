// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Global application state — reactive signals for the Dioxus UI.

use scanwerk_core::AppConfig;
use scanwerk_core::human_errors::HumanError;
use scanwerk_core::types::{CameraFacing, DecodedResult, FormatSet, ScanState};

use crate::services::app_services::SessionView;

/// Shared state accessible to all pages via `use_context`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Current session state, mirrored from the engine.
    pub scan_state: ScanState,
    /// Facing mode the next (or current) scan uses.
    pub facing: CameraFacing,
    /// Whether the torch is requested/lit.
    pub torch_on: bool,
    /// Enabled symbologies.
    pub formats: FormatSet,
    /// The decoded payload, when one landed.
    pub result: Option<DecodedResult>,
    /// Error banner content, already humanized for display.
    pub banner: Option<HumanError>,
    /// Application settings.
    pub config: AppConfig,
}

impl AppState {
    /// Initial state for a freshly constructed session.
    pub fn with_config(config: AppConfig) -> Self {
        Self {
            scan_state: ScanState::Idle,
            facing: config.default_facing,
            torch_on: config.torch_on_start,
            formats: config.default_formats.clone(),
            result: None,
            banner: None,
            config,
        }
    }

    /// Mirror a session snapshot into the UI state.
    ///
    /// Leaves the banner and the config alone; those are page-owned.
    pub fn apply_view(&mut self, view: SessionView) {
        self.scan_state = view.state;
        self.facing = view.facing;
        self.torch_on = view.torch_on;
        self.formats = view.formats;
        self.result = view.result;
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_config(AppConfig::default())
    }
}
