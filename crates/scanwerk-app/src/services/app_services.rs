// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer — owns the scan session and the persisted config,
// and provides async-friendly methods for the Dioxus UI to call.
//
// The session is wrapped in `Arc<tokio::sync::Mutex<>>` because its
// operations are async (camera acquisition, sampler teardown) and the UI
// drives it from spawned tasks. Lock contention is minimal: every session
// call is short apart from the acquisition itself.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::info;

use scanwerk_core::AppConfig;
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::types::{
    BarcodeFormat, CameraFacing, DecodedResult, FormatSet, FrameBuffer, ScanState,
};
use scanwerk_session::{Decoder, NoopDecoder, ScanSession, SessionConfig};

use super::data_dir;

/// Read-only snapshot of the scan session for rendering.
#[derive(Debug, Clone)]
pub struct SessionView {
    pub state: ScanState,
    pub facing: CameraFacing,
    pub torch_on: bool,
    pub formats: FormatSet,
    pub result: Option<DecodedResult>,
    pub last_error: Option<String>,
}

/// Shared application services accessible from all Dioxus components via
/// `use_context::<AppServices>()`.
///
/// All fields are cheaply cloneable (Arc-wrapped) so that the struct can be
/// passed into closures and async blocks without lifetime issues.
#[derive(Clone)]
pub struct AppServices {
    session: Arc<tokio::sync::Mutex<ScanSession>>,
    /// The decoding engine, shared with the session. Also used directly for
    /// the desktop decode-from-image-file path.
    decoder: Arc<dyn Decoder>,
    config: Arc<Mutex<AppConfig>>,
    data_dir: PathBuf,
}

impl AppServices {
    /// Initialise all services. Call once at app startup.
    ///
    /// Loads the persisted config (or defaults), picks the platform camera,
    /// and builds the scan session around the configured decoder.
    pub fn init() -> Self {
        let dir = data_dir::data_dir();
        info!(path = %dir.display(), "initialising app services");

        let config = load_config(&dir).unwrap_or_default();

        let camera = scanwerk_bridge::default_camera();
        // The stand-in engine never matches; swap in a real decoder here.
        let decoder: Arc<dyn Decoder> = Arc::new(NoopDecoder);
        let session = ScanSession::new(camera, Arc::clone(&decoder), session_config(&config));

        info!("app services initialised");

        Self {
            session: Arc::new(tokio::sync::Mutex::new(session)),
            decoder,
            config: Arc::new(Mutex::new(config)),
            data_dir: dir,
        }
    }

    // -- Scan session ----------------------------------------------------------

    pub async fn start_scan(&self) -> Result<()> {
        self.session.lock().await.start().await
    }

    pub async fn stop_scan(&self) -> Result<()> {
        self.session.lock().await.stop().await
    }

    pub async fn switch_camera(&self) -> Result<()> {
        self.session.lock().await.switch_camera().await
    }

    pub async fn toggle_torch(&self) -> Result<()> {
        self.session.lock().await.toggle_torch()
    }

    /// Toggle a symbology. Returns whether it is enabled afterwards.
    pub async fn toggle_format(&self, format: BarcodeFormat) -> bool {
        self.session.lock().await.toggle_format(format)
    }

    /// Snapshot the session for the UI.
    pub async fn session_view(&self) -> SessionView {
        let session = self.session.lock().await;
        SessionView {
            state: session.state(),
            facing: session.facing(),
            torch_on: session.torch_on(),
            formats: session.formats(),
            result: session.result(),
            last_error: session.last_error(),
        }
    }

    // -- Image decode (desktop) --------------------------------------------------

    /// Run the decoding engine over a saved image instead of a live frame.
    ///
    /// Uses the session's current format selection.
    pub async fn decode_image_bytes(&self, bytes: &[u8]) -> Result<Option<DecodedResult>> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| ScanwerkError::Decode(format!("image load failed: {e}")))?;
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        let frame = FrameBuffer::new(width, height, rgba.into_raw());

        let formats = self.session.lock().await.formats();
        let decoder = Arc::clone(&self.decoder);
        tokio::task::spawn_blocking(move || decoder.decode(&frame, &formats))
            .await
            .map_err(|e| ScanwerkError::Decode(format!("decode task failed: {e}")))?
    }

    // -- Config persistence --------------------------------------------------

    /// Get a clone of the current config.
    pub fn config(&self) -> AppConfig {
        self.config.lock().expect("config lock poisoned").clone()
    }

    /// Update and persist the config, and re-tune the session for the next
    /// start. A running scan keeps its current tuning.
    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        *self.config.lock().expect("config lock poisoned") = config.clone();
        self.session.lock().await.configure(session_config(config));
        persist_config(&self.data_dir, config)
    }

    /// Path to the data directory.
    pub fn data_dir(&self) -> &PathBuf {
        &self.data_dir
    }
}

/// Map the persisted app config onto session tuning.
fn session_config(config: &AppConfig) -> SessionConfig {
    SessionConfig {
        scan_interval: Duration::from_millis(config.scan_interval_ms),
        width_hint: config.width_hint,
        height_hint: config.height_hint,
        initial_facing: config.default_facing,
        initial_formats: config.default_formats.clone(),
        torch_on_start: config.torch_on_start,
    }
}

// -- Config file persistence -------------------------------------------------

const CONFIG_FILE: &str = "config.json";

fn load_config(data_dir: &std::path::Path) -> Option<AppConfig> {
    let path = data_dir.join(CONFIG_FILE);
    let data = std::fs::read_to_string(&path).ok()?;
    serde_json::from_str(&data).ok()
}

fn persist_config(data_dir: &std::path::Path, config: &AppConfig) -> Result<()> {
    let path = data_dir.join(CONFIG_FILE);
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(&path, json)?;
    Ok(())
}
