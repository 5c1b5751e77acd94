// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The scan-session controller.
//
// Owns the state machine (Idle / Scanning / Error / HasResult), the single
// active camera stream, and the sampler task. Invariants:
//
//   - the stream handle exists iff state == Scanning
//   - the sampler task is live iff state == Scanning
//   - a start with an empty format set is rejected with no side effects
//
// All camera access goes through the bridge traits; all decoding goes
// through the `Decoder` seam. Stopping, in every form (explicit stop,
// camera switch, drop), releases the camera on the way out.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tracing::{debug, info, warn};

use scanwerk_bridge::traits::{CameraProvider, CameraRequest, CameraStream};
use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::types::{
    BarcodeFormat, CameraFacing, DecodedResult, FormatSet, ScanId, ScanState,
};

use crate::decoder::Decoder;
use crate::sampler::{self, SamplerHandle};

/// Tuning for a scan session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Period of the frame sampler.
    pub scan_interval: Duration,
    /// Ideal capture width passed to the camera request.
    pub width_hint: u32,
    /// Ideal capture height passed to the camera request.
    pub height_hint: u32,
    /// Facing mode before the user switches cameras.
    pub initial_facing: CameraFacing,
    /// Formats enabled before the user touches the panel.
    pub initial_formats: FormatSet,
    /// Ask for the torch as soon as the camera opens.
    pub torch_on_start: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            scan_interval: Duration::from_millis(300),
            width_hint: 1920,
            height_hint: 1080,
            initial_facing: CameraFacing::Back,
            initial_formats: FormatSet::default(),
            torch_on_start: false,
        }
    }
}

/// Mutable session state, shared with the sampler task.
pub(crate) struct SessionInner {
    pub(crate) state: ScanState,
    pub(crate) facing: CameraFacing,
    pub(crate) torch_on: bool,
    pub(crate) formats: FormatSet,
    pub(crate) stream: Option<Arc<dyn CameraStream>>,
    pub(crate) result: Option<DecodedResult>,
    pub(crate) last_error: Option<String>,
    /// In-flight guard: a camera acquisition is pending.
    pub(crate) acquiring: bool,
}

/// An interactive scan session.
///
/// Create one per scanner surface, wire a camera provider and a decoder in,
/// and drive it with `start` / `stop` / `switch_camera` / `toggle_torch` /
/// `toggle_format`. The session owns the camera stream exclusively; nothing
/// else may read or mutate it.
pub struct ScanSession {
    inner: Arc<Mutex<SessionInner>>,
    camera: Arc<dyn CameraProvider>,
    decoder: Arc<dyn Decoder>,
    config: SessionConfig,
    sampler: Option<SamplerHandle>,
}

impl ScanSession {
    pub fn new(
        camera: Arc<dyn CameraProvider>,
        decoder: Arc<dyn Decoder>,
        config: SessionConfig,
    ) -> Self {
        let inner = SessionInner {
            state: ScanState::Idle,
            facing: config.initial_facing,
            torch_on: config.torch_on_start,
            formats: config.initial_formats.clone(),
            stream: None,
            result: None,
            last_error: None,
            acquiring: false,
        };
        Self {
            inner: Arc::new(Mutex::new(inner)),
            camera,
            decoder,
            config,
            sampler: None,
        }
    }

    /// Replace the session tuning.
    ///
    /// The interval and resolution hints apply from the next `start()`;
    /// facing, torch, and format state are live on the session and are not
    /// reset by this call.
    pub fn configure(&mut self, config: SessionConfig) {
        self.config = config;
    }

    // -- Accessors -----------------------------------------------------------

    pub fn state(&self) -> ScanState {
        self.inner().state
    }

    pub fn facing(&self) -> CameraFacing {
        self.inner().facing
    }

    pub fn torch_on(&self) -> bool {
        self.inner().torch_on
    }

    pub fn formats(&self) -> FormatSet {
        self.inner().formats.clone()
    }

    pub fn result(&self) -> Option<DecodedResult> {
        self.inner().result.clone()
    }

    /// The message from the last camera failure, for the UI banner.
    pub fn last_error(&self) -> Option<String> {
        self.inner().last_error.clone()
    }

    pub fn is_scanning(&self) -> bool {
        self.state() == ScanState::Scanning
    }

    // -- Operations ----------------------------------------------------------

    /// Start a scan: acquire the camera, apply the torch constraint when
    /// requested and supported, and spawn the sampler.
    ///
    /// # Errors
    ///
    /// `EmptyFormatSet` when no symbologies are enabled (no side effects),
    /// `SessionBusy` when a scan is already starting or running, and
    /// `CameraAccess` / `PlatformUnavailable` when acquisition fails, in
    /// which case the session lands in `Error` with the message recorded and
    /// no partial stream retained.
    pub async fn start(&mut self) -> Result<()> {
        let scan_id = ScanId::new();

        let (request, torch_wanted) = {
            let mut inner = self.inner();
            if inner.formats.is_empty() {
                return Err(ScanwerkError::EmptyFormatSet);
            }
            if inner.acquiring || inner.state == ScanState::Scanning {
                return Err(ScanwerkError::SessionBusy);
            }
            inner.acquiring = true;
            inner.result = None;
            inner.last_error = None;
            (
                CameraRequest {
                    facing: inner.facing,
                    width_hint: self.config.width_hint,
                    height_hint: self.config.height_hint,
                },
                inner.torch_on,
            )
        };

        debug!(%scan_id, facing = %request.facing, "requesting camera");

        // Acquisition may block on a permission prompt or device negotiation.
        let provider = Arc::clone(&self.camera);
        let acquired =
            tokio::task::spawn_blocking(move || provider.acquire(&request)).await;

        let stream = match acquired {
            Ok(Ok(stream)) => stream,
            Ok(Err(err)) => return Err(self.fail_start(scan_id, err)),
            Err(join_err) => {
                let err =
                    ScanwerkError::CameraAccess(format!("camera task failed: {join_err}"));
                return Err(self.fail_start(scan_id, err));
            }
        };

        // Torch, when requested and the device can. An unsupported torch at
        // start is not an error; the scan proceeds without it.
        if torch_wanted {
            if stream.capabilities().torch {
                if let Err(err) = stream.set_torch(true) {
                    warn!(%scan_id, error = %err, "torch constraint failed");
                }
            } else {
                debug!(%scan_id, "torch requested but not supported by this device");
            }
        }

        let formats = {
            let mut inner = self.inner();
            inner.stream = Some(Arc::clone(&stream));
            inner.state = ScanState::Scanning;
            inner.acquiring = false;
            inner.formats.clone()
        };

        self.sampler = Some(sampler::spawn(
            scan_id,
            Arc::clone(&self.inner),
            stream,
            Arc::clone(&self.decoder),
            formats,
            self.config.scan_interval,
        ));

        info!(%scan_id, facing = %request.facing, "scan session started");
        Ok(())
    }

    /// Stop the scan: cancel the sampler, release the camera, return to
    /// Idle. Idempotent. A session the sampler already parked in `HasResult`
    /// keeps its result and state.
    pub async fn stop(&mut self) -> Result<()> {
        if let Some(handle) = self.sampler.take() {
            handle.shutdown.notify_one();
            if let Err(err) = handle.task.await
                && !err.is_cancelled()
            {
                warn!(error = %err, "sampler task join failed");
            }
        }

        let released = {
            let mut inner = self.inner();
            if inner.state != ScanState::HasResult {
                inner.state = ScanState::Idle;
            }
            inner.stream.take()
        };
        if let Some(stream) = released {
            stream.release();
            debug!("camera released");
        }
        Ok(())
    }

    /// Toggle the facing mode. A running scan is stopped and restarted with
    /// the new camera; a brief reacquisition gap is expected.
    pub async fn switch_camera(&mut self) -> Result<()> {
        let (was_scanning, facing) = {
            let mut inner = self.inner();
            if inner.acquiring {
                return Err(ScanwerkError::SessionBusy);
            }
            inner.facing = inner.facing.toggled();
            (inner.state == ScanState::Scanning, inner.facing)
        };

        info!(facing = %facing, "switching camera");
        if was_scanning {
            self.stop().await?;
            self.start().await?;
        }
        Ok(())
    }

    /// Flip the torch on the active stream.
    ///
    /// # Errors
    ///
    /// `TorchUnsupported` when the active device lacks the capability; the
    /// recorded torch state is left unchanged. With no active stream the
    /// call is a logged no-op.
    pub fn toggle_torch(&mut self) -> Result<()> {
        let (stream, want) = {
            let inner = self.inner();
            match inner.stream {
                Some(ref stream) => (Arc::clone(stream), !inner.torch_on),
                None => {
                    debug!("torch toggle ignored: no active camera stream");
                    return Ok(());
                }
            }
        };

        if !stream.capabilities().torch {
            return Err(ScanwerkError::TorchUnsupported);
        }
        stream.set_torch(want)?;
        self.inner().torch_on = want;
        debug!(torch = want, "torch constraint applied");
        Ok(())
    }

    /// Add or remove a symbology. Returns whether it is enabled afterwards.
    ///
    /// Not guarded while scanning: the running sampler keeps the snapshot it
    /// was started with, and the next start picks up the change.
    pub fn toggle_format(&mut self, format: BarcodeFormat) -> bool {
        let mut inner = self.inner();
        let enabled = inner.formats.toggle(format);
        debug!(%format, enabled, "format toggled");
        enabled
    }

    // -- Internals -----------------------------------------------------------

    fn inner(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().expect("session state lock poisoned")
    }

    /// Record a failed acquisition: Error state, message kept, no stream.
    fn fail_start(&self, scan_id: ScanId, err: ScanwerkError) -> ScanwerkError {
        warn!(%scan_id, error = %err, "camera acquisition failed");
        let mut inner = self.inner();
        inner.acquiring = false;
        inner.state = ScanState::Error;
        inner.last_error = Some(err.to_string());
        err
    }
}

impl Drop for ScanSession {
    /// Teardown must release the camera on every exit path, whether or not
    /// a decode is in flight.
    fn drop(&mut self) {
        if let Some(handle) = self.sampler.take() {
            handle.shutdown.notify_one();
            handle.task.abort();
        }
        if let Ok(mut inner) = self.inner.lock()
            && let Some(stream) = inner.stream.take()
        {
            stream.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicU32, Ordering};

    use crate::decoder::NoopDecoder;

    use scanwerk_bridge::synthetic::SyntheticCamera;
    use scanwerk_core::error::ScanwerkError;

    /// What one scripted decode call should do.
    enum Step {
        Miss,
        Fail,
        Hit,
    }

    /// Decoder that plays back a fixed script, then misses forever.
    struct ScriptedDecoder {
        steps: Mutex<VecDeque<Step>>,
        calls: AtomicU32,
    }

    impl ScriptedDecoder {
        fn new(steps: impl IntoIterator<Item = Step>) -> Arc<Self> {
            Arc::new(Self {
                steps: Mutex::new(steps.into_iter().collect()),
                calls: AtomicU32::new(0),
            })
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Decoder for ScriptedDecoder {
        fn decode(
            &self,
            _frame: &scanwerk_core::types::FrameBuffer,
            _formats: &FormatSet,
        ) -> Result<Option<DecodedResult>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.steps.lock().unwrap().pop_front() {
                Some(Step::Hit) => Ok(Some(DecodedResult::new(
                    BarcodeFormat::QrCode,
                    "HELLO",
                ))),
                Some(Step::Fail) => {
                    Err(ScanwerkError::Decode("synthetic decode failure".into()))
                }
                Some(Step::Miss) | None => Ok(None),
            }
        }
    }

    fn fast_config() -> SessionConfig {
        SessionConfig {
            scan_interval: Duration::from_millis(5),
            width_hint: 32,
            height_hint: 24,
            ..Default::default()
        }
    }

    fn session_with(
        camera: Arc<SyntheticCamera>,
        decoder: Arc<dyn Decoder>,
    ) -> ScanSession {
        ScanSession::new(camera, decoder, fast_config())
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(250)).await;
    }

    #[tokio::test]
    async fn start_with_empty_formats_is_rejected_without_side_effects() {
        let camera = Arc::new(SyntheticCamera::new());
        let mut session = ScanSession::new(
            Arc::clone(&camera) as Arc<dyn CameraProvider>,
            Arc::new(NoopDecoder),
            SessionConfig {
                initial_formats: FormatSet::empty(),
                ..fast_config()
            },
        );

        assert!(matches!(
            session.start().await,
            Err(ScanwerkError::EmptyFormatSet)
        ));
        assert_eq!(session.state(), ScanState::Idle);
        assert_eq!(camera.acquisitions(), 0);
        assert_eq!(camera.live_streams(), 0);
    }

    #[tokio::test]
    async fn start_holds_exactly_one_stream_and_stop_releases_it() {
        let camera = Arc::new(SyntheticCamera::new());
        let mut session = session_with(Arc::clone(&camera), Arc::new(NoopDecoder));

        session.start().await.expect("start");
        assert_eq!(session.state(), ScanState::Scanning);
        assert_eq!(camera.live_streams(), 1);

        session.stop().await.expect("stop");
        assert_eq!(session.state(), ScanState::Idle);
        assert_eq!(camera.live_streams(), 0);
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let camera = Arc::new(SyntheticCamera::new());
        let mut session = session_with(Arc::clone(&camera), Arc::new(NoopDecoder));

        // Stopping an idle session is a no-op.
        session.stop().await.expect("stop while idle");
        assert_eq!(session.state(), ScanState::Idle);

        session.start().await.expect("start");
        session.stop().await.expect("first stop");
        session.stop().await.expect("second stop");
        assert_eq!(camera.live_streams(), 0);
    }

    #[tokio::test]
    async fn start_while_scanning_is_rejected() {
        let camera = Arc::new(SyntheticCamera::new());
        let mut session = session_with(Arc::clone(&camera), Arc::new(NoopDecoder));

        session.start().await.expect("start");
        assert!(matches!(
            session.start().await,
            Err(ScanwerkError::SessionBusy)
        ));
        // The running scan is untouched.
        assert_eq!(session.state(), ScanState::Scanning);
        assert_eq!(camera.live_streams(), 1);

        session.stop().await.expect("stop");
    }

    #[tokio::test]
    async fn acquisition_failure_lands_in_error_with_no_stream() {
        let camera = Arc::new(SyntheticCamera::new());
        camera.fail_next_acquire("permission denied");
        let mut session = session_with(Arc::clone(&camera), Arc::new(NoopDecoder));

        assert!(matches!(
            session.start().await,
            Err(ScanwerkError::CameraAccess(_))
        ));
        assert_eq!(session.state(), ScanState::Error);
        assert!(
            session
                .last_error()
                .expect("error message recorded")
                .contains("permission denied")
        );
        assert_eq!(camera.live_streams(), 0);

        // A later start recovers.
        session.start().await.expect("retry start");
        assert_eq!(session.state(), ScanState::Scanning);
        session.stop().await.expect("stop");
    }

    #[tokio::test]
    async fn decode_hit_parks_session_with_that_result_and_stops_the_sampler() {
        let camera = Arc::new(SyntheticCamera::new());
        let decoder = ScriptedDecoder::new([Step::Miss, Step::Miss, Step::Hit]);
        let mut session = session_with(
            Arc::clone(&camera),
            Arc::clone(&decoder) as Arc<dyn Decoder>,
        );

        session.start().await.expect("start");
        settle().await;

        assert_eq!(session.state(), ScanState::HasResult);
        let result = session.result().expect("result held");
        assert_eq!(result.format, BarcodeFormat::QrCode);
        assert_eq!(result.text, "HELLO");
        assert_eq!(camera.live_streams(), 0);

        // The sampler must have stopped ticking.
        let calls_after_hit = decoder.calls();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(decoder.calls(), calls_after_hit);

        // An explicit stop afterwards preserves the parked result.
        session.stop().await.expect("stop");
        assert_eq!(session.state(), ScanState::HasResult);
        assert!(session.result().is_some());
    }

    #[tokio::test]
    async fn transient_decode_failures_do_not_stop_the_loop() {
        let camera = Arc::new(SyntheticCamera::new());
        let decoder =
            ScriptedDecoder::new([Step::Fail, Step::Fail, Step::Fail, Step::Hit]);
        let mut session = session_with(
            Arc::clone(&camera),
            Arc::clone(&decoder) as Arc<dyn Decoder>,
        );

        session.start().await.expect("start");
        settle().await;

        assert_eq!(session.state(), ScanState::HasResult);
        assert!(decoder.calls() >= 4);
    }

    #[tokio::test]
    async fn restart_discards_the_previous_result() {
        let camera = Arc::new(SyntheticCamera::new());
        let decoder = ScriptedDecoder::new([Step::Hit]);
        let mut session = session_with(
            Arc::clone(&camera),
            Arc::clone(&decoder) as Arc<dyn Decoder>,
        );

        session.start().await.expect("start");
        settle().await;
        assert_eq!(session.state(), ScanState::HasResult);

        // "Scan again": the old result is consumed, a fresh scan runs.
        session.start().await.expect("restart");
        assert_eq!(session.state(), ScanState::Scanning);
        assert!(session.result().is_none());
        session.stop().await.expect("stop");
    }

    #[tokio::test]
    async fn switch_camera_while_scanning_keeps_a_single_stream() {
        let camera = Arc::new(SyntheticCamera::new());
        let mut session = session_with(Arc::clone(&camera), Arc::new(NoopDecoder));

        session.start().await.expect("start");
        assert_eq!(session.facing(), CameraFacing::Back);

        session.switch_camera().await.expect("switch");
        assert_eq!(session.facing(), CameraFacing::Front);
        assert_eq!(session.state(), ScanState::Scanning);
        assert_eq!(camera.live_streams(), 1);
        assert_eq!(camera.acquisitions(), 2);

        session.stop().await.expect("stop");
        assert_eq!(camera.live_streams(), 0);
    }

    #[tokio::test]
    async fn switch_camera_while_idle_only_flips_the_facing() {
        let camera = Arc::new(SyntheticCamera::new());
        let mut session = session_with(Arc::clone(&camera), Arc::new(NoopDecoder));

        session.switch_camera().await.expect("switch");
        assert_eq!(session.facing(), CameraFacing::Front);
        assert_eq!(session.state(), ScanState::Idle);
        assert_eq!(camera.acquisitions(), 0);
    }

    #[tokio::test]
    async fn torch_toggle_on_a_torchless_device_is_surfaced_and_changes_nothing() {
        let camera = Arc::new(SyntheticCamera::without_torch());
        let mut session = session_with(Arc::clone(&camera), Arc::new(NoopDecoder));

        session.start().await.expect("start");
        assert!(matches!(
            session.toggle_torch(),
            Err(ScanwerkError::TorchUnsupported)
        ));
        assert!(!session.torch_on());
        assert_eq!(session.state(), ScanState::Scanning);

        session.stop().await.expect("stop");
    }

    #[tokio::test]
    async fn torch_toggles_both_ways_on_a_capable_device() {
        let camera = Arc::new(SyntheticCamera::new());
        let mut session = session_with(Arc::clone(&camera), Arc::new(NoopDecoder));

        session.start().await.expect("start");
        session.toggle_torch().expect("torch on");
        assert!(session.torch_on());
        session.toggle_torch().expect("torch off");
        assert!(!session.torch_on());

        session.stop().await.expect("stop");
    }

    #[tokio::test]
    async fn torch_toggle_without_a_stream_is_a_no_op() {
        let camera = Arc::new(SyntheticCamera::new());
        let mut session = session_with(Arc::clone(&camera), Arc::new(NoopDecoder));

        session.toggle_torch().expect("no-op");
        assert!(!session.torch_on());
    }

    #[tokio::test]
    async fn format_toggle_is_not_guarded_while_scanning() {
        let camera = Arc::new(SyntheticCamera::new());
        let mut session = session_with(Arc::clone(&camera), Arc::new(NoopDecoder));

        session.start().await.expect("start");
        assert!(session.toggle_format(BarcodeFormat::Aztec));
        assert!(session.formats().contains(BarcodeFormat::Aztec));
        assert!(!session.toggle_format(BarcodeFormat::Aztec));

        session.stop().await.expect("stop");
    }

    #[tokio::test]
    async fn dropping_a_scanning_session_releases_the_camera() {
        let camera = Arc::new(SyntheticCamera::new());
        {
            let mut session = session_with(Arc::clone(&camera), Arc::new(NoopDecoder));
            session.start().await.expect("start");
            assert_eq!(camera.live_streams(), 1);
        }
        assert_eq!(camera.live_streams(), 0);
    }
}
