// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Synthetic in-memory camera for desktop builds and tests.
//
// Produces a moving test-pattern instead of real video, honours the torch
// capability flag it was built with, and counts live streams so tests can
// assert the session's exactly-one-stream invariant.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use tracing::debug;

use scanwerk_core::error::{Result, ScanwerkError};
use scanwerk_core::types::FrameBuffer;

use crate::traits::{CameraCapabilities, CameraProvider, CameraRequest, CameraStream};

/// Deterministic stand-in for a real capture backend.
pub struct SyntheticCamera {
    torch_supported: bool,
    max_width: u32,
    max_height: u32,
    /// One-shot injected acquisition failure (e.g. "permission denied").
    fail_next: Mutex<Option<String>>,
    live_streams: Arc<AtomicU32>,
    acquisitions: AtomicU32,
}

impl SyntheticCamera {
    pub fn new() -> Self {
        Self {
            torch_supported: true,
            max_width: 1920,
            max_height: 1080,
            fail_next: Mutex::new(None),
            live_streams: Arc::new(AtomicU32::new(0)),
            acquisitions: AtomicU32::new(0),
        }
    }

    /// A camera whose capability set lacks the torch.
    pub fn without_torch() -> Self {
        Self {
            torch_supported: false,
            ..Self::new()
        }
    }

    /// Cap the resolution the camera will report, regardless of hints.
    pub fn with_max_resolution(mut self, width: u32, height: u32) -> Self {
        self.max_width = width;
        self.max_height = height;
        self
    }

    /// Make the next `acquire` fail with the given reason.
    pub fn fail_next_acquire(&self, reason: &str) {
        *self
            .fail_next
            .lock()
            .expect("failure injection lock poisoned") = Some(reason.to_string());
    }

    /// Number of streams currently live (acquired and not yet released).
    pub fn live_streams(&self) -> u32 {
        self.live_streams.load(Ordering::Relaxed)
    }

    /// Total number of successful acquisitions so far.
    pub fn acquisitions(&self) -> u32 {
        self.acquisitions.load(Ordering::Relaxed)
    }
}

impl Default for SyntheticCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraProvider for SyntheticCamera {
    fn acquire(&self, request: &CameraRequest) -> Result<Arc<dyn CameraStream>> {
        if let Some(reason) = self
            .fail_next
            .lock()
            .expect("failure injection lock poisoned")
            .take()
        {
            return Err(ScanwerkError::CameraAccess(reason));
        }

        let capabilities = CameraCapabilities {
            torch: self.torch_supported,
            width: request.width_hint.min(self.max_width),
            height: request.height_hint.min(self.max_height),
            facing: request.facing,
        };

        self.acquisitions.fetch_add(1, Ordering::Relaxed);
        self.live_streams.fetch_add(1, Ordering::Relaxed);
        debug!(
            facing = %request.facing,
            width = capabilities.width,
            height = capabilities.height,
            "synthetic camera acquired"
        );

        Ok(Arc::new(SyntheticStream {
            capabilities,
            torch_on: AtomicBool::new(false),
            live: AtomicBool::new(true),
            frame_counter: AtomicU32::new(0),
            live_streams: Arc::clone(&self.live_streams),
        }))
    }
}

/// A live synthetic stream.
struct SyntheticStream {
    capabilities: CameraCapabilities,
    torch_on: AtomicBool,
    live: AtomicBool,
    frame_counter: AtomicU32,
    /// Shared with the provider so it can report live-stream counts.
    live_streams: Arc<AtomicU32>,
}

impl SyntheticStream {
    fn release_tracks(&self) {
        if self.live.swap(false, Ordering::SeqCst) {
            self.live_streams.fetch_sub(1, Ordering::Relaxed);
            debug!(facing = %self.capabilities.facing, "synthetic camera released");
        }
    }
}

impl CameraStream for SyntheticStream {
    fn capabilities(&self) -> CameraCapabilities {
        self.capabilities
    }

    fn set_torch(&self, on: bool) -> Result<()> {
        if !self.capabilities.torch {
            return Err(ScanwerkError::TorchUnsupported);
        }
        if !self.is_live() {
            return Err(ScanwerkError::CameraAccess(
                "stream already released".into(),
            ));
        }
        self.torch_on.store(on, Ordering::Relaxed);
        Ok(())
    }

    fn grab_frame(&self) -> Result<FrameBuffer> {
        if !self.is_live() {
            return Err(ScanwerkError::CameraAccess(
                "stream already released".into(),
            ));
        }

        // Diagonal gradient drifting one step per frame — enough texture to
        // exercise downstream luma conversion without looking like noise.
        let tick = self.frame_counter.fetch_add(1, Ordering::Relaxed);
        let (w, h) = (self.capabilities.width, self.capabilities.height);
        let mut pixels = Vec::with_capacity((w as usize) * (h as usize) * 4);
        for y in 0..h {
            for x in 0..w {
                let v = ((x + y + tick) % 256) as u8;
                pixels.extend_from_slice(&[v, v, v, 255]);
            }
        }
        Ok(FrameBuffer::new(w, h, pixels))
    }

    fn release(&self) {
        self.release_tracks();
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }
}

impl Drop for SyntheticStream {
    fn drop(&mut self) {
        self.release_tracks();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanwerk_core::types::CameraFacing;

    fn request() -> CameraRequest {
        CameraRequest {
            facing: CameraFacing::Back,
            width_hint: 64,
            height_hint: 48,
        }
    }

    #[test]
    fn acquire_reports_clamped_capabilities() {
        let camera = SyntheticCamera::new().with_max_resolution(32, 32);
        let stream = camera.acquire(&request()).expect("acquire");
        let caps = stream.capabilities();
        assert_eq!((caps.width, caps.height), (32, 32));
        assert_eq!(caps.facing, CameraFacing::Back);
    }

    #[test]
    fn live_stream_count_tracks_release() {
        let camera = SyntheticCamera::new();
        let stream = camera.acquire(&request()).expect("acquire");
        assert_eq!(camera.live_streams(), 1);
        stream.release();
        assert_eq!(camera.live_streams(), 0);
        // Releasing twice must not underflow the counter.
        stream.release();
        assert_eq!(camera.live_streams(), 0);
    }

    #[test]
    fn drop_releases_the_stream() {
        let camera = SyntheticCamera::new();
        {
            let _stream = camera.acquire(&request()).expect("acquire");
            assert_eq!(camera.live_streams(), 1);
        }
        assert_eq!(camera.live_streams(), 0);
    }

    #[test]
    fn torchless_camera_rejects_the_constraint() {
        let camera = SyntheticCamera::without_torch();
        let stream = camera.acquire(&request()).expect("acquire");
        assert!(!stream.capabilities().torch);
        assert!(matches!(
            stream.set_torch(true),
            Err(ScanwerkError::TorchUnsupported)
        ));
    }

    #[test]
    fn injected_failure_hits_exactly_once() {
        let camera = SyntheticCamera::new();
        camera.fail_next_acquire("permission denied");
        assert!(matches!(
            camera.acquire(&request()),
            Err(ScanwerkError::CameraAccess(_))
        ));
        assert!(camera.acquire(&request()).is_ok());
    }

    #[test]
    fn frames_match_the_negotiated_resolution() {
        let camera = SyntheticCamera::new();
        let stream = camera.acquire(&request()).expect("acquire");
        let frame = stream.grab_frame().expect("frame");
        assert_eq!((frame.width, frame.height), (64, 48));
        assert_eq!(frame.pixels.len(), 64 * 48 * 4);
    }

    #[test]
    fn released_stream_stops_serving_frames() {
        let camera = SyntheticCamera::new();
        let stream = camera.acquire(&request()).expect("acquire");
        stream.release();
        assert!(stream.grab_frame().is_err());
        assert!(stream.set_torch(true).is_err());
    }
}
