// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for the camera capability.
//
// The scan session never talks to a capture backend directly. It requests a
// stream through `CameraProvider`, and everything it may do with the live
// camera — capability query, torch constraint, frame grab, release — goes
// through `CameraStream`. Platforms without capture hardware provide the
// stub implementation.

use std::sync::Arc;

use scanwerk_core::error::Result;
use scanwerk_core::types::{CameraFacing, FrameBuffer};

/// Parameters for opening a camera.
///
/// Width and height are *hints* in the getUserMedia sense: the backend picks
/// the closest mode it supports and reports the actual one in
/// [`CameraCapabilities`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraRequest {
    /// Which physical camera to open.
    pub facing: CameraFacing,
    /// Ideal capture width in pixels.
    pub width_hint: u32,
    /// Ideal capture height in pixels.
    pub height_hint: u32,
}

/// What the acquired device can actually do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraCapabilities {
    /// Whether the device exposes a torch (flashlight) constraint.
    pub torch: bool,
    /// Actual capture width in pixels.
    pub width: u32,
    /// Actual capture height in pixels.
    pub height: u32,
    /// The facing mode that was actually opened.
    pub facing: CameraFacing,
}

/// Opens camera streams.
///
/// `acquire` may block while the platform settles the request (permission
/// prompt, device negotiation); callers on an async runtime should run it on
/// a blocking worker.
pub trait CameraProvider: Send + Sync {
    /// Open a camera matching the request.
    ///
    /// Returns the live stream, or `CameraAccess` when permission is denied
    /// or the device is unavailable, or `PlatformUnavailable` when this
    /// platform has no capture backend at all.
    fn acquire(&self, request: &CameraRequest) -> Result<Arc<dyn CameraStream>>;
}

/// A live camera stream.
///
/// Exactly one of these exists per scanning session; the session owns it
/// exclusively and releases it on stop or teardown.
pub trait CameraStream: Send + Sync {
    /// Query what the underlying device supports.
    fn capabilities(&self) -> CameraCapabilities;

    /// Apply the torch constraint.
    ///
    /// Fails with `TorchUnsupported` when the device lacks a torch.
    fn set_torch(&self, on: bool) -> Result<()>;

    /// Capture the current video frame into a pixel buffer.
    fn grab_frame(&self) -> Result<FrameBuffer>;

    /// Stop the underlying tracks. Idempotent; implementations must also
    /// release on drop so no exit path leaks the device.
    fn release(&self);

    /// Whether the tracks are still running.
    fn is_live(&self) -> bool;
}
