// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Stub camera for builds where no capture backend is available.
//
// `acquire` always returns `PlatformUnavailable` — real backends live behind
// the platform dispatch in lib.rs.

use std::sync::Arc;

use scanwerk_core::error::{Result, ScanwerkError};

use crate::traits::{CameraProvider, CameraRequest, CameraStream};

/// No-op camera returned on platforms without capture hardware.
pub struct StubCamera;

impl CameraProvider for StubCamera {
    fn acquire(&self, request: &CameraRequest) -> Result<Arc<dyn CameraStream>> {
        tracing::warn!(facing = %request.facing, "CameraProvider::acquire called on stub camera");
        Err(ScanwerkError::PlatformUnavailable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanwerk_core::types::CameraFacing;

    #[test]
    fn stub_refuses_to_acquire() {
        let request = CameraRequest {
            facing: CameraFacing::Back,
            width_hint: 1920,
            height_hint: 1080,
        };
        assert!(matches!(
            StubCamera.acquire(&request),
            Err(ScanwerkError::PlatformUnavailable)
        ));
    }
}
