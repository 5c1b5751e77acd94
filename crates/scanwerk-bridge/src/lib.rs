// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanwerk — camera capability bridge.
//
// Defines the provider/stream traits the scan session is written against and
// the platform dispatch that picks an implementation. Native mobile capture
// backends slot in behind `default_camera` without touching session logic.

pub mod stub;
pub mod synthetic;
pub mod traits;

use std::sync::Arc;

/// The default camera provider for the target platform.
///
/// Desktop builds get the synthetic camera so the scan loop can be exercised
/// without capture hardware. Mobile targets currently get the stub, which
/// refuses to acquire, until their native backends land.
pub fn default_camera() -> Arc<dyn traits::CameraProvider> {
    #[cfg(any(target_os = "ios", target_os = "android"))]
    {
        Arc::new(stub::StubCamera)
    }
    #[cfg(not(any(target_os = "ios", target_os = "android")))]
    {
        Arc::new(synthetic::SyntheticCamera::new())
    }
}
