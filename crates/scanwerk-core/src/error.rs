// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Scanwerk.

use thiserror::Error;

/// Top-level error type for all Scanwerk operations.
#[derive(Debug, Error)]
pub enum ScanwerkError {
    // -- Camera errors --
    #[error("camera access failed: {0}")]
    CameraAccess(String),

    #[error("the active camera has no torch")]
    TorchUnsupported,

    // -- Session errors --
    #[error("no barcode formats selected")]
    EmptyFormatSet,

    #[error("a scan is already starting or running")]
    SessionBusy,

    // -- Decode errors --
    #[error("frame decode failed: {0}")]
    Decode(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // -- Platform bridge --
    #[error("no camera backend on this platform")]
    PlatformUnavailable,
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ScanwerkError>;
