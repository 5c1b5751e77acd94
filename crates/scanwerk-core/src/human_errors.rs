// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the scan UI.
//
// Every technical error is mapped to plain English with a clear suggestion.
// The taxonomy uses three severity levels that drive UI presentation.

use crate::error::ScanwerkError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// A blip — retrying (or just waiting) is likely to fix it.
    Transient,
    /// The user must do something (grant permission, pick a format).
    ActionRequired,
    /// Cannot be fixed by retrying or user action on this device.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether trying again is worthwhile.
    pub retriable: bool,
    /// Severity level (drives icon/colour in UI).
    pub severity: Severity,
}

/// Convert a `ScanwerkError` into a `HumanError` suitable for the error banner.
pub fn humanize_error(err: &ScanwerkError) -> HumanError {
    match err {
        // -- Camera errors --
        ScanwerkError::CameraAccess(detail) => {
            let lower = detail.to_ascii_lowercase();
            if lower.contains("denied") || lower.contains("permission") {
                HumanError {
                    message: "Scanwerk isn't allowed to use the camera.".into(),
                    suggestion: "Grant camera access in your system settings, then start the scan again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "The camera couldn't be opened.".into(),
                    suggestion: format!(
                        "It may be in use by another app. Close other camera apps and try again. ({detail})"
                    ),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        ScanwerkError::TorchUnsupported => HumanError {
            message: "This camera has no flash.".into(),
            suggestion: "Try switching to the other camera, or add more light to the code.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },

        // -- Session errors --
        ScanwerkError::EmptyFormatSet => HumanError {
            message: "No barcode types are selected.".into(),
            suggestion: "Pick at least one format from the list, then start the scan.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        ScanwerkError::SessionBusy => HumanError {
            message: "The scanner is still starting.".into(),
            suggestion: "Give the camera a moment to open, then try again.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        // -- Decode errors --
        ScanwerkError::Decode(_) => HumanError {
            message: "That frame couldn't be read.".into(),
            suggestion: "Hold the code steady, 5-15cm from the camera, in good light.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        // -- Storage --
        ScanwerkError::Io(io_err) => {
            if io_err.kind() == std::io::ErrorKind::NotFound {
                HumanError {
                    message: "The file couldn't be found.".into(),
                    suggestion: "It may have been moved or deleted. Try choosing the file again.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else if io_err.kind() == std::io::ErrorKind::PermissionDenied {
                HumanError {
                    message: "The app doesn't have permission to read that file.".into(),
                    suggestion: "Check the file permissions, or copy the file somewhere else first.".into(),
                    retriable: false,
                    severity: Severity::ActionRequired,
                }
            } else {
                HumanError {
                    message: "There was a problem reading or writing a file.".into(),
                    suggestion: "Try again. If this keeps happening, your device's storage may be full.".into(),
                    retriable: true,
                    severity: Severity::Transient,
                }
            }
        }

        ScanwerkError::Serialization(_) => HumanError {
            message: "The app had an internal data problem.".into(),
            suggestion: "Try again. If this keeps happening, please report it.".into(),
            retriable: true,
            severity: Severity::Transient,
        },

        // -- Platform --
        ScanwerkError::PlatformUnavailable => HumanError {
            message: "There's no camera available on this device.".into(),
            suggestion: "Scanning needs a device with a camera. You can still decode a saved image file.".into(),
            retriable: false,
            severity: Severity::Permanent,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_denied_is_action_required() {
        let err = ScanwerkError::CameraAccess("permission denied by user".into());
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::ActionRequired);
        assert!(!human.retriable);
    }

    #[test]
    fn busy_camera_is_transient() {
        let err = ScanwerkError::CameraAccess("device busy".into());
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::Transient);
        assert!(human.retriable);
    }

    #[test]
    fn missing_torch_is_permanent() {
        let human = humanize_error(&ScanwerkError::TorchUnsupported);
        assert_eq!(human.severity, Severity::Permanent);
        assert!(!human.retriable);
    }

    #[test]
    fn empty_formats_is_action_required() {
        let human = humanize_error(&ScanwerkError::EmptyFormatSet);
        assert_eq!(human.severity, Severity::ActionRequired);
    }

    #[test]
    fn decode_blip_is_transient() {
        let human = humanize_error(&ScanwerkError::Decode("blur".into()));
        assert_eq!(human.severity, Severity::Transient);
        assert!(human.retriable);
    }
}
