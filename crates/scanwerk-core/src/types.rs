// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Scanwerk scan engine.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one scan attempt (one `start()`..`stop()` span).
///
/// Used to correlate log lines from the controller and the sampler task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScanId(pub Uuid);

impl ScanId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ScanId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ScanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle states of a scan session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanState {
    /// No camera held, no sampler running.
    Idle,
    /// Camera acquired, sampler ticking.
    Scanning,
    /// Camera acquisition or a constraint failed — see the session's last error.
    Error,
    /// A decode landed; the result is held until the next scan starts.
    HasResult,
}

/// Which physical camera is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraFacing {
    /// The user-facing (selfie) camera.
    Front,
    /// The world-facing camera. The default for barcode work.
    Back,
}

impl CameraFacing {
    /// The other camera.
    pub fn toggled(self) -> Self {
        match self {
            Self::Front => Self::Back,
            Self::Back => Self::Front,
        }
    }
}

impl Default for CameraFacing {
    fn default() -> Self {
        Self::Back
    }
}

impl std::fmt::Display for CameraFacing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Front => write!(f, "front"),
            Self::Back => write!(f, "back"),
        }
    }
}

/// A barcode symbology the decoder can be asked to look for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum BarcodeFormat {
    QrCode,
    DataMatrix,
    Aztec,
    Pdf417,
    MaxiCode,
    Code39,
    Code93,
    Code128,
    Codabar,
    Ean8,
    Ean13,
    UpcA,
    UpcE,
    Itf,
}

impl BarcodeFormat {
    /// The full symbology catalog, in presentation order.
    pub const ALL: [BarcodeFormat; 14] = [
        Self::QrCode,
        Self::DataMatrix,
        Self::Aztec,
        Self::Pdf417,
        Self::MaxiCode,
        Self::Code39,
        Self::Code93,
        Self::Code128,
        Self::Codabar,
        Self::Ean8,
        Self::Ean13,
        Self::UpcA,
        Self::UpcE,
        Self::Itf,
    ];

    /// UI label, matching the names decoding engines use for format filters.
    pub fn label(&self) -> &'static str {
        match self {
            Self::QrCode => "QRCode",
            Self::DataMatrix => "DataMatrix",
            Self::Aztec => "Aztec",
            Self::Pdf417 => "PDF417",
            Self::MaxiCode => "MaxiCode",
            Self::Code39 => "Code39",
            Self::Code93 => "Code93",
            Self::Code128 => "Code128",
            Self::Codabar => "Codabar",
            Self::Ean8 => "EAN-8",
            Self::Ean13 => "EAN-13",
            Self::UpcA => "UPC-A",
            Self::UpcE => "UPC-E",
            Self::Itf => "ITF",
        }
    }

    /// Parse a UI label back into a format.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.label() == label)
    }

    /// Whether this is a matrix (2D) symbology rather than a linear (1D) one.
    pub fn is_two_dimensional(&self) -> bool {
        matches!(
            self,
            Self::QrCode | Self::DataMatrix | Self::Aztec | Self::Pdf417 | Self::MaxiCode
        )
    }
}

impl std::fmt::Display for BarcodeFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The set of symbologies enabled for a scan.
///
/// Order-irrelevant. A scan may only start when the set is non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatSet(BTreeSet<BarcodeFormat>);

impl FormatSet {
    /// An empty set. Scanning with it is rejected.
    pub fn empty() -> Self {
        Self(BTreeSet::new())
    }

    /// Every known symbology enabled.
    pub fn all() -> Self {
        BarcodeFormat::ALL.iter().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, format: BarcodeFormat) -> bool {
        self.0.contains(&format)
    }

    pub fn insert(&mut self, format: BarcodeFormat) -> bool {
        self.0.insert(format)
    }

    pub fn remove(&mut self, format: BarcodeFormat) -> bool {
        self.0.remove(&format)
    }

    /// Add the format if absent, remove it if present.
    /// Returns whether the format is enabled afterwards.
    pub fn toggle(&mut self, format: BarcodeFormat) -> bool {
        if self.0.remove(&format) {
            false
        } else {
            self.0.insert(format);
            true
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = BarcodeFormat> + '_ {
        self.0.iter().copied()
    }
}

impl Default for FormatSet {
    /// The out-of-the-box selection: QR Code, Data Matrix, and Code 128.
    fn default() -> Self {
        [
            BarcodeFormat::QrCode,
            BarcodeFormat::DataMatrix,
            BarcodeFormat::Code128,
        ]
        .into_iter()
        .collect()
    }
}

impl FromIterator<BarcodeFormat> for FormatSet {
    fn from_iter<T: IntoIterator<Item = BarcodeFormat>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A successfully decoded payload.
///
/// Produced by the decoder, held by the session until the next scan starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedResult {
    /// The symbology that matched.
    pub format: BarcodeFormat,
    /// The decoded text payload.
    pub text: String,
    /// When the decode landed.
    pub decoded_at: DateTime<Utc>,
}

impl DecodedResult {
    pub fn new(format: BarcodeFormat, text: impl Into<String>) -> Self {
        Self {
            format,
            text: text.into(),
            decoded_at: Utc::now(),
        }
    }
}

/// One captured video frame.
///
/// Tightly packed RGBA8, row-major, `width * height * 4` bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl FrameBuffer {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(pixels.len(), (width as usize) * (height as usize) * 4);
        Self {
            width,
            height,
            pixels,
        }
    }

    /// A frame filled with a single RGBA colour.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take((width as usize) * (height as usize) * 4)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Collapse to an 8-bit luma plane for decoders that want grayscale.
    ///
    /// Integer BT.601 approximation: Y = (76*R + 150*G + 29*B) >> 8.
    pub fn to_luma(&self) -> Vec<u8> {
        let mut luma = Vec::with_capacity((self.width as usize) * (self.height as usize));
        for px in self.pixels.chunks_exact(4) {
            let y = (76 * px[0] as u32 + 150 * px[1] as u32 + 29 * px[2] as u32) >> 8;
            luma.push(y as u8);
        }
        luma
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_labels_round_trip() {
        for format in BarcodeFormat::ALL {
            assert_eq!(BarcodeFormat::from_label(format.label()), Some(format));
        }
    }

    #[test]
    fn catalog_has_fourteen_symbologies() {
        assert_eq!(BarcodeFormat::ALL.len(), 14);
        assert_eq!(FormatSet::all().len(), 14);
    }

    #[test]
    fn default_selection_is_qr_datamatrix_code128() {
        let set = FormatSet::default();
        assert_eq!(set.len(), 3);
        assert!(set.contains(BarcodeFormat::QrCode));
        assert!(set.contains(BarcodeFormat::DataMatrix));
        assert!(set.contains(BarcodeFormat::Code128));
    }

    #[test]
    fn toggle_flips_membership() {
        let mut set = FormatSet::empty();
        assert!(set.toggle(BarcodeFormat::Aztec));
        assert!(set.contains(BarcodeFormat::Aztec));
        assert!(!set.toggle(BarcodeFormat::Aztec));
        assert!(set.is_empty());
    }

    #[test]
    fn facing_toggles_both_ways() {
        assert_eq!(CameraFacing::Back.toggled(), CameraFacing::Front);
        assert_eq!(CameraFacing::Front.toggled(), CameraFacing::Back);
        assert_eq!(CameraFacing::default(), CameraFacing::Back);
    }

    #[test]
    fn luma_of_extremes() {
        // The integer coefficients sum to 255, so full white lands on 254.
        let white = FrameBuffer::filled(2, 1, [255, 255, 255, 255]);
        assert_eq!(white.to_luma(), vec![254, 254]);

        let black = FrameBuffer::filled(1, 1, [0, 0, 0, 255]);
        assert_eq!(black.to_luma(), vec![0]);

        // Pure red: (76 * 255) >> 8 = 75.
        let red = FrameBuffer::filled(1, 1, [255, 0, 0, 255]);
        assert_eq!(red.to_luma(), vec![75]);
    }

    #[test]
    fn luma_plane_matches_frame_dimensions() {
        let frame = FrameBuffer::filled(8, 6, [10, 20, 30, 255]);
        assert_eq!(frame.to_luma().len(), 48);
    }
}
