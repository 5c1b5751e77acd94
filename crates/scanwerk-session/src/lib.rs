// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scanwerk — scan-session engine.
//
// `ScanSession` owns the camera lifecycle and the state machine; the frame
// sampler is a cancellable periodic task bound to the session; `Decoder` is
// the seam a real decoding engine plugs into.

pub mod decoder;
mod sampler;
pub mod session;

pub use decoder::{Decoder, NoopDecoder};
pub use session::{ScanSession, SessionConfig};
