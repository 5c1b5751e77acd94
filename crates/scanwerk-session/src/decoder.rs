// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The decoder boundary.
//
// Decoding is an external capability: one frame and the enabled format set
// go in, at most one payload comes out. The session performs no aggregation
// or voting — the first hit ends the scan.

use scanwerk_core::error::Result;
use scanwerk_core::types::{DecodedResult, FormatSet, FrameBuffer};

/// A pluggable decoding engine.
///
/// Implementations are called once per sampling tick, on a blocking worker,
/// so they may burn CPU freely. Errors are treated as transient by the
/// sampler: logged, never surfaced, never fatal to the loop.
pub trait Decoder: Send + Sync {
    /// Inspect one frame for any of the enabled symbologies.
    fn decode(
        &self,
        frame: &FrameBuffer,
        formats: &FormatSet,
    ) -> Result<Option<DecodedResult>>;
}

/// Placeholder engine that never matches.
///
/// Stands in until a real engine is wired behind the trait; the session,
/// sampler, and UI behave identically either way.
pub struct NoopDecoder;

impl Decoder for NoopDecoder {
    fn decode(
        &self,
        _frame: &FrameBuffer,
        _formats: &FormatSet,
    ) -> Result<Option<DecodedResult>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_decoder_never_matches() {
        let frame = FrameBuffer::filled(4, 4, [0, 0, 0, 255]);
        let outcome = NoopDecoder
            .decode(&frame, &FormatSet::all())
            .expect("noop decode cannot fail");
        assert!(outcome.is_none());
    }
}
