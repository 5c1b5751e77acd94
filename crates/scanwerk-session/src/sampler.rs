// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The frame sampler — a cancellable periodic task bound to one scan.
//
// Each tick grabs the current frame and hands it to the decoder on a
// blocking worker. A hit parks the session in HasResult, releases the
// camera, and ends the task; misses and per-frame failures keep the loop
// alive. The decode is awaited inside the tick body and missed ticks are
// coalesced, so ticks never overlap or stack up behind a slow decoder.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use scanwerk_bridge::traits::CameraStream;
use scanwerk_core::types::{FormatSet, ScanId, ScanState};

use crate::decoder::Decoder;
use crate::session::SessionInner;

/// Handle to a running sampler. The shutdown signal is per-run so a stale
/// permit from a previous scan can never end a new one early.
pub(crate) struct SamplerHandle {
    pub(crate) task: JoinHandle<()>,
    pub(crate) shutdown: Arc<Notify>,
}

/// Spawn the sampler for one scan.
pub(crate) fn spawn(
    scan_id: ScanId,
    inner: Arc<Mutex<SessionInner>>,
    stream: Arc<dyn CameraStream>,
    decoder: Arc<dyn Decoder>,
    formats: FormatSet,
    period: Duration,
) -> SamplerHandle {
    let shutdown = Arc::new(Notify::new());
    let signal = Arc::clone(&shutdown);
    let task = tokio::spawn(async move {
        run(scan_id, inner, stream, decoder, formats, period, signal).await;
    });
    SamplerHandle { task, shutdown }
}

async fn run(
    scan_id: ScanId,
    inner: Arc<Mutex<SessionInner>>,
    stream: Arc<dyn CameraStream>,
    decoder: Arc<dyn Decoder>,
    formats: FormatSet,
    period: Duration,
    shutdown: Arc<Notify>,
) {
    // First tick lands one full period after start; the camera has nothing
    // worth decoding at t=0.
    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    debug!(%scan_id, period_ms = period.as_millis(), "sampler running");

    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                debug!(%scan_id, "sampler received shutdown signal");
                break;
            }
            _ = ticker.tick() => {
                if tick(scan_id, &inner, &stream, &decoder, &formats).await {
                    break;
                }
            }
        }
    }
}

/// One sampling tick. Returns `true` when the scan is finished.
async fn tick(
    scan_id: ScanId,
    inner: &Arc<Mutex<SessionInner>>,
    stream: &Arc<dyn CameraStream>,
    decoder: &Arc<dyn Decoder>,
    formats: &FormatSet,
) -> bool {
    let frame = match stream.grab_frame() {
        Ok(frame) => frame,
        Err(err) => {
            debug!(%scan_id, error = %err, "frame grab failed");
            return false;
        }
    };

    // Decoding is CPU-bound; keep it off the runtime workers.
    let decoder = Arc::clone(decoder);
    let formats = formats.clone();
    let outcome = tokio::task::spawn_blocking(move || decoder.decode(&frame, &formats)).await;

    match outcome {
        Ok(Ok(Some(result))) => {
            info!(%scan_id, format = %result.format, "decode hit — ending scan");
            let released = {
                let mut inner = inner.lock().expect("session state lock poisoned");
                inner.result = Some(result);
                inner.state = ScanState::HasResult;
                inner.stream.take()
            };
            if let Some(stream) = released {
                stream.release();
            }
            true
        }
        Ok(Ok(None)) => false,
        Ok(Err(err)) => {
            // Per-frame decode failures are expected noise.
            debug!(%scan_id, error = %err, "transient decode failure");
            false
        }
        Err(err) => {
            warn!(%scan_id, error = %err, "decode worker failed");
            false
        }
    }
}
