// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Scan page — format selection, live scan view, result and error display.
//
// The format panel is hidden while a scan runs. On desktop the camera is
// synthetic, so the live view renders the scan-region overlay and status
// text instead of video; a saved image can be decoded through the same
// engine instead.

use std::time::Duration;

use dioxus::prelude::*;

use scanwerk_core::human_errors::humanize_error;
use scanwerk_core::types::{BarcodeFormat, FormatSet, ScanState};

use crate::services::app_services::AppServices;
use crate::state::AppState;

/// Mirror the session into the UI state once.
async fn sync_session(svc: &AppServices, mut state: Signal<AppState>) {
    let view = svc.session_view().await;
    state.write().apply_view(view);
}

/// Start a scan, then poll the session until it leaves Scanning, so a
/// sampler decode hit lands in the UI without user input. Shared by the
/// start button and the result card's "Scan Again".
fn start_scan_action(svc: AppServices, mut state: Signal<AppState>) {
    spawn(async move {
        match svc.start_scan().await {
            Ok(()) => {
                state.write().banner = None;
                sync_session(&svc, state).await;
                loop {
                    tokio::time::sleep(Duration::from_millis(200)).await;
                    let view = svc.session_view().await;
                    let done = view.state != ScanState::Scanning;
                    state.write().apply_view(view);
                    if done {
                        break;
                    }
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "scan start failed");
                state.write().banner = Some(humanize_error(&err));
                sync_session(&svc, state).await;
            }
        }
    });
}

#[component]
pub fn Scan() -> Element {
    let svc = use_context::<AppServices>();
    let mut state = use_context::<Signal<AppState>>();
    let mut file_status = use_signal(|| Option::<String>::None);

    let scanning = state.read().scan_state == ScanState::Scanning;
    let formats = state.read().formats.clone();
    let facing = state.read().facing;
    let torch_on = state.read().torch_on;
    let result = state.read().result.clone();
    let banner = state.read().banner.clone();
    let decoded_at = result
        .as_ref()
        .map(|r| r.decoded_at.format("%H:%M:%S UTC").to_string());

    rsx! {
        div {
            // Header
            div { style: "text-align: center; margin-bottom: 16px;",
                h1 { "Barcode Scanner" }
                p { style: "color: #666;", "QR Code, Data Matrix, and every common 1D/2D symbology." }
            }

            // Format selection (hidden while scanning)
            if !scanning {
                FormatPanel { formats: formats.clone() }
            }

            // Camera view
            div { style: "position: relative; background: #111; border-radius: 12px; overflow: hidden; aspect-ratio: 4 / 3; margin-bottom: 16px;",
                if scanning {
                    // Scan-region overlay
                    div { style: "position: absolute; inset: 0; display: flex; align-items: center; justify-content: center; pointer-events: none;",
                        div { style: "width: 80%; height: 60%; border: 4px solid #007aff; border-radius: 12px;" }
                    }
                    p { style: "position: absolute; top: 8px; left: 0; right: 0; text-align: center; color: #eee; font-size: 14px;",
                        "Scanning with the {facing} camera..."
                    }

                    // Controls
                    div { style: "position: absolute; bottom: 12px; left: 0; right: 0; display: flex; justify-content: center; gap: 12px;",
                        button {
                            style: "padding: 10px 14px; border-radius: 20px; border: none; background: rgba(60,60,60,0.85); color: white;",
                            onclick: {
                                let svc = svc.clone();
                                move |_| {
                                    let svc = svc.clone();
                                    spawn(async move {
                                        match svc.toggle_torch().await {
                                            Ok(()) => state.write().banner = None,
                                            Err(err) => {
                                                tracing::warn!(error = %err, "torch toggle failed");
                                                state.write().banner = Some(humanize_error(&err));
                                            }
                                        }
                                        sync_session(&svc, state).await;
                                    });
                                }
                            },
                            if torch_on { "Torch: on" } else { "Torch: off" }
                        }
                        button {
                            style: "padding: 10px 14px; border-radius: 20px; border: none; background: rgba(60,60,60,0.85); color: white;",
                            onclick: {
                                let svc = svc.clone();
                                move |_| {
                                    let svc = svc.clone();
                                    spawn(async move {
                                        if let Err(err) = svc.switch_camera().await {
                                            tracing::warn!(error = %err, "camera switch failed");
                                            state.write().banner = Some(humanize_error(&err));
                                        }
                                        sync_session(&svc, state).await;
                                    });
                                }
                            },
                            "Switch Camera"
                        }
                        button {
                            style: "padding: 10px 14px; border-radius: 20px; border: none; background: #ff3b30; color: white;",
                            onclick: {
                                let svc = svc.clone();
                                move |_| {
                                    let svc = svc.clone();
                                    spawn(async move {
                                        if let Err(err) = svc.stop_scan().await {
                                            tracing::warn!(error = %err, "scan stop failed");
                                        }
                                        sync_session(&svc, state).await;
                                    });
                                }
                            },
                            "Stop"
                        }
                    }
                } else {
                    div { style: "width: 100%; height: 100%; display: flex; align-items: center; justify-content: center;",
                        button {
                            style: if formats.is_empty() {
                                "padding: 14px 24px; border-radius: 10px; border: none; background: #555; color: #999; font-size: 16px;"
                            } else {
                                "padding: 14px 24px; border-radius: 10px; border: none; background: #007aff; color: white; font-size: 16px;"
                            },
                            disabled: formats.is_empty(),
                            onclick: {
                                let svc = svc.clone();
                                move |_| start_scan_action(svc.clone(), state)
                            },
                            "Start Scanning"
                        }
                    }
                }
            }

            // Tips
            if scanning {
                div { style: "background: #eaf3ff; border-radius: 12px; padding: 16px; margin-bottom: 16px;",
                    h3 { "Tips for a clean read" }
                    ul { style: "color: #555; font-size: 14px; margin: 8px 0 0 16px;",
                        li { "Hold the camera 5-15cm from the code" }
                        li { "Make sure the code is well lit" }
                        li { "Keep the camera square to the code, not at an angle" }
                        li { "For small codes, move closer or turn the torch on" }
                    }
                }
            }

            // Error banner
            if let Some(ref banner) = banner {
                div { style: "background: #fdecea; border: 1px solid #ff3b30; border-radius: 12px; padding: 12px 16px; margin-bottom: 16px;",
                    p { style: "font-weight: 600; margin-bottom: 4px;", "{banner.message}" }
                    p { style: "color: #666; font-size: 14px;", "{banner.suggestion}" }
                }
            }

            // Result card
            if let Some(ref result) = result {
                div { style: "background: #e8f8ee; border: 1px solid #34c759; border-radius: 12px; padding: 16px; margin-bottom: 16px;",
                    h3 { "Scan result" }
                    div { style: "background: white; border-radius: 8px; padding: 12px; margin: 8px 0;",
                        p { style: "color: #888; font-size: 12px; margin-bottom: 4px;", "Symbology" }
                        p { style: "font-family: monospace; font-size: 18px;", "{result.format}" }
                    }
                    div { style: "background: white; border-radius: 8px; padding: 12px; margin: 8px 0;",
                        p { style: "color: #888; font-size: 12px; margin-bottom: 4px;", "Content" }
                        p { style: "font-family: monospace; word-break: break-all;", "{result.text}" }
                    }
                    if let Some(ref stamp) = decoded_at {
                        p { style: "color: #888; font-size: 12px;", "Decoded at {stamp}" }
                    }
                    button {
                        style: "width: 100%; margin-top: 8px; padding: 12px; border-radius: 8px; border: none; background: #007aff; color: white; font-size: 15px;",
                        onclick: {
                            let svc = svc.clone();
                            move |_| start_scan_action(svc.clone(), state)
                        },
                        "Scan Again"
                    }
                }
            }

            // Desktop substitute for live capture: decode a saved image file.
            div { style: "background: #f5f5f7; border-radius: 12px; padding: 16px;",
                h3 { "Decode from a file" }
                p { style: "color: #888; font-size: 13px; margin: 4px 0 12px;",
                    "Run the decoding engine over a saved image instead of the live camera."
                }
                button {
                    style: "width: 100%; padding: 12px; border-radius: 8px; border: 2px dashed #007aff; color: #007aff; background: white; font-size: 15px;",
                    onclick: {
                        let svc = svc.clone();
                        move |_| {
                            #[cfg(not(any(target_os = "ios", target_os = "android")))]
                            {
                                if let Some(path) = rfd::FileDialog::new()
                                    .add_filter(
                                        "Images",
                                        &["jpg", "jpeg", "png", "bmp", "tif", "tiff", "webp"],
                                    )
                                    .pick_file()
                                {
                                    match std::fs::read(&path) {
                                        Ok(bytes) => {
                                            tracing::info!(path = %path.display(), bytes = bytes.len(), "image loaded for decoding");
                                            let svc = svc.clone();
                                            spawn(async move {
                                                match svc.decode_image_bytes(&bytes).await {
                                                    Ok(Some(result)) => {
                                                        tracing::info!(format = %result.format, "image decoded");
                                                        state.write().result = Some(result);
                                                        file_status.set(None);
                                                    }
                                                    Ok(None) => {
                                                        file_status.set(Some(
                                                            "No barcode found in that image.".into(),
                                                        ));
                                                    }
                                                    Err(err) => {
                                                        file_status.set(Some(format!(
                                                            "Decode failed: {err}"
                                                        )));
                                                    }
                                                }
                                            });
                                        }
                                        Err(e) => {
                                            file_status.set(Some(format!("Error: {e}")));
                                        }
                                    }
                                }
                            }
                            #[cfg(any(target_os = "ios", target_os = "android"))]
                            {
                                file_status.set(Some("File decode is desktop-only.".into()));
                            }
                        }
                    },
                    "Choose Image..."
                }
                if let Some(ref msg) = *file_status.read() {
                    p { style: "color: #666; font-size: 14px; margin-top: 8px; text-align: center;",
                        "{msg}"
                    }
                }
            }
        }
    }
}

/// The symbology checklist, shown while the session is idle.
#[component]
fn FormatPanel(formats: FormatSet) -> Element {
    let svc = use_context::<AppServices>();
    let state = use_context::<Signal<AppState>>();

    let selected_count = formats.len();
    let catalog_size = BarcodeFormat::ALL.len();

    rsx! {
        div { style: "background: #f5f5f7; border-radius: 12px; padding: 16px; margin-bottom: 16px;",
            h3 { "Formats to scan for" }
            div { style: "display: grid; grid-template-columns: repeat(3, 1fr); gap: 8px; margin-top: 12px;",
                for format in BarcodeFormat::ALL {
                    {
                        let selected = formats.contains(format);
                        let label = if selected {
                            format!("\u{2713} {format}")
                        } else {
                            format.to_string()
                        };
                        let svc = svc.clone();
                        rsx! {
                            button {
                                key: "{format}",
                                style: if selected {
                                    "padding: 8px 10px; border-radius: 8px; border: none; background: #007aff; color: white; font-size: 13px;"
                                } else {
                                    "padding: 8px 10px; border-radius: 8px; border: 1px solid #ccc; background: white; color: #333; font-size: 13px;"
                                },
                                onclick: move |_| {
                                    let svc = svc.clone();
                                    spawn(async move {
                                        svc.toggle_format(format).await;
                                        sync_session(&svc, state).await;
                                    });
                                },
                                "{label}"
                            }
                        }
                    }
                }
            }
            p { style: "color: #888; font-size: 12px; margin-top: 12px;",
                "{selected_count} of {catalog_size} formats selected"
            }
        }
    }
}
