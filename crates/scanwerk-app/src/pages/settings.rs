// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Settings page — persistent app configuration.

use dioxus::prelude::*;

use scanwerk_core::types::CameraFacing;

use crate::services::app_services::AppServices;
use crate::state::AppState;

#[component]
pub fn Settings() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let svc = use_context::<AppServices>();
    let mut save_msg = use_signal(|| Option::<String>::None);

    rsx! {
        div {
            h1 { "Settings" }

            section { style: "margin: 16px 0;",
                h3 { "Scanning" }
                // Sampling interval
                div { style: "display: flex; justify-content: space-between; align-items: center; padding: 12px 0; border-bottom: 1px solid #f0f0f0;",
                    span { "Scan interval (ms)" }
                    input {
                        r#type: "number",
                        style: "width: 80px; padding: 4px 8px; border: 1px solid #ccc; border-radius: 4px; text-align: right;",
                        value: "{state.read().config.scan_interval_ms}",
                        onchange: move |evt| {
                            if let Ok(ms) = evt.value().parse::<u64>()
                                && ms >= 50
                            {
                                state.write().config.scan_interval_ms = ms;
                            }
                        },
                    }
                }
                // Default camera
                div { style: "display: flex; justify-content: space-between; align-items: center; padding: 12px 0; border-bottom: 1px solid #f0f0f0;",
                    span { "Default camera" }
                    select {
                        style: "padding: 4px 8px; border: 1px solid #ccc; border-radius: 4px;",
                        value: facing_label(state.read().config.default_facing),
                        onchange: move |evt| {
                            if let Some(facing) = facing_from_label(&evt.value()) {
                                state.write().config.default_facing = facing;
                            }
                        },
                        option { value: "Back", "Back" }
                        option { value: "Front", "Front" }
                    }
                }
                SettingRow {
                    label: "Torch on at start",
                    checked: state.read().config.torch_on_start,
                    on_toggle: move |v: bool| { state.write().config.torch_on_start = v; },
                }
            }

            section { style: "margin: 16px 0;",
                h3 { "Camera" }
                // Resolution hints passed to the camera request
                div { style: "display: flex; justify-content: space-between; align-items: center; padding: 12px 0; border-bottom: 1px solid #f0f0f0;",
                    span { "Capture width hint" }
                    input {
                        r#type: "number",
                        style: "width: 80px; padding: 4px 8px; border: 1px solid #ccc; border-radius: 4px; text-align: right;",
                        value: "{state.read().config.width_hint}",
                        onchange: move |evt| {
                            if let Ok(width) = evt.value().parse::<u32>()
                                && width > 0
                            {
                                state.write().config.width_hint = width;
                            }
                        },
                    }
                }
                div { style: "display: flex; justify-content: space-between; align-items: center; padding: 12px 0; border-bottom: 1px solid #f0f0f0;",
                    span { "Capture height hint" }
                    input {
                        r#type: "number",
                        style: "width: 80px; padding: 4px 8px; border: 1px solid #ccc; border-radius: 4px; text-align: right;",
                        value: "{state.read().config.height_hint}",
                        onchange: move |evt| {
                            if let Ok(height) = evt.value().parse::<u32>()
                                && height > 0
                            {
                                state.write().config.height_hint = height;
                            }
                        },
                    }
                }
            }

            // Save button
            button {
                style: "width: 100%; padding: 12px; border-radius: 8px; border: none; background: #007aff; color: white; font-size: 16px; margin-top: 8px;",
                onclick: {
                    let svc = svc.clone();
                    move |_| {
                        let svc = svc.clone();
                        let config = state.read().config.clone();
                        spawn(async move {
                            match svc.save_config(&config).await {
                                Ok(()) => {
                                    tracing::info!("settings saved");
                                    save_msg.set(Some("Settings saved. They apply from the next scan.".into()));
                                }
                                Err(e) => {
                                    tracing::error!(error = %e, "failed to save settings");
                                    save_msg.set(Some(format!("Save failed: {e}")));
                                }
                            }
                        });
                    }
                },
                "Save Settings"
            }
            if let Some(ref msg) = *save_msg.read() {
                p { style: "color: #34c759; font-size: 14px; text-align: center; margin-top: 8px;",
                    "{msg}"
                }
            }

            section { style: "margin: 24px 0;",
                h3 { "About" }
                p { style: "color: #666; font-size: 14px;",
                    "Scanwerk v0.2.0"
                    br {}
                    "Camera barcode/QR scanner"
                    br {}
                    "PMPL-1.0-or-later"
                }
            }
        }
    }
}

#[component]
fn SettingRow(label: &'static str, checked: bool, on_toggle: EventHandler<bool>) -> Element {
    rsx! {
        div { style: "display: flex; justify-content: space-between; align-items: center; padding: 12px 0; border-bottom: 1px solid #f0f0f0;",
            span { "{label}" }
            input {
                r#type: "checkbox",
                checked: checked,
                onchange: move |evt| {
                    on_toggle.call(evt.checked());
                },
            }
        }
    }
}

fn facing_label(facing: CameraFacing) -> &'static str {
    match facing {
        CameraFacing::Back => "Back",
        CameraFacing::Front => "Front",
    }
}

fn facing_from_label(label: &str) -> Option<CameraFacing> {
    match label {
        "Back" => Some(CameraFacing::Back),
        "Front" => Some(CameraFacing::Front),
        _ => None,
    }
}
