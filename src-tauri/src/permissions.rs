//! Device permission handling
//!
//! Two concerns live here:
//! - the startup permission gate: storage, camera, and media library are
//!   requested once per process, each independently, with the storage
//!   outcome surfaced as a toast
//! - auto-granting webview permission prompts on desktop (Linux/WebKitGTK),
//!   so in-page media requests don't dead-end in a prompt the shell never
//!   shows

use std::sync::atomic::{AtomicBool, Ordering};

use tauri::plugin::{Builder as PluginBuilder, TauriPlugin};
use tauri::{Manager, Wry};

use crate::toast;
use crate::types::{PermissionCapability, PermissionOutcome, ToastSeverity};
use crate::{platform, AppState};

static GATE_RAN: AtomicBool = AtomicBool::new(false);

/// Request all device capabilities, once per process lifetime. A repeat call
/// is logged and skipped. Platform errors are caught per-capability and
/// counted as denials; nothing here can take down the shell.
pub async fn run_startup_gate(app: tauri::AppHandle) -> Vec<PermissionOutcome> {
    if GATE_RAN.swap(true, Ordering::SeqCst) {
        eprintln!("[Permissions] Startup gate already ran, skipping");
        return Vec::new();
    }

    let window = app.get_webview_window(crate::MAIN_WINDOW);
    let state = app.state::<AppState>();
    let toasts = state.toasts.clone();

    let mut outcomes = Vec::new();
    for capability in [
        PermissionCapability::Storage,
        PermissionCapability::Camera,
        PermissionCapability::MediaLibrary,
    ] {
        let granted = match platform::request_permission(&app, capability).await {
            Ok(granted) => granted,
            Err(e) => {
                eprintln!("[Permissions] {:?} request failed: {}", capability, e);
                false
            }
        };
        eprintln!("[Permissions] {:?}: granted={}", capability, granted);
        outcomes.push(PermissionOutcome { capability, granted });

        if capability == PermissionCapability::Storage {
            if granted {
                toast::notify(&toasts, window.as_ref(), "Storage access granted", ToastSeverity::Success);
            } else {
                toast::notify(
                    &toasts,
                    window.as_ref(),
                    "Storage permission denied",
                    ToastSeverity::Error,
                );
            }
        }
    }
    outcomes
}

/// Auto-grant webview permission prompts (camera, microphone) on desktop.
pub fn init_plugin() -> TauriPlugin<Wry> {
    PluginBuilder::<Wry, ()>::new("webview-permissions")
        .on_webview_ready(|webview| {
            let app_handle = webview.app_handle();
            let label = webview.label();

            if let Some(window) = app_handle.get_webview_window(label) {
                setup_permission_handlers(&window);
            }
        })
        .build()
}

fn setup_permission_handlers(window: &tauri::WebviewWindow) {
    #[cfg(target_os = "linux")]
    setup_linux(window);

    // Other platforms: the OS/webview handles prompts itself
    #[cfg(not(target_os = "linux"))]
    let _ = window;
}

#[cfg(target_os = "linux")]
fn setup_linux(window: &tauri::WebviewWindow) {
    use webkit2gtk::{PermissionRequestExt, WebViewExt};

    let label = window.label().to_string();
    let _ = window.with_webview(move |webview| {
        let wk_webview = webview.inner();
        wk_webview.connect_permission_request(move |_view, request| {
            eprintln!("[Permissions] Auto-granting webview permission request for '{}'", label);
            request.allow();
            true // handled
        });
    });
}
