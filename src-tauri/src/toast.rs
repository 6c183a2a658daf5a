//! Transient toast notifications
//!
//! The shell renders toasts as a DOM overlay inside the embedded page (see
//! `init_script`). Native code owns the authoritative state: a single current
//! toast, last-write-wins. Every `show` bumps a sequence number and the
//! scheduled expiry only clears the state if its sequence is still current,
//! so a stale timer can never blank a newer toast early.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tauri::WebviewWindow;

use crate::types::{ToastSeverity, ToastState};

/// How long a toast stays visible.
pub const TOAST_DURATION_MS: u64 = 3000;

struct ActiveToast {
    message: String,
    severity: ToastSeverity,
    seq: u64,
}

#[derive(Default)]
pub struct ToastManager {
    current: Mutex<Option<ActiveToast>>,
    seq: AtomicU64,
}

impl ToastManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current toast and render it. Returns the sequence number
    /// the caller must pass to `expire` when the duration elapses.
    pub fn show(
        &self,
        window: Option<&WebviewWindow>,
        message: &str,
        severity: ToastSeverity,
        duration_ms: u64,
    ) -> u64 {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        *self.current.lock().unwrap() = Some(ActiveToast {
            message: message.to_string(),
            severity,
            seq,
        });
        if let Some(window) = window {
            let _ = window.eval(&toast_script(message, severity, duration_ms));
        }
        seq
    }

    /// Clear the toast scheduled under `seq`. A no-op (returns false) when a
    /// newer toast has replaced it in the meantime.
    pub fn expire(&self, seq: u64) -> bool {
        let mut current = self.current.lock().unwrap();
        match current.as_ref() {
            Some(active) if active.seq == seq => {
                *current = None;
                true
            }
            _ => false,
        }
    }

    pub fn current(&self) -> ToastState {
        match self.current.lock().unwrap().as_ref() {
            Some(active) => ToastState {
                visible: true,
                message: active.message.clone(),
                severity: active.severity,
            },
            None => ToastState {
                visible: false,
                message: String::new(),
                severity: ToastSeverity::Info,
            },
        }
    }
}

/// Show a toast and schedule its expiry on the async runtime.
pub fn notify(
    manager: &Arc<ToastManager>,
    window: Option<&WebviewWindow>,
    message: &str,
    severity: ToastSeverity,
) {
    notify_for(manager, window, message, severity, TOAST_DURATION_MS);
}

pub fn notify_for(
    manager: &Arc<ToastManager>,
    window: Option<&WebviewWindow>,
    message: &str,
    severity: ToastSeverity,
    duration_ms: u64,
) {
    eprintln!("[Toast] {}: {}", severity.as_str(), message);
    let seq = manager.show(window, message, severity, duration_ms);
    let manager = manager.clone();
    tauri::async_runtime::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(duration_ms)).await;
        manager.expire(seq);
    });
}

/// Build the overlay call evaluated in the page. The message goes through
/// serde_json so quotes, newlines and unicode cannot break out of the script.
fn toast_script(message: &str, severity: ToastSeverity, duration_ms: u64) -> String {
    let message_json = serde_json::to_string(message).unwrap_or_else(|_| "\"\"".to_string());
    format!(
        "window.__csmsToast && window.__csmsToast({}, \"{}\", {});",
        message_json,
        severity.as_str(),
        duration_ms
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_replaces_current_toast() {
        let manager = ToastManager::new();
        manager.show(None, "Downloading…", ToastSeverity::Info, 3000);
        let seq2 = manager.show(None, "Report saved!", ToastSeverity::Success, 3000);

        let state = manager.current();
        assert!(state.visible);
        assert_eq!(state.message, "Report saved!");
        assert_eq!(state.severity, ToastSeverity::Success);

        assert!(manager.expire(seq2));
        assert!(!manager.current().visible);
    }

    #[test]
    fn test_stale_timer_cannot_blank_newer_toast() {
        let manager = ToastManager::new();
        let seq1 = manager.show(None, "first", ToastSeverity::Info, 3000);
        manager.show(None, "second", ToastSeverity::Error, 3000);

        // The first toast's timer fires after it was superseded
        assert!(!manager.expire(seq1));
        let state = manager.current();
        assert!(state.visible);
        assert_eq!(state.message, "second");
    }

    #[test]
    fn test_expire_is_idempotent() {
        let manager = ToastManager::new();
        let seq = manager.show(None, "once", ToastSeverity::Info, 3000);
        assert!(manager.expire(seq));
        assert!(!manager.expire(seq));
        assert!(!manager.current().visible);
    }

    #[test]
    fn test_toast_script_escapes_message() {
        let script = toast_script("a \"quoted\"\nmessage", ToastSeverity::Error, 3000);
        assert!(script.contains(r#"\"quoted\""#));
        assert!(script.contains(r#"\n"#));
        assert!(script.contains("\"error\""));
        assert!(!script.contains('\n'));
    }
}
