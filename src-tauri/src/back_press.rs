//! Double-press-to-exit confirmation for the hardware back gesture
//!
//! Android only: the injected script traps the back gesture behind a history
//! sentinel and forwards each press to `handle_back_press`. The first press
//! arms the guard and shows a toast; a second press inside the window exits
//! the process. The arming sequence number doubles as the timer token: a
//! disarm scheduled for an older arming is simply ignored, so the timer never
//! needs to race a press.
//!
//! Desktop builds construct no guard and inject no back handler; the
//! component is absent there, not a no-op.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// How long the second press may take before the guard disarms.
pub const BACK_PRESS_WINDOW_MS: u64 = 2000;

/// Outcome of one back press.
#[derive(Debug, PartialEq, Eq)]
pub enum BackAction {
    /// First press: armed under this sequence, schedule a disarm
    Armed(u64),
    /// Second press inside the window: exit the process
    Exit,
}

#[derive(Default)]
pub struct BackPressGuard {
    armed: Mutex<Option<u64>>,
    seq: AtomicU64,
}

impl BackPressGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&self) -> BackAction {
        let mut armed = self.armed.lock().unwrap();
        if armed.is_some() {
            *armed = None;
            return BackAction::Exit;
        }
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        *armed = Some(seq);
        BackAction::Armed(seq)
    }

    /// Disarm the guard if it is still armed under `seq`.
    pub fn disarm(&self, seq: u64) -> bool {
        let mut armed = self.armed.lock().unwrap();
        if *armed == Some(seq) {
            *armed = None;
            true
        } else {
            false
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.lock().unwrap().is_some()
    }
}

#[cfg(target_os = "android")]
#[tauri::command]
pub async fn handle_back_press(
    app: tauri::AppHandle,
    window: tauri::WebviewWindow,
) -> Result<(), String> {
    use tauri::Manager;

    let state = app.state::<crate::AppState>();
    match state.back_guard.press() {
        BackAction::Exit => {
            eprintln!("[BackPress] Confirmed, exiting");
            app.exit(0);
        }
        BackAction::Armed(seq) => {
            crate::toast::notify(
                &state.toasts,
                Some(&window),
                "Press back again to exit",
                crate::types::ToastSeverity::Info,
            );
            let guard = state.back_guard.clone();
            tauri::async_runtime::spawn(async move {
                tokio::time::sleep(std::time::Duration::from_millis(BACK_PRESS_WINDOW_MS)).await;
                if guard.disarm(seq) {
                    eprintln!("[BackPress] Window elapsed, disarmed");
                }
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_press_exits() {
        let guard = BackPressGuard::new();
        assert!(matches!(guard.press(), BackAction::Armed(_)));
        assert!(guard.is_armed());
        assert_eq!(guard.press(), BackAction::Exit);
        assert!(!guard.is_armed());
    }

    #[test]
    fn test_timeout_disarms_and_next_press_rearms() {
        let guard = BackPressGuard::new();
        let BackAction::Armed(seq) = guard.press() else {
            panic!("first press should arm");
        };
        // Timer fires with no second press
        assert!(guard.disarm(seq));
        assert!(!guard.is_armed());

        // The next press starts a fresh cycle instead of exiting
        assert!(matches!(guard.press(), BackAction::Armed(_)));
    }

    #[test]
    fn test_stale_timer_cannot_disarm_a_new_arming() {
        let guard = BackPressGuard::new();
        let BackAction::Armed(first) = guard.press() else {
            panic!("first press should arm");
        };
        // Second press exits (conceptually the process ends here, but the
        // old timer may still be pending in a test double-cycle)
        assert_eq!(guard.press(), BackAction::Exit);

        let BackAction::Armed(second) = guard.press() else {
            panic!("re-arm should work after exit action");
        };
        // The first cycle's timer must not disarm the new cycle
        assert!(!guard.disarm(first));
        assert!(guard.is_armed());
        assert!(guard.disarm(second));
    }
}
