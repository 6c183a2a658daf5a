//! JavaScript initialization script for the embedded CSMS page
//!
//! This module contains the JavaScript injected into the webview at
//! document-start to provide the native shell surface:
//! - overlay.js: toast + busy overlay DOM and the loading/error panel
//! - bridge.js: forwards the page's `message` events to the native router
//! - back_guard.js: history sentinel that traps the Android back gesture
//!
//! Each chunk is wrapped in try-catch so one failing script can't prevent
//! subsequent scripts from executing; failures are reported to native stderr
//! through the `js_log` command.

/// Error reporter: logs to Rust stderr via js_log when available
const INIT_ERR_REPORTER: &str = "window.__csmsInitErr=function(n,e){var m='[CSMS init] '+n+' error: '+(e&&e.message||e);if(window.__TAURI__&&window.__TAURI__.core&&window.__TAURI__.core.invoke){window.__TAURI__.core.invoke('js_log',{message:m}).catch(function(){})}console.error(m)};\n";

/// Toast + busy overlay and the loading/error panel. Runs at document-start,
/// so everything attaches to document.documentElement (body may not exist yet).
const OVERLAY_JS: &str = r#"
(function () {
  if (window.__csmsToast) { return; }

  var style = document.createElement('style');
  style.textContent =
    '#__csms-toast{position:fixed;left:50%;bottom:48px;transform:translateX(-50%);' +
    'max-width:85vw;padding:10px 18px;border-radius:20px;color:#fff;font:14px sans-serif;' +
    'z-index:2147483646;opacity:0;transition:opacity .2s ease;pointer-events:none;' +
    'box-shadow:0 2px 8px rgba(0,0,0,.35)}' +
    '#__csms-toast.info{background:#333}' +
    '#__csms-toast.success{background:#2e7d32}' +
    '#__csms-toast.error{background:#c62828}' +
    '#__csms-busy{position:fixed;inset:0;background:rgba(0,0,0,.35);z-index:2147483645;' +
    'display:none;align-items:center;justify-content:center}' +
    '#__csms-busy .spinner{width:42px;height:42px;border:4px solid rgba(255,255,255,.4);' +
    'border-top-color:#fff;border-radius:50%;animation:__csms-spin .8s linear infinite}' +
    '@keyframes __csms-spin{to{transform:rotate(360deg)}}' +
    '#__csms-loading{position:fixed;inset:0;background:#fff;z-index:2147483647;' +
    'display:flex;flex-direction:column;align-items:center;justify-content:center;' +
    'font:15px sans-serif;color:#444}' +
    '#__csms-loading button{margin-top:16px;padding:8px 24px;border:1px solid #c62828;' +
    'border-radius:4px;background:#fff;color:#c62828;font-size:14px}';
  document.documentElement.appendChild(style);

  var toastEl = null;
  var toastTimer = null;
  window.__csmsToast = function (message, severity, duration) {
    if (!toastEl) {
      toastEl = document.createElement('div');
      toastEl.id = '__csms-toast';
      document.documentElement.appendChild(toastEl);
    }
    if (toastTimer) { clearTimeout(toastTimer); toastTimer = null; }
    toastEl.textContent = message;
    toastEl.className = severity || 'info';
    toastEl.style.opacity = '1';
    toastTimer = setTimeout(function () {
      toastEl.style.opacity = '0';
      toastTimer = null;
    }, duration || 3000);
  };

  var busyEl = null;
  window.__csmsBusy = function (on) {
    if (!busyEl) {
      busyEl = document.createElement('div');
      busyEl.id = '__csms-busy';
      busyEl.innerHTML = '<div class="spinner"></div>';
      document.documentElement.appendChild(busyEl);
    }
    busyEl.style.display = on ? 'flex' : 'none';
  };

  // Loading overlay: visible until the page is interactive, flips to an
  // error panel with a retry button if nothing loads within the deadline.
  var loading = document.createElement('div');
  loading.id = '__csms-loading';
  loading.innerHTML = '<div class="spinner-text">Loading CSMS…</div>';
  document.documentElement.appendChild(loading);

  var cleared = false;
  function clearLoading() {
    if (cleared) { return; }
    cleared = true;
    if (loading.parentNode) { loading.parentNode.removeChild(loading); }
  }
  document.addEventListener('DOMContentLoaded', clearLoading);
  window.addEventListener('load', clearLoading);
  setTimeout(function () {
    if (cleared) { return; }
    loading.innerHTML =
      '<div>Could not reach the CSMS server.</div>' +
      '<button type="button">Retry</button>';
    loading.querySelector('button').addEventListener('click', function () {
      location.reload();
    });
  }, 20000);
})();
"#;

/// Bridge channel: every message the page posts on its own window is
/// forwarded to the native router, which decodes-or-ignores it. Responses
/// come back through window.postMessage and are ignored by the router in
/// turn, so the loop terminates.
const BRIDGE_CHANNEL_JS: &str = r#"
(function () {
  if (window.__CSMS_SHELL__) { return; }
  var invoke = window.__TAURI__ && window.__TAURI__.core && window.__TAURI__.core.invoke;
  if (!invoke) { return; }
  window.__CSMS_SHELL__ = { platform: 'tauri' };
  window.addEventListener('message', function (event) {
    var data = event.data;
    if (data == null) { return; }
    if (typeof data !== 'string') {
      try { data = JSON.stringify(data); } catch (_e) { return; }
    }
    invoke('handle_bridge_message', { payload: data }).catch(function () {});
  });
})();
"#;

/// Android back gesture trap: a sentinel history entry absorbs every back
/// press (the page's own history is never popped) and each press is reported
/// to the native exit-confirmation guard.
#[cfg(target_os = "android")]
const BACK_GUARD_JS: &str = r#"
(function () {
  var invoke = window.__TAURI__ && window.__TAURI__.core && window.__TAURI__.core.invoke;
  if (!invoke) { return; }
  history.pushState({ __csmsBackGuard: true }, '');
  window.addEventListener('popstate', function () {
    history.pushState({ __csmsBackGuard: true }, '');
    invoke('handle_back_press', {}).catch(function () {});
  });
})();
"#;

/// Full initialization script for the shell window.
/// Uses serde_json for safe string escaping of the injected globals.
pub fn get_shell_init_script(app_url: &str) -> String {
    let app_url_json = serde_json::to_string(app_url).unwrap_or_else(|_| "\"\"".to_string());

    let mut script = format!("window.__CSMS_APP_URL__ = {};\n", app_url_json);
    script.push_str(INIT_ERR_REPORTER);
    push_guarded(&mut script, "overlay.js", OVERLAY_JS);
    push_guarded(&mut script, "bridge.js", BRIDGE_CHANNEL_JS);
    #[cfg(target_os = "android")]
    push_guarded(&mut script, "back_guard.js", BACK_GUARD_JS);
    script
}

fn push_guarded(script: &mut String, name: &str, chunk: &str) {
    script.push_str("try{\n");
    script.push_str(chunk);
    script.push_str(&format!("\n}}catch(_e){{window.__csmsInitErr('{}',_e)}}\n", name));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_escapes_app_url() {
        let script = get_shell_init_script("https://csms-app.vercel.app/\"quote");
        assert!(script.contains(r#"window.__CSMS_APP_URL__ = "https://csms-app.vercel.app/\"quote";"#));
    }

    #[test]
    fn test_script_contains_shell_pieces() {
        let script = get_shell_init_script("https://csms-app.vercel.app");
        assert!(script.contains("__csmsToast"));
        assert!(script.contains("__csmsBusy"));
        assert!(script.contains("handle_bridge_message"));
        assert!(script.contains("__csmsInitErr"));
    }
}
