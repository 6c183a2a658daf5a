//! Report download pipeline
//!
//! One intercepted navigation becomes one `DownloadJob`: fetch the resource
//! into the app cache, persist it into the user-visible Downloads location,
//! fall back to the share/export flow when persistence is unavailable, and
//! report the outcome through toasts.
//!
//! The busy overlay is backed by a single process-wide flag held through an
//! RAII guard, so every exit path (success, fallback, failure, panic during
//! an await) releases it. A second download while one is in flight is
//! rejected with an error toast rather than silently dropping the first
//! job's overlay.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tauri::{Manager, WebviewWindow};

use crate::toast;
use crate::types::{DownloadJob, DownloadStatus, ToastSeverity};
use crate::utils;
use crate::{platform, AppState};

/// RAII ownership of the busy overlay. Acquire fails while another download
/// holds it; dropping clears the flag and hides the overlay unconditionally.
pub struct BusyGuard {
    flag: Arc<AtomicBool>,
    window: Option<WebviewWindow>,
}

impl BusyGuard {
    pub fn acquire(flag: &Arc<AtomicBool>, window: Option<&WebviewWindow>) -> Option<Self> {
        if flag
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return None;
        }
        if let Some(window) = window {
            let _ = window.eval("window.__csmsBusy && window.__csmsBusy(true);");
        }
        Some(Self {
            flag: flag.clone(),
            window: window.cloned(),
        })
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
        if let Some(window) = &self.window {
            let _ = window.eval("window.__csmsBusy && window.__csmsBusy(false);");
        }
    }
}

/// Run the whole pipeline for one URL. Never returns an error: every outcome
/// ends in a terminal toast and a released busy flag.
pub async fn download(app: tauri::AppHandle, url: String) {
    let window = app.get_webview_window(crate::MAIN_WINDOW);
    let state = app.state::<AppState>();
    let toasts = state.toasts.clone();

    let Some(_busy) = BusyGuard::acquire(&state.download_active, window.as_ref()) else {
        toast::notify(
            &toasts,
            window.as_ref(),
            "A download is already in progress",
            ToastSeverity::Error,
        );
        return;
    };

    toast::notify(&toasts, window.as_ref(), "Downloading…", ToastSeverity::Info);
    eprintln!("[Download] Starting: {}", url);

    let mut job = DownloadJob::new(url);
    match run_pipeline(&app, &mut job).await {
        Ok(destination) => {
            job.set_status(DownloadStatus::Done);
            eprintln!("[Download] Saved {} -> {}", job.filename, destination);
            toast::notify(&toasts, window.as_ref(), "Report saved!", ToastSeverity::Success);
        }
        Err(reason) => {
            job.set_status(DownloadStatus::Failed);
            // Don't leave half-fetched files behind in the cache
            if let Some(path) = &job.local_cache_path {
                let _ = tokio::fs::remove_file(path).await;
            }
            eprintln!("[Download] Failed: {}", reason);
            toast::notify(&toasts, window.as_ref(), &reason, ToastSeverity::Error);
        }
    }
    // _busy drops here on every path, clearing the overlay
}

/// Fetch + persist. Returns a short destination description for the log, or
/// the user-facing failure reason.
async fn run_pipeline(app: &tauri::AppHandle, job: &mut DownloadJob) -> Result<String, String> {
    let state = app.state::<AppState>();

    job.set_status(DownloadStatus::Fetching);
    let response = state
        .http
        .get(&job.source_url)
        .send()
        .await
        .map_err(|e| format!("Network error: {}", e))?;

    let status = response.status();
    if !status.is_success() {
        return Err(format!("Download failed (HTTP {})", status.as_u16()));
    }

    let disposition = response
        .headers()
        .get(reqwest::header::CONTENT_DISPOSITION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string());
    job.filename = resolve_filename(&job.source_url, disposition.as_deref());

    let bytes = response
        .bytes()
        .await
        .map_err(|e| format!("Network error: {}", e))?;

    let cache_dir = app.path().app_cache_dir().map_err(|e| e.to_string())?;
    tokio::fs::create_dir_all(&cache_dir)
        .await
        .map_err(|e| format!("Failed to create cache dir: {}", e))?;
    let cache_path = cache_dir.join(&job.filename);
    tokio::fs::write(&cache_path, &bytes)
        .await
        .map_err(|e| format!("Failed to cache download: {}", e))?;
    job.local_cache_path = Some(cache_path.clone());

    job.set_status(DownloadStatus::Persisting);
    match platform::save_to_downloads(app, &cache_path, &job.filename).await {
        Ok(destination) => Ok(destination),
        Err(e) => {
            // Downloads persistence unavailable or denied: hand the file to
            // the OS-level share/export flow instead.
            eprintln!("[Download] Persistence failed ({}), falling back to export", e);
            let mime = utils::get_mime_type(Path::new(&job.filename));
            platform::export_file(app, &cache_path, &job.filename, mime)
                .await
                .map(|_| "export".to_string())
                .map_err(|e| format!("Could not save report: {}", e))
        }
    }
}

/// Filename preference order: Content-Disposition from the backend, then a
/// document name embedded in the URL path, then a dated fallback.
pub fn resolve_filename(url: &str, content_disposition: Option<&str>) -> String {
    if let Some(header) = content_disposition {
        if let Some(name) = utils::filename_from_content_disposition(header) {
            return name;
        }
    }
    if let Ok(parsed) = tauri::Url::parse(url) {
        if let Some(name) = utils::filename_from_url_path(parsed.path()) {
            return name;
        }
    }
    utils::dated_report_filename()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_filename_prefers_content_disposition() {
        let name = resolve_filename(
            "https://csms-backend.onrender.com/projects/42/report?mode=download",
            Some("attachment; filename=Well_A_Report.pdf"),
        );
        assert_eq!(name, "Well_A_Report.pdf");
    }

    #[test]
    fn test_resolve_filename_falls_back_to_url_path() {
        let name = resolve_filename("https://files.example.com/docs/summary.xlsx", None);
        assert_eq!(name, "summary.xlsx");

        // A useless header falls through to the URL
        let name = resolve_filename(
            "https://files.example.com/docs/summary.xlsx",
            Some("attachment"),
        );
        assert_eq!(name, "summary.xlsx");
    }

    #[test]
    fn test_resolve_filename_synthesizes_dated_name() {
        let name = resolve_filename("https://csms-backend.onrender.com/projects/42/report", None);
        assert!(name.starts_with("CSMS_Report_"));
        assert!(name.ends_with(".pdf"));

        // Unparseable URL also falls back rather than failing
        let name = resolve_filename("not a url", None);
        assert!(name.ends_with(".pdf"));
    }

    #[test]
    fn test_busy_guard_rejects_second_acquire_and_clears_on_drop() {
        let flag = Arc::new(AtomicBool::new(false));

        let first = BusyGuard::acquire(&flag, None).expect("first acquire succeeds");
        assert!(flag.load(Ordering::SeqCst));
        assert!(BusyGuard::acquire(&flag, None).is_none());

        drop(first);
        assert!(!flag.load(Ordering::SeqCst));

        // Idempotent clearing: a fresh guard on a cleared flag works again
        let second = BusyGuard::acquire(&flag, None).expect("flag was released");
        drop(second);
        assert!(!flag.load(Ordering::SeqCst));
    }
}
