//! Platform capability routing
//!
//! Every native capability the bridge or the download pipeline needs goes
//! through this module: file/image pickers, camera capture, persisting into
//! the user-visible Downloads location, the share/export fallback, raw URI
//! reads, and permission requests.
//!
//! Desktop implementations live here (dialog plugin + filesystem); Android
//! requests are routed to the `android` module (SAF, intents, runtime
//! permissions). Outcomes are uniform everywhere:
//! - `Ok(Some(..))` / `Ok(..)` means success
//! - `Ok(None)` means cancelled by the user
//! - `Err(..)` means denied or failed, with a message for the log

use std::path::Path;

use tauri::Manager;

use crate::types::PermissionCapability;
use crate::utils;

/// A file selected by a picker or produced by the camera, already copied
/// into the app cache so later reads cannot lose it.
#[derive(Clone, Debug)]
pub struct PickedFile {
    pub uri: String,
    pub name: String,
}

#[cfg(not(target_os = "android"))]
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "heic"];

/// Document picker for any file type; the selection is copied into the cache.
pub async fn pick_file(app: &tauri::AppHandle) -> Result<Option<PickedFile>, String> {
    #[cfg(target_os = "android")]
    {
        return crate::android::pickers::pick_file(app).await;
    }
    #[cfg(not(target_os = "android"))]
    {
        pick_with_dialog(app, "Attach File", None).await
    }
}

/// Photo library picker.
pub async fn pick_image(app: &tauri::AppHandle) -> Result<Option<PickedFile>, String> {
    #[cfg(target_os = "android")]
    {
        return crate::android::pickers::pick_image(app).await;
    }
    #[cfg(not(target_os = "android"))]
    {
        pick_with_dialog(app, "Choose Image", Some(("Images", IMAGE_EXTENSIONS))).await
    }
}

/// Camera capture. Desktop machines have no capture intent, so the photo
/// library picker stands in for the camera there.
pub async fn take_photo(app: &tauri::AppHandle) -> Result<Option<PickedFile>, String> {
    #[cfg(target_os = "android")]
    {
        return crate::android::camera::take_photo(app).await;
    }
    #[cfg(not(target_os = "android"))]
    {
        pick_with_dialog(app, "Choose Photo", Some(("Images", IMAGE_EXTENSIONS))).await
    }
}

/// Persist a fetched file into the user-visible Downloads location.
/// Returns a human-readable destination for the log.
pub async fn save_to_downloads(
    app: &tauri::AppHandle,
    cache_path: &Path,
    filename: &str,
) -> Result<String, String> {
    #[cfg(target_os = "android")]
    {
        return crate::android::downloads::save_to_downloads(app, cache_path, filename).await;
    }
    #[cfg(not(target_os = "android"))]
    {
        let _ = app;
        let downloads = dirs::download_dir()
            .ok_or_else(|| "No Downloads directory on this system".to_string())?;
        let dest = downloads.join(filename);
        tokio::fs::copy(cache_path, &dest)
            .await
            .map_err(|e| format!("Failed to copy into Downloads: {}", e))?;
        Ok(dest.to_string_lossy().to_string())
    }
}

/// Share/export fallback when Downloads persistence is unavailable: Android
/// opens the share sheet, desktop shows a save dialog so the user can place
/// the file through the OS picker.
pub async fn export_file(
    app: &tauri::AppHandle,
    cache_path: &Path,
    filename: &str,
    mime: &str,
) -> Result<(), String> {
    #[cfg(target_os = "android")]
    {
        let _ = filename;
        return crate::android::share::share_file(app, cache_path, mime);
    }
    #[cfg(not(target_os = "android"))]
    {
        use tauri_plugin_dialog::DialogExt;

        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("");
        let filter_name = match mime {
            "application/pdf" => "PDF files",
            "text/csv" => "CSV files",
            "application/zip" => "ZIP archives",
            _ => "All files",
        };
        let extensions: &[&str] = match extension {
            "" => &["*"],
            ext => &[ext],
        };

        let file_path = app
            .dialog()
            .file()
            .set_file_name(filename)
            .add_filter(filter_name, extensions)
            .blocking_save_file();

        match file_path {
            Some(path) => {
                let path_str = path.to_string();
                tokio::fs::copy(cache_path, &path_str)
                    .await
                    .map_err(|e| format!("Failed to write file: {}", e))?;
                Ok(())
            }
            None => Err("Save cancelled".to_string()),
        }
    }
}

/// Read the bytes behind a URI previously handed to the page. Handles
/// `file://` URIs and plain paths everywhere, `content://` URIs on Android.
pub async fn read_uri_bytes(app: &tauri::AppHandle, uri: &str) -> Result<Vec<u8>, String> {
    #[cfg(target_os = "android")]
    {
        if uri.starts_with("content://") || uri.trim_start().starts_with('{') {
            return crate::android::pickers::read_uri_bytes(app, uri);
        }
    }
    let _ = app;
    let path = uri.strip_prefix("file://").unwrap_or(uri);
    let path = urlencoding::decode(path)
        .map(|c| c.into_owned())
        .unwrap_or_else(|_| path.to_string());
    tokio::fs::read(&path)
        .await
        .map_err(|e| format!("Failed to read {}: {}", uri, e))
}

/// Request one device capability. Desktop platforms grant these implicitly;
/// Android walks the runtime-permission flow.
pub async fn request_permission(
    app: &tauri::AppHandle,
    capability: PermissionCapability,
) -> Result<bool, String> {
    #[cfg(target_os = "android")]
    {
        return crate::android::permissions::request(app, capability).await;
    }
    #[cfg(not(target_os = "android"))]
    {
        let _ = (app, capability);
        Ok(true)
    }
}

/// Desktop picker shared by file/image/photo flows: native dialog, then a
/// copy into the cache so the page-facing URI is always app-owned.
#[cfg(not(target_os = "android"))]
async fn pick_with_dialog(
    app: &tauri::AppHandle,
    title: &str,
    filter: Option<(&str, &[&str])>,
) -> Result<Option<PickedFile>, String> {
    use tauri_plugin_dialog::DialogExt;

    let mut dialog = app.dialog().file().set_title(title);
    if let Some((name, extensions)) = filter {
        dialog = dialog.add_filter(name, extensions);
    }

    let Some(source) = dialog.blocking_pick_file().and_then(|p| p.into_path().ok()) else {
        return Ok(None);
    };

    let name = source
        .file_name()
        .and_then(|n| n.to_str())
        .map(utils::sanitize_filename)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "attachment".to_string());

    let cache_dir = app
        .path()
        .app_cache_dir()
        .map_err(|e| e.to_string())?
        .join("imports");
    tokio::fs::create_dir_all(&cache_dir)
        .await
        .map_err(|e| format!("Failed to create cache dir: {}", e))?;
    let dest = cache_dir.join(&name);
    tokio::fs::copy(&source, &dest)
        .await
        .map_err(|e| format!("Failed to copy into cache: {}", e))?;

    Ok(Some(PickedFile {
        uri: format!("file://{}", dest.to_string_lossy()),
        name,
    }))
}
