//! SAF file and image pickers.
//!
//! Selections come back as `content://` URIs whose grants may expire with the
//! picker session, so every selection is copied into the app cache before its
//! URI is handed to the page.
//!
//! Uses tauri-plugin-android-fs for the actual SAF operations.

#![cfg(target_os = "android")]

use std::io::Read;

use tauri::Manager;
use tauri_plugin_android_fs::{AndroidFsExt, FileAccessMode, FileUri};

use crate::platform::PickedFile;
use crate::utils;

/// Document picker for any file type.
pub async fn pick_file(app: &tauri::AppHandle) -> Result<Option<PickedFile>, String> {
    pick(app, &["*/*"], "attachment").await
}

/// Photo library picker.
pub async fn pick_image(app: &tauri::AppHandle) -> Result<Option<PickedFile>, String> {
    pick(app, &["image/*"], "image").await
}

async fn pick(
    app: &tauri::AppHandle,
    mime_types: &[&str],
    fallback_name: &str,
) -> Result<Option<PickedFile>, String> {
    let api = app.android_fs_async();
    let files = api
        .file_picker()
        .pick_files(
            None,       // Initial location
            mime_types, // MIME filter
            false,      // local_only
        )
        .await
        .map_err(|e| format!("File picker failed: {:?}", e))?;

    let Some(uri) = files.into_iter().next() else {
        return Ok(None);
    };

    let name = app
        .android_fs()
        .get_name(&uri)
        .map(|n| utils::sanitize_filename(&n))
        .ok()
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| fallback_name.to_string());

    let bytes = read_file_uri(app, &uri)?;
    let cache_dir = app
        .path()
        .app_cache_dir()
        .map_err(|e| e.to_string())?
        .join("imports");
    tokio::fs::create_dir_all(&cache_dir)
        .await
        .map_err(|e| format!("Failed to create cache dir: {}", e))?;
    let dest = cache_dir.join(&name);
    tokio::fs::write(&dest, &bytes)
        .await
        .map_err(|e| format!("Failed to copy into cache: {}", e))?;
    eprintln!("[SAF] Copied picked file into cache: {}", name);

    Ok(Some(PickedFile {
        uri: format!("file://{}", dest.to_string_lossy()),
        name,
    }))
}

/// Read the bytes behind a stored URI string (JSON-serialized FileUri or a
/// bare `content://` URI).
pub fn read_uri_bytes(app: &tauri::AppHandle, uri: &str) -> Result<Vec<u8>, String> {
    let file_uri = parse_uri(uri)?;
    read_file_uri(app, &file_uri)
}

fn read_file_uri(app: &tauri::AppHandle, uri: &FileUri) -> Result<Vec<u8>, String> {
    let api = app.android_fs();
    let mut file = api
        .open_file(uri, FileAccessMode::Read)
        .map_err(|e| format!("Failed to open file for reading: {:?}", e))?;

    let mut contents = Vec::new();
    file.read_to_end(&mut contents)
        .map_err(|e| format!("Failed to read file: {}", e))?;
    Ok(contents)
}

/// Parse a stored URI back into a FileUri. Accepts the JSON form
/// `{"uri":"content://...","documentTopTreeUri":null}` as well as a bare
/// `content://` URI.
fn parse_uri(uri_json: &str) -> Result<FileUri, String> {
    if uri_json.trim_start().starts_with('{') {
        FileUri::from_json_str(uri_json).map_err(|e| format!("Failed to parse FileUri JSON: {:?}", e))
    } else {
        let json = format!(r#"{{"uri":"{}","documentTopTreeUri":null}}"#, uri_json);
        FileUri::from_json_str(&json).map_err(|e| format!("Failed to create FileUri from URI: {:?}", e))
    }
}
