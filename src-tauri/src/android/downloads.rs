//! Persisting fetched reports into the public Downloads collection.

#![cfg(target_os = "android")]

use std::io::Write;
use std::path::Path;

use tauri_plugin_android_fs::{AndroidFsExt, FileAccessMode, PublicGeneralPurposeDir};

use crate::utils;

/// Create the file in Downloads and stream the cached bytes into it.
/// Errors here trigger the share-sheet fallback in the pipeline.
pub async fn save_to_downloads(
    app: &tauri::AppHandle,
    cache_path: &Path,
    filename: &str,
) -> Result<String, String> {
    let bytes = tokio::fs::read(cache_path)
        .await
        .map_err(|e| format!("Failed to read cached download: {}", e))?;
    let mime = utils::get_mime_type(Path::new(filename));

    let api = app.android_fs();
    let uri = api
        .public_storage()
        .create_new_file(PublicGeneralPurposeDir::Download, filename, Some(mime))
        .map_err(|e| format!("Failed to create file in Downloads: {:?}", e))?;

    let mut file = api
        .open_file(&uri, FileAccessMode::WriteTruncate)
        .map_err(|e| format!("Failed to open Downloads file: {:?}", e))?;
    file.write_all(&bytes)
        .map_err(|e| format!("Failed to write Downloads file: {}", e))?;

    eprintln!("[SAF] Wrote {} bytes into Downloads/{}", bytes.len(), filename);
    Ok(format!("Downloads/{}", filename))
}
