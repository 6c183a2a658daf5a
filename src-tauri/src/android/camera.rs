//! Camera capture via the system ACTION_IMAGE_CAPTURE intent.
//!
//! The capture activity writes directly into a cache file exposed through
//! the app's FileProvider. There is no activity-result channel back into the
//! native thread, so completion is detected by watching the output file:
//! a non-empty file means the user confirmed the shot, nothing arriving
//! within the deadline means they backed out.

#![cfg(target_os = "android")]

use std::path::Path;

use jni::objects::JValue;
use tauri::Manager;

use super::{file_provider_uri, with_activity};
use crate::platform::PickedFile;

const CAPTURE_POLL_MS: u64 = 500;
/// 2 minutes for the user to frame and confirm the photo.
const CAPTURE_WAIT_POLLS: u32 = 240;

/// FLAG_GRANT_READ_URI_PERMISSION | FLAG_GRANT_WRITE_URI_PERMISSION
const GRANT_READ_WRITE: i32 = 3;

pub async fn take_photo(app: &tauri::AppHandle) -> Result<Option<PickedFile>, String> {
    let cache_dir = app
        .path()
        .app_cache_dir()
        .map_err(|e| e.to_string())?
        .join("captures");
    tokio::fs::create_dir_all(&cache_dir)
        .await
        .map_err(|e| format!("Failed to create capture dir: {}", e))?;

    let name = format!("photo_{}.jpg", chrono::Local::now().format("%Y%m%d_%H%M%S"));
    let output = cache_dir.join(&name);

    launch_capture_intent(&output)?;

    for _ in 0..CAPTURE_WAIT_POLLS {
        tokio::time::sleep(std::time::Duration::from_millis(CAPTURE_POLL_MS)).await;
        if let Ok(meta) = tokio::fs::metadata(&output).await {
            if meta.len() > 0 {
                // One extra tick so a capture mid-write is never handed out
                tokio::time::sleep(std::time::Duration::from_millis(CAPTURE_POLL_MS)).await;
                eprintln!("[Camera] Capture complete: {}", name);
                return Ok(Some(PickedFile {
                    uri: format!("file://{}", output.to_string_lossy()),
                    name,
                }));
            }
        }
    }

    eprintln!("[Camera] No capture arrived, treating as cancelled");
    Ok(None)
}

fn launch_capture_intent(output: &Path) -> Result<(), String> {
    with_activity(|env, activity| {
        let uri = file_provider_uri(env, activity, output)?;

        let intent_class = env
            .find_class("android/content/Intent")
            .map_err(|e| format!("Failed to find Intent: {}", e))?;
        let action = env
            .new_string("android.media.action.IMAGE_CAPTURE")
            .map_err(|e| format!("Failed to create action string: {}", e))?;
        let intent = env
            .new_object(&intent_class, "(Ljava/lang/String;)V", &[(&action).into()])
            .map_err(|e| format!("Failed to construct Intent: {}", e))?;

        // MediaStore.EXTRA_OUTPUT
        let extra_key = env
            .new_string("output")
            .map_err(|e| format!("Failed to create extra key: {}", e))?;
        env.call_method(
            &intent,
            "putExtra",
            "(Ljava/lang/String;Landroid/os/Parcelable;)Landroid/content/Intent;",
            &[(&extra_key).into(), (&uri).into()],
        )
        .map_err(|e| format!("putExtra failed: {}", e))?;
        env.call_method(
            &intent,
            "addFlags",
            "(I)Landroid/content/Intent;",
            &[JValue::Int(GRANT_READ_WRITE)],
        )
        .map_err(|e| format!("addFlags failed: {}", e))?;

        env.call_method(
            activity,
            "startActivity",
            "(Landroid/content/Intent;)V",
            &[(&intent).into()],
        )
        .map_err(|e| format!("startActivity failed: {}", e))?;

        eprintln!("[Camera] Capture intent launched");
        Ok(())
    })
}
