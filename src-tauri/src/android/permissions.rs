//! Runtime permission flow via JNI.
//!
//! `requestPermissions` has no native-side result callback, so after firing
//! the prompt the grant state is polled until the user answers or the
//! deadline passes. An unanswered prompt counts as a denial for this session;
//! the next launch re-evaluates.

#![cfg(target_os = "android")]

use jni::objects::JValue;

use super::with_activity;
use crate::types::PermissionCapability;

const POLL_INTERVAL_MS: u64 = 500;
/// 30 seconds for the user to answer the system prompt.
const POLL_LIMIT: u32 = 60;

const PERMISSION_REQUEST_CODE: i32 = 4821;

pub async fn request(
    app: &tauri::AppHandle,
    capability: PermissionCapability,
) -> Result<bool, String> {
    let _ = app;
    let permission = android_permission(capability);

    if check(permission)? {
        return Ok(true);
    }

    request_permissions(permission)?;
    for _ in 0..POLL_LIMIT {
        tokio::time::sleep(std::time::Duration::from_millis(POLL_INTERVAL_MS)).await;
        if check(permission)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn android_permission(capability: PermissionCapability) -> &'static str {
    match capability {
        PermissionCapability::Storage => "android.permission.WRITE_EXTERNAL_STORAGE",
        PermissionCapability::Camera => "android.permission.CAMERA",
        PermissionCapability::MediaLibrary => "android.permission.READ_MEDIA_IMAGES",
    }
}

fn check(permission: &str) -> Result<bool, String> {
    with_activity(|env, activity| {
        let jperm = env
            .new_string(permission)
            .map_err(|e| format!("Failed to create permission string: {}", e))?;
        let granted = env
            .call_method(
                activity,
                "checkSelfPermission",
                "(Ljava/lang/String;)I",
                &[(&jperm).into()],
            )
            .and_then(|v| v.i())
            .map_err(|e| format!("checkSelfPermission failed: {}", e))?;
        // PackageManager.PERMISSION_GRANTED == 0
        Ok(granted == 0)
    })
}

fn request_permissions(permission: &str) -> Result<(), String> {
    with_activity(|env, activity| {
        let jperm = env
            .new_string(permission)
            .map_err(|e| format!("Failed to create permission string: {}", e))?;
        let array = env
            .new_object_array(1, "java/lang/String", &jperm)
            .map_err(|e| format!("Failed to create permission array: {}", e))?;
        env.call_method(
            activity,
            "requestPermissions",
            "([Ljava/lang/String;I)V",
            &[JValue::Object(&array), JValue::Int(PERMISSION_REQUEST_CODE)],
        )
        .map_err(|e| format!("requestPermissions failed: {}", e))?;
        Ok(())
    })
}
