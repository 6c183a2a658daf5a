//! Share-sheet export via ACTION_SEND.
//!
//! Used as the fallback when writing into the Downloads collection fails:
//! the user picks where the file goes through the system share UI. Launching
//! the chooser counts as a successful export; there is no result channel.

#![cfg(target_os = "android")]

use std::path::Path;

use jni::objects::JValue;

use super::{file_provider_uri, with_activity};

/// FLAG_GRANT_READ_URI_PERMISSION
const GRANT_READ: i32 = 1;

pub fn share_file(app: &tauri::AppHandle, path: &Path, mime: &str) -> Result<(), String> {
    let _ = app;
    with_activity(|env, activity| {
        let uri = file_provider_uri(env, activity, path)?;

        let intent_class = env
            .find_class("android/content/Intent")
            .map_err(|e| format!("Failed to find Intent: {}", e))?;
        let action = env
            .new_string("android.intent.action.SEND")
            .map_err(|e| format!("Failed to create action string: {}", e))?;
        let intent = env
            .new_object(&intent_class, "(Ljava/lang/String;)V", &[(&action).into()])
            .map_err(|e| format!("Failed to construct Intent: {}", e))?;

        let jmime = env
            .new_string(mime)
            .map_err(|e| format!("Failed to create MIME string: {}", e))?;
        env.call_method(
            &intent,
            "setType",
            "(Ljava/lang/String;)Landroid/content/Intent;",
            &[(&jmime).into()],
        )
        .map_err(|e| format!("setType failed: {}", e))?;

        // Intent.EXTRA_STREAM
        let extra_key = env
            .new_string("android.intent.extra.STREAM")
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
            &[JValue::Int(GRANT_READ)],
        )
        .map_err(|e| format!("addFlags failed: {}", e))?;

        let title = env
            .new_string("Save report")
            .map_err(|e| format!("Failed to create chooser title: {}", e))?;
        let chooser = env
            .call_static_method(
                &intent_class,
                "createChooser",
                "(Landroid/content/Intent;Ljava/lang/CharSequence;)Landroid/content/Intent;",
                &[(&intent).into(), (&title).into()],
            )
            .and_then(|v| v.l())
            .map_err(|e| format!("createChooser failed: {}", e))?;

        env.call_method(
            activity,
            "startActivity",
            "(Landroid/content/Intent;)V",
            &[(&chooser).into()],
        )
        .map_err(|e| format!("startActivity failed: {}", e))?;

        eprintln!("[Share] Share sheet launched");
        Ok(())
    })
}
