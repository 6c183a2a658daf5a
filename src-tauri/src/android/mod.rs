//! Android-specific implementations for the CSMS shell.
//!
//! This module is only compiled on Android builds (`target_os = "android"`).
//! It provides:
//!
//! - **SAF pickers** - File/image selection via the Storage Access Framework
//! - **Camera capture** - ACTION_IMAGE_CAPTURE intent with a FileProvider URI
//! - **Downloads persistence** - Writing reports into the public Downloads
//!   collection
//! - **Share sheet** - ACTION_SEND export fallback
//! - **Runtime permissions** - checkSelfPermission / requestPermissions via JNI
//!
//! JNI access goes through the activity stored in `ndk_context` by the Tauri
//! runtime. Framework classes resolve through the system classloader; app-dex
//! classes (androidx.core FileProvider) need the activity's classloader.

#![cfg(target_os = "android")]

use std::path::Path;

use jni::objects::{JClass, JObject};
use jni::{JNIEnv, JavaVM};

pub mod camera;
pub mod downloads;
pub mod permissions;
pub mod pickers;
pub mod share;

/// Initialize Android-specific functionality.
/// Called during app startup on Android builds.
pub fn init() -> Result<(), String> {
    eprintln!("[Shell] Android module initialized");
    Ok(())
}

/// Attach to the JVM and run `f` with the current activity. Any pending Java
/// exception is described, cleared, and turned into an error.
pub(crate) fn with_activity<T>(
    f: impl FnOnce(&mut JNIEnv, &JObject) -> Result<T, String>,
) -> Result<T, String> {
    let ctx = ndk_context::android_context();
    let vm = unsafe { JavaVM::from_raw(ctx.vm().cast()) }
        .map_err(|e| format!("Failed to obtain JavaVM: {}", e))?;
    let mut env = vm
        .attach_current_thread()
        .map_err(|e| format!("Failed to attach JNI thread: {}", e))?;
    let activity = unsafe { JObject::from_raw(ctx.context().cast()) };

    let result = f(&mut env, &activity);

    if env.exception_check().unwrap_or(false) {
        let _ = env.exception_describe();
        let _ = env.exception_clear();
        if result.is_ok() {
            return Err("Java exception raised during JNI call".to_string());
        }
    }
    result
}

/// Find a class, falling back to the activity's ClassLoader. `find_class`
/// from an attached native thread uses the system classloader, which cannot
/// see app classes like androidx FileProvider.
pub(crate) fn find_app_class<'a>(
    env: &mut JNIEnv<'a>,
    activity: &JObject,
    class_name: &str,
) -> Result<JClass<'a>, String> {
    if let Ok(class) = env.find_class(class_name) {
        return Ok(class);
    }
    if env.exception_check().unwrap_or(false) {
        let _ = env.exception_clear();
    }

    let loader = env
        .call_method(activity, "getClassLoader", "()Ljava/lang/ClassLoader;", &[])
        .and_then(|v| v.l())
        .map_err(|e| format!("Failed to get ClassLoader: {}", e))?;

    let java_name = class_name.replace('/', ".");
    let name_jstring = env
        .new_string(&java_name)
        .map_err(|e| format!("Failed to create class name string: {}", e))?;

    let class_obj = env
        .call_method(
            &loader,
            "loadClass",
            "(Ljava/lang/String;)Ljava/lang/Class;",
            &[(&name_jstring).into()],
        )
        .and_then(|v| v.l())
        .map_err(|e| format!("Failed to load class {}: {}", java_name, e))?;

    Ok(JClass::from(class_obj))
}

/// Wrap a filesystem path in a content URI via the app's FileProvider, so
/// external activities (camera, share targets) can read/write it.
pub(crate) fn file_provider_uri<'a>(
    env: &mut JNIEnv<'a>,
    activity: &JObject,
    path: &Path,
) -> Result<JObject<'a>, String> {
    let file_class = env
        .find_class("java/io/File")
        .map_err(|e| format!("Failed to find java.io.File: {}", e))?;
    let jpath = env
        .new_string(path.to_string_lossy())
        .map_err(|e| format!("Failed to create path string: {}", e))?;
    let file = env
        .new_object(&file_class, "(Ljava/lang/String;)V", &[(&jpath).into()])
        .map_err(|e| format!("Failed to construct File: {}", e))?;

    let package = env
        .call_method(activity, "getPackageName", "()Ljava/lang/String;", &[])
        .and_then(|v| v.l())
        .map_err(|e| format!("Failed to get package name: {}", e))?;
    let package: String = env
        .get_string(&jni::objects::JString::from(package))
        .map_err(|e| format!("Failed to read package name: {}", e))?
        .into();
    let authority = env
        .new_string(format!("{}.fileprovider", package))
        .map_err(|e| format!("Failed to create authority string: {}", e))?;

    let provider_class = find_app_class(env, activity, "androidx/core/content/FileProvider")?;
    env.call_static_method(
        &provider_class,
        "getUriForFile",
        "(Landroid/content/Context;Ljava/lang/String;Ljava/io/File;)Landroid/net/Uri;",
        &[activity.into(), (&authority).into(), (&file).into()],
    )
    .and_then(|v| v.l())
    .map_err(|e| format!("FileProvider.getUriForFile failed: {}", e))
}
