//! Bridge message routing between the embedded page and native pickers
//!
//! The injected script forwards every `message` event the page posts; this
//! module decodes the payload, runs the matching native flow, and injects the
//! response back into the page's message stream via `window.postMessage`.
//!
//! Decode-or-ignore boundary: malformed payloads and unknown kinds are
//! logged and dropped, never surfaced, never fatal. A picker cancelled by
//! the user produces no response and no toast.

use tauri::{Manager, WebviewWindow};

use crate::toast;
use crate::types::{BridgeRequest, BridgeResponse, ToastSeverity};
use crate::utils;
use crate::{platform, AppState};

/// Entry point invoked by the injected script for every page message.
#[tauri::command]
pub async fn handle_bridge_message(
    app: tauri::AppHandle,
    window: tauri::WebviewWindow,
    payload: String,
) -> Result<(), String> {
    route_message(&app, &window, &payload).await;
    Ok(())
}

/// Decode one payload; unknown or malformed input is dropped.
pub(crate) fn decode_request(payload: &str) -> Option<BridgeRequest> {
    match serde_json::from_str::<BridgeRequest>(payload) {
        Ok(request) => Some(request),
        Err(e) => {
            eprintln!("[Bridge] Ignoring message: {}", e);
            None
        }
    }
}

pub(crate) async fn route_message(app: &tauri::AppHandle, window: &WebviewWindow, payload: &str) {
    let Some(request) = decode_request(payload) else {
        return;
    };
    let state = app.state::<AppState>();
    let toasts = state.toasts.clone();

    match request {
        BridgeRequest::PickImage => match platform::pick_image(app).await {
            Ok(Some(file)) => {
                inject_response(window, &BridgeResponse::ImageSelected { uri: file.uri });
                toast::notify(&toasts, Some(window), "Image selected", ToastSeverity::Success);
            }
            Ok(None) => {}
            Err(e) => eprintln!("[Bridge] Image picker failed: {}", e),
        },
        BridgeRequest::PickFile => match platform::pick_file(app).await {
            Ok(Some(file)) => {
                inject_response(
                    window,
                    &BridgeResponse::FileSelected {
                        uri: file.uri,
                        name: file.name,
                    },
                );
                toast::notify(&toasts, Some(window), "File selected", ToastSeverity::Success);
            }
            Ok(None) => {}
            Err(e) => eprintln!("[Bridge] File picker failed: {}", e),
        },
        BridgeRequest::TakePhoto => match platform::take_photo(app).await {
            Ok(Some(file)) => {
                inject_response(window, &BridgeResponse::PhotoTaken { uri: file.uri });
                toast::notify(&toasts, Some(window), "Photo captured", ToastSeverity::Success);
            }
            Ok(None) => {}
            Err(e) => eprintln!("[Bridge] Camera capture failed: {}", e),
        },
        BridgeRequest::UploadAttachment { task_id, uri, name } => {
            match send_attachment(app, &task_id, &uri, name.as_deref()).await {
                Ok(()) => {
                    inject_response(window, &BridgeResponse::AttachmentUploaded { ok: true });
                    toast::notify(&toasts, Some(window), "Attachment uploaded", ToastSeverity::Success);
                }
                Err(e) => {
                    eprintln!("[Bridge] Attachment upload failed: {}", e);
                    inject_response(window, &BridgeResponse::AttachmentUploaded { ok: false });
                    toast::notify(&toasts, Some(window), "Attachment upload failed", ToastSeverity::Error);
                }
            }
        }
    }
}

/// Multipart-post a picked file to the backend's task upload endpoint. Only
/// the status code is inspected; the response body stays opaque.
async fn send_attachment(
    app: &tauri::AppHandle,
    task_id: &str,
    uri: &str,
    name: Option<&str>,
) -> Result<(), String> {
    let bytes = platform::read_uri_bytes(app, uri).await?;

    let filename = name
        .map(utils::sanitize_filename)
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| {
            utils::sanitize_filename(uri.rsplit('/').next().unwrap_or("attachment"))
        });
    let mime = utils::get_mime_type(std::path::Path::new(&filename)).to_string();

    let part = reqwest::multipart::Part::bytes(bytes)
        .file_name(filename)
        .mime_str(&mime)
        .map_err(|e| format!("Invalid MIME type: {}", e))?;
    let form = reqwest::multipart::Form::new().part("file", part);

    let state = app.state::<AppState>();
    let endpoint = state
        .config
        .api_url
        .join(&format!("tasks/{}/upload", urlencoding::encode(task_id)))
        .map_err(|e| format!("Invalid upload URL: {}", e))?;

    let response = state
        .http
        .post(endpoint)
        .multipart(form)
        .send()
        .await
        .map_err(|e| format!("Upload request failed: {}", e))?;

    if !response.status().is_success() {
        return Err(format!("Upload failed (HTTP {})", response.status().as_u16()));
    }
    Ok(())
}

/// Deliver a response through the page's standard message-event stream, the
/// same way a same-origin postMessage would arrive.
pub(crate) fn inject_response(window: &WebviewWindow, response: &BridgeResponse) {
    match response_script(response) {
        Ok(script) => {
            let _ = window.eval(&script);
        }
        Err(e) => eprintln!("[Bridge] Failed to encode response: {}", e),
    }
}

fn response_script(response: &BridgeResponse) -> Result<String, String> {
    let json = serde_json::to_string(response)
        .map_err(|e| format!("Failed to serialize response: {}", e))?;
    Ok(format!("window.postMessage({}, \"*\");", json))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_known_kinds() {
        assert!(matches!(
            decode_request(r#"{"type":"pickImage"}"#),
            Some(BridgeRequest::PickImage)
        ));
        assert!(matches!(
            decode_request(r#"{"type":"pickFile"}"#),
            Some(BridgeRequest::PickFile)
        ));
        assert!(matches!(
            decode_request(r#"{"type":"takePhoto"}"#),
            Some(BridgeRequest::TakePhoto)
        ));
    }

    #[test]
    fn test_malformed_messages_are_dropped() {
        assert!(decode_request(r#"{"type":"unknown"}"#).is_none());
        assert!(decode_request("not json at all").is_none());
        assert!(decode_request(r#"{"kind":"pickImage"}"#).is_none());
        assert!(decode_request("").is_none());
        // Responses echoed back through the page listener are ignored too
        assert!(decode_request(r#"{"type":"fileSelected","uri":"file:///x","name":"x"}"#).is_none());
    }

    #[test]
    fn test_response_script_posts_message() {
        let script = response_script(&BridgeResponse::FileSelected {
            uri: "file:///cache/invoice.pdf".into(),
            name: "invoice.pdf".into(),
        })
        .unwrap();
        assert!(script.starts_with("window.postMessage({"));
        assert!(script.contains(r#""type":"fileSelected""#));
        assert!(script.contains(r#""name":"invoice.pdf""#));
        assert!(script.ends_with(", \"*\");"));

        let script = response_script(&BridgeResponse::PhotoTaken {
            uri: "file:///cache/photo.jpg".into(),
        })
        .unwrap();
        assert!(script.contains(r#""type":"photoTaken""#));
    }
}
