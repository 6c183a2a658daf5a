//! Core data types for the CSMS shell
//!
//! This module contains the fundamental data structures used throughout the
//! application:
//! - Bridge messages exchanged with the embedded web application
//! - Download job state
//! - Toast and permission types

use serde::{Deserialize, Serialize};

/// A message posted by the embedded page to the native shell.
///
/// The page sends these as JSON through its `message` event channel; anything
/// that fails to decode (or carries an unknown `type`) is dropped by the
/// router, never surfaced to the user.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BridgeRequest {
    /// Open the photo library picker
    PickImage,
    /// Open the document picker for any file type
    PickFile,
    /// Open the camera capture flow
    TakePhoto,
    /// Upload a previously picked file to the backend on the page's behalf
    /// (the page cannot read native file/content URIs itself)
    #[serde(rename_all = "camelCase")]
    UploadAttachment {
        task_id: String,
        uri: String,
        #[serde(default)]
        name: Option<String>,
    },
}

/// A message injected back into the embedded page.
///
/// Delivered by evaluating a `window.postMessage` call in the page context,
/// so the page's existing `message` listener receives it asynchronously.
/// Ownership of the referenced URI transfers to the page; the native side
/// keeps no record of it afterwards.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BridgeResponse {
    ImageSelected { uri: String },
    FileSelected { uri: String, name: String },
    PhotoTaken { uri: String },
    AttachmentUploaded { ok: bool },
}

/// Lifecycle of one download. `Done` and `Failed` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadStatus {
    Pending,
    Fetching,
    Persisting,
    Done,
    Failed,
}

impl DownloadStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, DownloadStatus::Done | DownloadStatus::Failed)
    }
}

/// Transient state for one in-flight download.
#[derive(Debug)]
pub struct DownloadJob {
    pub source_url: String,
    /// Resolved after the response headers arrive (Content-Disposition wins
    /// over a name embedded in the URL path)
    pub filename: String,
    pub local_cache_path: Option<std::path::PathBuf>,
    status: DownloadStatus,
}

impl DownloadJob {
    pub fn new(source_url: String) -> Self {
        Self {
            source_url,
            filename: String::new(),
            local_cache_path: None,
            status: DownloadStatus::Pending,
        }
    }

    pub fn status(&self) -> DownloadStatus {
        self.status
    }

    /// Advance the job. Terminal states absorb further transitions so a late
    /// status update can never resurrect a finished job.
    pub fn set_status(&mut self, next: DownloadStatus) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = next;
        true
    }
}

/// Severity of a toast notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastSeverity {
    Info,
    Success,
    Error,
}

impl ToastSeverity {
    pub fn as_str(self) -> &'static str {
        match self {
            ToastSeverity::Info => "info",
            ToastSeverity::Success => "success",
            ToastSeverity::Error => "error",
        }
    }
}

/// Snapshot of the currently visible toast, if any.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToastState {
    pub visible: bool,
    pub message: String,
    pub severity: ToastSeverity,
}

/// Device capabilities requested once at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PermissionCapability {
    Storage,
    Camera,
    MediaLibrary,
}

/// Result of one capability request. Not persisted beyond the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PermissionOutcome {
    pub capability: PermissionCapability,
    pub granted: bool,
}

/// Verdict of the navigation interceptor for one outbound URL.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NavigationDecision {
    /// Let the webview perform the navigation
    Allow,
    /// Suppress the navigation and run the download pipeline instead
    Download,
    /// Suppress the navigation and hand the URL to the OS
    OpenExternal,
}

/// What to do with external http(s) links the embedded app doesn't own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ExternalLinkPolicy {
    /// Render the link inside the embedded surface
    InSurface,
    /// Hand the link to the system browser
    #[default]
    OpenExternal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_job_terminal_states_absorb_transitions() {
        let mut job = DownloadJob::new("https://example.com/report".into());
        assert_eq!(job.status(), DownloadStatus::Pending);
        assert!(job.set_status(DownloadStatus::Fetching));
        assert!(job.set_status(DownloadStatus::Persisting));
        assert!(job.set_status(DownloadStatus::Done));

        // Terminal: no further transitions, not even to the other terminal
        assert!(!job.set_status(DownloadStatus::Fetching));
        assert!(!job.set_status(DownloadStatus::Failed));
        assert_eq!(job.status(), DownloadStatus::Done);

        let mut failed = DownloadJob::new("https://example.com/report".into());
        failed.set_status(DownloadStatus::Failed);
        assert!(!failed.set_status(DownloadStatus::Pending));
        assert_eq!(failed.status(), DownloadStatus::Failed);
    }

    #[test]
    fn test_bridge_request_decoding() {
        let req: BridgeRequest = serde_json::from_str(r#"{"type":"pickImage"}"#).unwrap();
        assert!(matches!(req, BridgeRequest::PickImage));

        let req: BridgeRequest = serde_json::from_str(
            r#"{"type":"uploadAttachment","taskId":"t1","uri":"file:///tmp/a.pdf"}"#,
        )
        .unwrap();
        match req {
            BridgeRequest::UploadAttachment { task_id, uri, name } => {
                assert_eq!(task_id, "t1");
                assert_eq!(uri, "file:///tmp/a.pdf");
                assert!(name.is_none());
            }
            other => panic!("unexpected request: {:?}", other),
        }

        // Unknown discriminators are a decode error, not a panic
        assert!(serde_json::from_str::<BridgeRequest>(r#"{"type":"unknown"}"#).is_err());
        assert!(serde_json::from_str::<BridgeRequest>("not json").is_err());
    }

    #[test]
    fn test_bridge_response_encoding() {
        let json = serde_json::to_string(&BridgeResponse::FileSelected {
            uri: "file:///cache/invoice.pdf".into(),
            name: "invoice.pdf".into(),
        })
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["type"], "fileSelected");
        assert_eq!(value["uri"], "file:///cache/invoice.pdf");
        assert_eq!(value["name"], "invoice.pdf");
    }
}
