//! Navigation interception for the embedded surface
//!
//! Every outbound navigation the webview attempts is classified here before
//! it happens: report/document URLs are routed into the download pipeline,
//! foreign links are optionally handed to the system browser, everything the
//! embedded app owns navigates normally.
//!
//! Classification is synchronous, side-effect free, and never fails: an
//! unrecognized URL falls through to `Allow`.

use std::sync::OnceLock;

use regex::Regex;
use tauri::Url;

use crate::types::{ExternalLinkPolicy, NavigationDecision};
use crate::utils::DOCUMENT_EXTENSIONS;

/// Project-scoped report endpoint, e.g. `/projects/42/report`.
/// The query string is irrelevant: preview or download, it is always a PDF
/// the webview cannot render inline.
fn report_path_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"/projects/[^/]+/report/?$").unwrap())
}

/// Classify one outbound navigation request.
///
/// Decision order, first match wins:
/// 1. report endpoint -> download
/// 2. blob URL, explicit download marker, or document extension -> download
/// 3. same origin as the configured app (or about:blank) -> allow
/// 4. other http(s) -> the configured external-link policy
pub fn classify(
    url: &Url,
    is_main_frame: bool,
    app_url: &Url,
    policy: ExternalLinkPolicy,
) -> NavigationDecision {
    if report_path_pattern().is_match(url.path()) {
        return NavigationDecision::Download;
    }
    if url.scheme() == "blob" || has_download_marker(url) || has_document_extension(url.path()) {
        return NavigationDecision::Download;
    }

    // Sub-frame navigations are never hijacked once the download rules pass
    if !is_main_frame {
        return NavigationDecision::Allow;
    }

    if url.scheme() == "about" {
        return NavigationDecision::Allow;
    }
    if url.origin() == app_url.origin() {
        return NavigationDecision::Allow;
    }
    if matches!(url.scheme(), "http" | "https") {
        return match policy {
            ExternalLinkPolicy::InSurface => NavigationDecision::Allow,
            ExternalLinkPolicy::OpenExternal => NavigationDecision::OpenExternal,
        };
    }

    NavigationDecision::Allow
}

/// `?download=...` or `?mode=download` (the report endpoint's download mode).
fn has_download_marker(url: &Url) -> bool {
    url.query_pairs()
        .any(|(key, value)| key == "download" || (key == "mode" && value == "download"))
}

fn has_document_extension(path: &str) -> bool {
    let segment = path.rsplit('/').next().unwrap_or("");
    match segment.rsplit_once('.') {
        Some((_, ext)) => DOCUMENT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_url() -> Url {
        Url::parse("https://csms-app.vercel.app").unwrap()
    }

    fn classify_str(url: &str, policy: ExternalLinkPolicy) -> NavigationDecision {
        classify(&Url::parse(url).unwrap(), true, &app_url(), policy)
    }

    #[test]
    fn test_report_urls_always_download() {
        for url in [
            "https://csms-backend.onrender.com/projects/42/report",
            "https://csms-backend.onrender.com/projects/42/report?mode=download",
            "https://csms-backend.onrender.com/projects/42/report?mode=preview",
            "https://csms-app.vercel.app/projects/abc-123/report/",
        ] {
            assert_eq!(
                classify_str(url, ExternalLinkPolicy::InSurface),
                NavigationDecision::Download,
                "{url} should download"
            );
        }
    }

    #[test]
    fn test_document_and_blob_urls_download() {
        assert_eq!(
            classify_str("https://files.example.com/Well_A_Report.pdf", ExternalLinkPolicy::InSurface),
            NavigationDecision::Download
        );
        assert_eq!(
            classify_str("https://files.example.com/export.XLSX", ExternalLinkPolicy::InSurface),
            NavigationDecision::Download
        );
        assert_eq!(
            classify_str("blob:https://csms-app.vercel.app/a-b-c", ExternalLinkPolicy::InSurface),
            NavigationDecision::Download
        );
        assert_eq!(
            classify_str("https://example.com/get?download=1", ExternalLinkPolicy::InSurface),
            NavigationDecision::Download
        );
    }

    #[test]
    fn test_same_origin_allowed() {
        for url in [
            "https://csms-app.vercel.app/",
            "https://csms-app.vercel.app/projects/42",
            "https://csms-app.vercel.app/tasks?status=Ongoing",
            "about:blank",
        ] {
            assert_eq!(
                classify_str(url, ExternalLinkPolicy::OpenExternal),
                NavigationDecision::Allow,
                "{url} should be allowed"
            );
        }
    }

    #[test]
    fn test_external_links_follow_policy() {
        assert_eq!(
            classify_str("https://docs.example.com/help", ExternalLinkPolicy::OpenExternal),
            NavigationDecision::OpenExternal
        );
        assert_eq!(
            classify_str("https://docs.example.com/help", ExternalLinkPolicy::InSurface),
            NavigationDecision::Allow
        );
    }

    #[test]
    fn test_subframes_only_intercepted_for_downloads() {
        let url = Url::parse("https://ads.example.com/frame").unwrap();
        assert_eq!(
            classify(&url, false, &app_url(), ExternalLinkPolicy::OpenExternal),
            NavigationDecision::Allow
        );
        let pdf = Url::parse("https://ads.example.com/doc.pdf").unwrap();
        assert_eq!(
            classify(&pdf, false, &app_url(), ExternalLinkPolicy::OpenExternal),
            NavigationDecision::Download
        );
    }

    #[test]
    fn test_unrecognized_schemes_default_to_allow() {
        for url in ["mailto:pic@example.com", "tel:+15551234567", "data:text/plain,hi"] {
            assert_eq!(
                classify_str(url, ExternalLinkPolicy::OpenExternal),
                NavigationDecision::Allow,
                "{url} should fall through to allow"
            );
        }
    }

    #[test]
    fn test_report_path_not_confused_with_similar_paths() {
        // Not the report endpoint: plain project pages
        assert_eq!(
            classify_str("https://csms-app.vercel.app/projects/42/reports-overview", ExternalLinkPolicy::InSurface),
            NavigationDecision::Allow
        );
        assert_eq!(
            classify_str("https://csms-app.vercel.app/projects/42", ExternalLinkPolicy::InSurface),
            NavigationDecision::Allow
        );
    }
}
