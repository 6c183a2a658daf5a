//! Utility functions for the CSMS shell
//!
//! This module contains common helpers used throughout the application:
//! - MIME type detection
//! - Download filename derivation and sanitization

use std::path::Path;

/// File extensions the shell treats as downloadable documents rather than
/// navigable pages.
pub const DOCUMENT_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "xls", "xlsx", "csv", "zip"];

/// Get MIME type from file extension
pub fn get_mime_type(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .as_deref()
    {
        // Documents
        Some("pdf") => "application/pdf",
        Some("doc") => "application/msword",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        Some("xls") => "application/vnd.ms-excel",
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Some("csv") => "text/csv",
        Some("zip") => "application/zip",
        Some("json") => "application/json",
        Some("txt") => "text/plain",
        // Images (picked attachments, camera captures)
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("heic") | Some("heif") => "image/heic",
        // Default
        _ => "application/octet-stream",
    }
}

/// Replace path separators and other characters that are unsafe in a filename.
/// Returns an empty string if nothing survives.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect::<String>()
        .trim()
        .trim_matches('.')
        .to_string()
}

/// Extract a filename from the last segment of a URL path, but only if it
/// carries a recognized document extension. Percent-encoding is decoded so
/// `Monthly%20Report.pdf` comes back as `Monthly Report.pdf`.
pub fn filename_from_url_path(path: &str) -> Option<String> {
    let segment = path.rsplit('/').next().unwrap_or("");
    if segment.is_empty() {
        return None;
    }
    let decoded = urlencoding::decode(segment)
        .map(|c| c.into_owned())
        .unwrap_or_else(|_| segment.to_string());
    let (_, ext) = decoded.rsplit_once('.')?;
    if !DOCUMENT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()) {
        return None;
    }
    let name = sanitize_filename(&decoded);
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Extract the `filename=` parameter from a Content-Disposition header.
/// The backend sends `attachment; filename=<project>_Report.pdf`.
pub fn filename_from_content_disposition(header: &str) -> Option<String> {
    for part in header.split(';') {
        let part = part.trim();
        if let Some(rest) = part.strip_prefix("filename=") {
            let name = sanitize_filename(rest.trim().trim_matches('"'));
            if !name.is_empty() {
                return Some(name);
            }
        }
    }
    None
}

/// Synthesized report name for URLs that carry no usable filename.
pub fn dated_report_filename() -> String {
    format!("CSMS_Report_{}.pdf", chrono::Local::now().format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_types() {
        assert_eq!(get_mime_type(Path::new("report.pdf")), "application/pdf");
        assert_eq!(get_mime_type(Path::new("Report.PDF")), "application/pdf");
        assert_eq!(get_mime_type(Path::new("photo.jpeg")), "image/jpeg");
        assert_eq!(get_mime_type(Path::new("noext")), "application/octet-stream");
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("invoice.pdf"), "invoice.pdf");
        assert_eq!(sanitize_filename("../../etc/passwd"), "_.._etc_passwd");
        assert_eq!(sanitize_filename("a:b*c?.pdf"), "a_b_c_.pdf");
        assert_eq!(sanitize_filename("  spaced.pdf  "), "spaced.pdf");
        assert_eq!(sanitize_filename(""), "");
    }

    #[test]
    fn test_filename_from_url_path() {
        assert_eq!(
            filename_from_url_path("/files/Well_A_Report.pdf"),
            Some("Well_A_Report.pdf".to_string())
        );
        assert_eq!(
            filename_from_url_path("/files/Monthly%20Report.pdf"),
            Some("Monthly Report.pdf".to_string())
        );
        // No recognized extension -> no name
        assert_eq!(filename_from_url_path("/projects/42/report"), None);
        assert_eq!(filename_from_url_path("/index.html"), None);
        assert_eq!(filename_from_url_path("/"), None);
    }

    #[test]
    fn test_filename_from_content_disposition() {
        assert_eq!(
            filename_from_content_disposition("attachment; filename=Well_A_Report.pdf"),
            Some("Well_A_Report.pdf".to_string())
        );
        assert_eq!(
            filename_from_content_disposition(r#"attachment; filename="quoted name.pdf""#),
            Some("quoted name.pdf".to_string())
        );
        assert_eq!(filename_from_content_disposition("inline"), None);
        assert_eq!(filename_from_content_disposition("attachment; filename="), None);
    }

    #[test]
    fn test_dated_report_filename_shape() {
        let name = dated_report_filename();
        assert!(name.starts_with("CSMS_Report_"));
        assert!(name.ends_with(".pdf"));
    }
}
