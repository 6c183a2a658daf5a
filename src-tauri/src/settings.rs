//! Shell settings storage
//!
//! This module handles persistent configuration for the shell:
//! - Which URL the embedded CSMS application loads from
//! - Which API origin report/upload requests go to
//! - How external http(s) links are handled
//!
//! Settings live in a single JSON file in the app data directory and can be
//! overridden per-launch with environment variables (`CSMS_APP_URL`,
//! `CSMS_API_URL`, `CSMS_EXTERNAL_LINKS`).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tauri::{Manager, Url};

use crate::types::ExternalLinkPolicy;

/// Where the embedded application is served from.
pub const DEFAULT_APP_URL: &str = "https://csms-app.vercel.app";

/// Where reports are generated and attachments uploaded.
pub const DEFAULT_API_URL: &str = "https://csms-backend.onrender.com";

/// On-disk settings. Every field is optional so a hand-edited partial file
/// still loads.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct ShellSettings {
    #[serde(default)]
    pub app_url: Option<String>,
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub external_links: ExternalLinkPolicy,
}

/// Resolved, validated configuration the shell runs with.
#[derive(Clone, Debug)]
pub struct ShellConfig {
    pub app_url: Url,
    pub api_url: Url,
    pub external_links: ExternalLinkPolicy,
}

impl ShellConfig {
    /// Defaults <- settings file <- environment, with URL validation.
    /// A malformed URL falls back to the default rather than aborting startup.
    pub fn resolve(app: &tauri::AppHandle) -> ShellConfig {
        let stored = load_settings(app);

        let app_url_raw = std::env::var("CSMS_APP_URL")
            .ok()
            .or(stored.app_url)
            .unwrap_or_else(|| DEFAULT_APP_URL.to_string());
        let api_url_raw = std::env::var("CSMS_API_URL")
            .ok()
            .or(stored.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let external_links = std::env::var("CSMS_EXTERNAL_LINKS")
            .ok()
            .and_then(|value| match value.as_str() {
                "in-surface" => Some(ExternalLinkPolicy::InSurface),
                "open-external" => Some(ExternalLinkPolicy::OpenExternal),
                other => {
                    eprintln!("[Settings] Unknown CSMS_EXTERNAL_LINKS value: {}", other);
                    None
                }
            })
            .unwrap_or(stored.external_links);

        ShellConfig {
            app_url: parse_or_default(&app_url_raw, DEFAULT_APP_URL, "app URL"),
            api_url: parse_or_default(&api_url_raw, DEFAULT_API_URL, "API URL"),
            external_links,
        }
    }
}

fn parse_or_default(raw: &str, fallback: &str, what: &str) -> Url {
    match Url::parse(raw) {
        Ok(url) => url,
        Err(e) => {
            eprintln!("[Settings] Invalid {} '{}': {}, using default", what, raw, e);
            Url::parse(fallback).expect("default URL is valid")
        }
    }
}

/// Get the path to the settings JSON
pub fn get_settings_path(app: &tauri::AppHandle) -> Result<PathBuf, String> {
    let data_dir = app.path().app_data_dir().map_err(|e| e.to_string())?;
    Ok(data_dir.join("settings.json"))
}

/// Load settings from disk. A missing file is seeded with defaults so users
/// have something to edit; a corrupt file is logged and treated as default.
pub fn load_settings(app: &tauri::AppHandle) -> ShellSettings {
    let path = match get_settings_path(app) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("[Settings] Failed to locate settings: {}", e);
            return ShellSettings::default();
        }
    };

    if !path.exists() {
        let defaults = ShellSettings::default();
        if let Err(e) = save_settings(app, &defaults) {
            eprintln!("[Settings] Failed to write default settings: {}", e);
        }
        return defaults;
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match serde_json::from_str(&content) {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("[Settings] Failed to parse settings: {}", e);
                ShellSettings::default()
            }
        },
        Err(e) => {
            eprintln!("[Settings] Failed to read settings: {}", e);
            ShellSettings::default()
        }
    }
}

/// Save settings to disk
pub fn save_settings(app: &tauri::AppHandle, settings: &ShellSettings) -> Result<(), String> {
    let path = get_settings_path(app)?;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create settings directory: {}", e))?;
    }

    let content = serde_json::to_string_pretty(settings)
        .map_err(|e| format!("Failed to serialize settings: {}", e))?;
    std::fs::write(&path, content).map_err(|e| format!("Failed to write settings: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_file_loads_with_defaults() {
        let settings: ShellSettings = serde_json::from_str(r#"{"app_url":"http://localhost:3000"}"#).unwrap();
        assert_eq!(settings.app_url.as_deref(), Some("http://localhost:3000"));
        assert!(settings.api_url.is_none());
        assert_eq!(settings.external_links, ExternalLinkPolicy::OpenExternal);

        let settings: ShellSettings = serde_json::from_str(r#"{"external_links":"in-surface"}"#).unwrap();
        assert_eq!(settings.external_links, ExternalLinkPolicy::InSurface);
    }

    #[test]
    fn test_default_urls_parse() {
        assert!(Url::parse(DEFAULT_APP_URL).is_ok());
        assert!(Url::parse(DEFAULT_API_URL).is_ok());
    }

    #[test]
    fn test_parse_or_default_falls_back() {
        let url = parse_or_default("not a url", DEFAULT_APP_URL, "app URL");
        assert_eq!(url.as_str(), format!("{}/", DEFAULT_APP_URL));
    }
}
