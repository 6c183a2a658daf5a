use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use tauri::{Manager, Url, WebviewUrl, WebviewWindowBuilder};

mod back_press;
mod bridge;
mod download;
mod init_script;
mod navigation;
mod permissions;
mod platform;
mod settings;
mod toast;
mod types;
mod utils;

#[cfg(target_os = "android")]
mod android;

use settings::ShellConfig;
use toast::ToastManager;
use types::NavigationDecision;

/// Label of the single shell window
pub(crate) const MAIN_WINDOW: &str = "main";

/// App state
pub(crate) struct AppState {
    pub(crate) config: ShellConfig,
    /// Shared HTTP client for report downloads and attachment uploads
    pub(crate) http: reqwest::Client,
    pub(crate) toasts: Arc<ToastManager>,
    /// True while a download pipeline holds the busy overlay
    pub(crate) download_active: Arc<AtomicBool>,
    #[cfg(target_os = "android")]
    pub(crate) back_guard: Arc<back_press::BackPressGuard>,
}

/// Forward page-side log lines to native stderr
#[tauri::command]
fn js_log(message: String) {
    eprintln!("[Shell] JS: {}", message);
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let builder = tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_dialog::init())
        .plugin(permissions::init_plugin())
        .setup(|app| {
            #[cfg(target_os = "android")]
            android::init().map_err(|e| {
                Box::new(std::io::Error::new(std::io::ErrorKind::Other, e))
                    as Box<dyn std::error::Error>
            })?;

            let config = ShellConfig::resolve(app.handle());
            eprintln!("[Shell] App URL: {}", config.app_url);
            eprintln!("[Shell] API URL: {}", config.api_url);
            eprintln!("[Shell] External links: {:?}", config.external_links);

            let http = reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()
                .map_err(|e| {
                    Box::new(std::io::Error::new(
                        std::io::ErrorKind::Other,
                        format!("HTTP client error: {}", e),
                    )) as Box<dyn std::error::Error>
                })?;

            app.manage(AppState {
                config: config.clone(),
                http,
                toasts: Arc::new(ToastManager::new()),
                download_active: Arc::new(AtomicBool::new(false)),
                #[cfg(target_os = "android")]
                back_guard: Arc::new(back_press::BackPressGuard::new()),
            });

            // The shell window: remote app URL, injected shell script, and
            // the navigation interceptor in front of every outbound request.
            let nav_app = app.handle().clone();
            let nav_app_url = config.app_url.clone();
            let nav_policy = config.external_links;
            WebviewWindowBuilder::new(
                app,
                MAIN_WINDOW,
                WebviewUrl::External(config.app_url.clone()),
            )
            .title("CSMS")
            .inner_size(420.0, 860.0)
            .initialization_script(&init_script::get_shell_init_script(config.app_url.as_str()))
            .on_navigation(move |url: &Url| {
                match navigation::classify(url, true, &nav_app_url, nav_policy) {
                    NavigationDecision::Allow => true,
                    NavigationDecision::Download => {
                        eprintln!("[Shell] Intercepted download navigation: {}", url);
                        let app = nav_app.clone();
                        let url = url.to_string();
                        tauri::async_runtime::spawn(async move {
                            download::download(app, url).await;
                        });
                        false
                    }
                    NavigationDecision::OpenExternal => {
                        use tauri_plugin_opener::OpenerExt;
                        eprintln!("[Shell] Opening externally: {}", url);
                        if let Err(e) = nav_app.opener().open_url(url.as_str(), None::<&str>) {
                            eprintln!("[Shell] Failed to open external URL: {}", e);
                        }
                        false
                    }
                }
            })
            .build()?;

            // Device permissions are requested once, after the window exists
            // so gate toasts have somewhere to render.
            let gate_app = app.handle().clone();
            tauri::async_runtime::spawn(async move {
                permissions::run_startup_gate(gate_app).await;
            });

            Ok(())
        });

    #[cfg(target_os = "android")]
    let builder = builder.invoke_handler(tauri::generate_handler![
        bridge::handle_bridge_message,
        back_press::handle_back_press,
        js_log
    ]);
    #[cfg(not(target_os = "android"))]
    let builder = builder.invoke_handler(tauri::generate_handler![
        bridge::handle_bridge_message,
        js_log
    ]);

    builder
        .build(tauri::generate_context!())
        .expect("error while building csms-mobile")
        .run(|_app, _event| {});
}
