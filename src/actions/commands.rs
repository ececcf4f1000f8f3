//! Backend halves of the result-dialog buttons. Every failure is surfaced
//! to the caller as a plain message for a transient toast; nothing here is
//! fatal or retried.

use tauri::AppHandle;
use tauri_plugin_clipboard_manager::ClipboardExt;
use tauri_plugin_opener::OpenerExt;

use crate::classify::{self, wifi};
use crate::db::models::ScanKind;

/// Open a scanned value with the system handler: URLs in the browser,
/// emails in the mailer, phone numbers in the dialer.
#[tauri::command]
pub async fn open_scan_target(app_handle: AppHandle, content: String) -> Result<(), String> {
    let target = open_target_for(&content);
    app_handle
        .opener()
        .open_url(target, None::<&str>)
        .map_err(|e| e.to_string())
}

fn open_target_for(content: &str) -> String {
    let value = content.trim();
    if classify::looks_like_email(value) {
        format!("mailto:{value}")
    } else if classify::looks_like_phone(value) {
        format!("tel:{value}")
    } else if classify::classify(value) == ScanKind::Url {
        value.to_string()
    } else {
        // Bare domains from QR codes are overwhelmingly meant as links
        format!("https://{value}")
    }
}

#[tauri::command]
pub async fn copy_scan_content(app_handle: AppHandle, content: String) -> Result<(), String> {
    app_handle
        .clipboard()
        .write_text(content)
        .map_err(|e| e.to_string())
}

/// Add and activate the scanned Wi-Fi network.
#[tauri::command]
pub async fn connect_wifi(content: String) -> Result<(), String> {
    let credentials = wifi::parse(&content);
    if credentials.ssid.is_empty() {
        return Err("Invalid Wi-Fi code format.".to_string());
    }

    #[cfg(target_os = "linux")]
    {
        super::network_manager::connect(&credentials)
            .await
            .map_err(|e| e.to_string())
    }

    #[cfg(not(target_os = "linux"))]
    {
        Err("Wi-Fi setup is not supported on this platform. Copy the details and connect manually.".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_pass_through_unchanged() {
        assert_eq!(
            open_target_for("https://example.com/x"),
            "https://example.com/x"
        );
        assert_eq!(open_target_for("HTTP://EXAMPLE.COM"), "HTTP://EXAMPLE.COM");
    }

    #[test]
    fn bare_domains_get_https_prefix() {
        assert_eq!(open_target_for("example.com"), "https://example.com");
    }

    #[test]
    fn emails_and_phones_get_uri_schemes() {
        assert_eq!(
            open_target_for("person@example.com"),
            "mailto:person@example.com"
        );
        assert_eq!(open_target_for("+15551234567"), "tel:+15551234567");
    }
}
